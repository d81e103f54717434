// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![warn(clippy::pedantic)]

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use color_print::cprintln;
use pybc::{
    kernel::{PythonSession, DEFAULT_PYTHON},
    model::{BytecodeModel, KernelMessage},
    panel::Panel,
    parse::parse_bytecode,
    render::render,
    select::{Position, Selection},
};
use serde::Deserialize;
use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Parser)]
#[command(name = "pybc")]
#[command(version)]
#[command(about = "View CPython bytecode disassembly for a source file")]
enum Commands {
    /// Disassemble a file once and render the result
    Show {
        /// Path to the Python source file
        path: PathBuf,

        /// Interpreter used to run the disassembly
        #[arg(short, long)]
        python: Option<String>,

        /// Selection group `line:col-line:col[,line:col-line:col...]`
        /// (0-based); may be repeated
        #[arg(short, long = "select", value_name = "RANGES")]
        select: Vec<String>,

        /// Color palette
        #[arg(long, value_enum)]
        theme: Option<Theme>,

        /// Emit the parsed blocks as JSON instead of rendering
        #[arg(long)]
        json: bool,

        /// Path to a JSON settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Increase logging level
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
    /// Re-render whenever the file changes, after a debounce quiet period
    Watch {
        /// Path to the Python source file
        path: PathBuf,

        /// Interpreter used to run the disassembly
        #[arg(short, long)]
        python: Option<String>,

        /// Color palette
        #[arg(long, value_enum)]
        theme: Option<Theme>,

        /// Quiet period after the last change before recomputing
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,

        /// Poll interval for file changes
        #[arg(long, value_name = "MS", default_value_t = 100)]
        interval_ms: u64,

        /// Path to a JSON settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Increase logging level
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
    /// Parse an existing disassembly transcript (stdin when no path given)
    Parse {
        /// Transcript file
        path: Option<PathBuf>,

        /// Emit the parsed blocks as JSON instead of rendering
        #[arg(long)]
        json: bool,

        /// Increase logging level
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
}

#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Theme {
    Light,
    Dark,
}

/// User preferences, read from an optional JSON file. Explicit flags win.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    python: Option<String>,
    debounce_ms: Option<u64>,
    theme: Option<Theme>,
}

impl Settings {
    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("unable to read settings at {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("malformed settings at {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    match Commands::parse() {
        Commands::Show {
            path,
            python,
            select,
            theme,
            json,
            config,
            verbose,
        } => show(&path, python, &select, theme, json, config.as_deref(), verbose),
        Commands::Watch {
            path,
            python,
            theme,
            debounce_ms,
            interval_ms,
            config,
            verbose,
        } => watch(
            &path,
            python,
            theme,
            debounce_ms,
            interval_ms,
            config.as_deref(),
            verbose,
        ),
        Commands::Parse {
            path,
            json,
            verbose,
        } => parse_transcript(path.as_deref(), json, verbose),
    }
}

fn show(
    path: &Path,
    python: Option<String>,
    select: &[String],
    theme: Option<Theme>,
    json: bool,
    config: Option<&Path>,
    verbose: u8,
) -> anyhow::Result<()> {
    init_logger(verbose);

    let settings = Settings::load(config)?;
    let mut panel = make_panel(path, python, theme, &settings);

    let groups = select
        .iter()
        .map(|spec| parse_selection_group(spec))
        .collect::<anyhow::Result<Vec<_>>>()?;
    panel.set_selections(&groups);

    panel.refresh()?;

    if json {
        if !panel.model().error().is_empty() {
            anyhow::bail!("{}", panel.model().error());
        }
        let blocks = parse_bytecode(panel.model().output());
        println!("{}", serde_json::to_string_pretty(&blocks)?);
    } else {
        render(panel.model(), &mut io::stdout().lock())?;
    }

    Ok(())
}

fn watch(
    path: &Path,
    python: Option<String>,
    theme: Option<Theme>,
    debounce_ms: Option<u64>,
    interval_ms: u64,
    config: Option<&Path>,
    verbose: u8,
) -> anyhow::Result<()> {
    init_logger(verbose);

    let settings = Settings::load(config)?;
    let debounce = debounce_ms.or(settings.debounce_ms).unwrap_or(300);
    let mut panel = make_panel(path, python, theme, &settings);

    let changes = panel.model_mut().subscribe();

    // Initial render before entering the poll loop.
    if let Err(e) = panel.refresh() {
        cprintln!("<red,bold>error</>: {e}");
    }
    while changes.try_recv().is_ok() {}
    redraw(panel.model())?;

    panel.watch(
        Duration::from_millis(interval_ms),
        Duration::from_millis(debounce),
        move |panel, outcome| {
            if let Err(e) = outcome {
                cprintln!("<red,bold>error</>: {e}");
                return true;
            }
            // Re-render only when the refresh actually changed the model.
            if changes.try_recv().is_ok() {
                while changes.try_recv().is_ok() {}
                return redraw(panel.model()).is_ok();
            }
            true
        },
    );

    Ok(())
}

fn redraw(model: &BytecodeModel) -> io::Result<()> {
    let mut out = io::stdout().lock();
    // Clear screen, cursor home.
    write!(out, "\x1b[2J\x1b[H")?;
    render(model, &mut out)?;
    out.flush()
}

fn parse_transcript(path: Option<&Path>, json: bool, verbose: u8) -> anyhow::Result<()> {
    init_logger(verbose);

    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("unable to read transcript at {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    if json {
        let blocks = parse_bytecode(&text);
        println!("{}", serde_json::to_string_pretty(&blocks)?);
    } else {
        let mut model = BytecodeModel::new();
        model.handle_kernel_message(&KernelMessage::Stream { text });
        render(&model, &mut io::stdout().lock())?;
    }

    Ok(())
}

fn make_panel(
    path: &Path,
    python: Option<String>,
    theme: Option<Theme>,
    settings: &Settings,
) -> Panel {
    let python = python
        .or_else(|| settings.python.clone())
        .unwrap_or_else(|| DEFAULT_PYTHON.to_string());
    let theme = theme.or(settings.theme).unwrap_or(Theme::Dark);

    let mut panel = Panel::new(path, PythonSession::new(python));
    panel.model_mut().set_is_light(theme == Theme::Light);
    panel
}

/// Parses one selection group: comma-separated `line:col-line:col` ranges.
fn parse_selection_group(spec: &str) -> anyhow::Result<Vec<Selection>> {
    spec.split(',').map(parse_selection).collect()
}

fn parse_selection(spec: &str) -> anyhow::Result<Selection> {
    let (start, end) = spec
        .split_once('-')
        .with_context(|| format!("invalid selection `{spec}`: expected `line:col-line:col`"))?;
    Ok(Selection::new(parse_position(start)?, parse_position(end)?))
}

fn parse_position(spec: &str) -> anyhow::Result<Position> {
    let (line, column) = spec
        .split_once(':')
        .with_context(|| format!("invalid position `{spec}`: expected `line:col`"))?;
    Ok(Position::new(
        line.trim().parse().context("line is not a number")?,
        column.trim().parse().context("column is not a number")?,
    ))
}

fn init_logger(verbosity: u8) {
    set_log_level(verbosity);
    env_logger::builder()
        .format_timestamp(None)
        .format_indent(None)
        .format_target(false)
        .init();
}

fn set_log_level(v: u8) {
    use std::env;
    match v {
        0 => env::set_var("RUST_LOG", "off"),
        1 => env::set_var("RUST_LOG", "warn"),
        2 => env::set_var("RUST_LOG", "info"),
        3 => env::set_var("RUST_LOG", "debug"),
        _ => env::set_var("RUST_LOG", "trace"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_selection_group, Settings, Theme};
    use pybc::select::{Position, Selection};

    #[test]
    fn selection_spec_round_trips() {
        let group = parse_selection_group("1:0-4:5").unwrap();

        assert_eq!(
            group,
            vec![Selection::new(Position::new(1, 0), Position::new(4, 5))]
        );
    }

    #[test]
    fn selection_group_splits_on_commas() {
        let group = parse_selection_group("0:0-0:3,2:1-3:0").unwrap();

        assert_eq!(group.len(), 2);
        assert_eq!(group[1].start, Position::new(2, 1));
        assert_eq!(group[1].end, Position::new(3, 0));
    }

    #[test]
    fn malformed_specs_are_rejected() {
        assert!(parse_selection_group("1-4").is_err());
        assert!(parse_selection_group("a:b-c:d").is_err());
        assert!(parse_selection_group("").is_err());
    }

    #[test]
    fn settings_parse_from_json() {
        let settings: Settings = serde_json::from_str(
            r#"{"python": "python3.12", "debounce_ms": 500, "theme": "light"}"#,
        )
        .unwrap();

        assert_eq!(settings.python.as_deref(), Some("python3.12"));
        assert_eq!(settings.debounce_ms, Some(500));
        assert!(matches!(settings.theme, Some(Theme::Light)));
    }
}
