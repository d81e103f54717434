// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Glue between a watched source file, the interpreter session, and the
//! model.

use crate::format;
use crate::kernel::{PythonSession, SessionResult};
use crate::model::BytecodeModel;
use crate::select::{selected_lines, Selection};
use crossbeam_channel::tick;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant, SystemTime},
};

/// One viewer panel: a source file, the session disassembling it, and the
/// model the renderer reads.
pub struct Panel {
    model: BytecodeModel,
    session: PythonSession,
    path: PathBuf,
}

impl Panel {
    pub fn new(path: impl Into<PathBuf>, session: PythonSession) -> Self {
        Self {
            model: BytecodeModel::new(),
            session,
            path: path.into(),
        }
    }

    pub fn model(&self) -> &BytecodeModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut BytecodeModel {
        &mut self.model
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Takes a fresh snapshot of the file and reruns the disassembly,
    /// feeding every backend message to the model.
    pub fn refresh(&mut self) -> SessionResult {
        let source = fs::read_to_string(&self.path)?;
        let command = format::disassembly_command(&source);

        for message in self.session.execute(&command)? {
            self.model.handle_kernel_message(&message);
        }

        Ok(())
    }

    /// Replaces the highlight set from one-level-grouped editor selections.
    pub fn set_selections(&mut self, groups: &[Vec<Selection>]) {
        self.model
            .set_selected_lines(selected_lines(groups.iter().flatten()));
    }

    /// Polls the file for modification-time changes, collapsing a burst of
    /// writes into a single [`refresh`](Self::refresh) once no change has
    /// been seen for the `debounce` quiet period.
    ///
    /// `on_settle` runs after every refresh with the refresh outcome;
    /// returning `false` stops the loop. A vanished file shows up as an I/O
    /// error on the next settle and polling continues, since editors often
    /// save by replacing the file.
    pub fn watch<F>(&mut self, interval: Duration, debounce: Duration, mut on_settle: F)
    where
        F: FnMut(&Panel, SessionResult) -> bool,
    {
        info!("watching {} for changes", self.path.display());

        let ticks = tick(interval);
        let mut last_seen = modified_at(&self.path);
        let mut pending: Option<Instant> = None;

        loop {
            if ticks.recv().is_err() {
                break;
            }

            let modified = modified_at(&self.path);
            if modified != last_seen {
                last_seen = modified;
                pending = Some(Instant::now());
                continue;
            }

            let Some(since) = pending else { continue };
            if since.elapsed() < debounce {
                continue;
            }

            pending = None;
            debug!("change settled, refreshing {}", self.path.display());
            let outcome = self.refresh();
            if !on_settle(self, outcome) {
                break;
            }
        }
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::Panel;
    use crate::kernel::{PythonSession, SessionError};
    use crate::select::{Position, Selection};

    #[test]
    fn missing_file_surfaces_as_io_error() {
        let mut panel = Panel::new(
            "definitely/not/a/real/file.py",
            PythonSession::new("python3"),
        );

        let err = panel.refresh().unwrap_err();

        assert!(matches!(err, SessionError::Io(_)));
    }

    #[test]
    fn selections_flow_into_the_model() {
        let mut panel = Panel::new("unused.py", PythonSession::default());

        panel.set_selections(&[vec![Selection::new(
            Position::new(1, 0),
            Position::new(4, 0),
        )]]);

        let lines = panel.model().selected_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&1) && lines.contains(&2) && lines.contains(&3));
        assert!(!lines.contains(&4));
    }

    #[test]
    fn empty_selection_groups_clear_the_highlight() {
        let mut panel = Panel::new("unused.py", PythonSession::default());

        panel.set_selections(&[vec![Selection::new(
            Position::new(0, 0),
            Position::new(0, 5),
        )]]);
        panel.set_selections(&[]);

        assert!(panel.model().selected_lines().is_empty());
    }
}
