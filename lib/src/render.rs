// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Draws a model snapshot to a terminal.

use crate::model::BytecodeModel;
use crate::parse::parse_bytecode;
use color_print::cwriteln;
use std::io::{self, Write};

/// Renders the model: the error if one is set (error display always wins
/// over output display), otherwise the parsed blocks with the highlight
/// style applied to selected lines. Blocks stay separated by a blank line.
pub fn render(model: &BytecodeModel, w: &mut impl Write) -> io::Result<()> {
    if !model.error().is_empty() {
        return cwriteln!(w, "<red,bold>error</>: {}", model.error());
    }

    for block in parse_bytecode(model.output()) {
        let highlighted = model.selected_lines().contains(&block.line);
        for line in block.code.lines() {
            write_line(w, line, highlighted, model.is_light())?;
        }
        writeln!(w)?;
    }

    Ok(())
}

fn write_line(w: &mut impl Write, line: &str, highlighted: bool, light: bool) -> io::Result<()> {
    match (highlighted, light) {
        (true, true) => cwriteln!(w, "<black,bg:yellow>{line}</>"),
        (true, false) => cwriteln!(w, "<bold,bg:blue>{line}</>"),
        (false, _) => writeln!(w, "{line}"),
    }
}
