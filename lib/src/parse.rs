// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splits a `dis` transcript into blocks attributed to source lines.
//!
//! The transcript convention: a block starts with an indented 1-based source
//! line number, continuation instructions for the same line are indented
//! without a number, and blocks are separated by a blank line. Content that
//! does not fit the shape is dropped silently; a partially unparseable
//! transcript still yields whatever blocks did match.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One group of bytecode instructions compiled from a single source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisassemblyBlock {
    /// 0-based index of the originating source line.
    pub line: usize,
    /// Instruction text with the original leading indentation, trimmed of
    /// surrounding blank lines.
    pub code: String,
}

/// A block: line start, captured indentation, the 1-based line number, then a
/// lazy run of anything up to a double line break (`\r\n`, `\r` and `\n` all
/// count as one break). CRLF mode makes `^` anchor after bare `\r` line
/// terminators as well as `\n`.
fn block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?msR)^([ \t]*)([0-9]+).*?(?:\r\n|\r|\n){2}").unwrap())
}

/// Parses the textual output of a `dis.dis` call.
///
/// Returns the matched blocks sorted ascending by source line; the sort is
/// stable, so blocks repeating a line number keep their transcript order.
/// Empty input yields an empty vector.
pub fn parse_bytecode(text: &str) -> Vec<DisassemblyBlock> {
    if text.is_empty() {
        return Vec::new();
    }

    // Two trailing newlines guarantee the final block is terminated.
    let padded = format!("{text}\n\n");

    let mut blocks: Vec<_> = block_pattern()
        .captures_iter(&padded)
        .filter_map(|caps| {
            let number: usize = caps[2].parse().ok()?;
            let line = number.checked_sub(1)?;
            let code = format!("{}{}", &caps[1], caps[0].trim());
            Some(DisassemblyBlock { line, code })
        })
        .collect();

    trace!("parsed {} blocks from transcript", blocks.len());

    blocks.sort_by_key(|block| block.line);
    blocks
}
