// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps editor selections onto the set of source lines they cover.

use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, collections::HashSet, ops::RangeInclusive};

/// A cursor position, 0-based in both fields.
///
/// Ordering is by line, then column.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A contiguous selection between two positions, in either direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    fn ordered(self) -> (Position, Position) {
        if self.end < self.start {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        }
    }

    /// The inclusive interval of lines this selection covers.
    ///
    /// A multi-line selection ending at column 0 selects no character on its
    /// final line, so that line is excluded.
    pub fn lines(self) -> RangeInclusive<usize> {
        let (start, end) = self.ordered();

        let mut last = end.line;
        if last != start.line && end.column == 0 {
            last -= 1;
        }

        start.line..=last
    }
}

/// Collapses any number of selections into one deduplicated line set.
///
/// Grouped selections (an editor selection can itself be a short list of
/// ranges) are flattened one level by the caller with iterator adapters.
/// Recomputed in full on every selection change; there is no incremental
/// patching of a previous result.
pub fn selected_lines<I>(selections: I) -> HashSet<usize>
where
    I: IntoIterator,
    I::Item: Borrow<Selection>,
{
    selections
        .into_iter()
        .flat_map(|selection| selection.borrow().lines())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{selected_lines, Position, Selection};
    use std::collections::HashSet;

    fn sel(start: (usize, usize), end: (usize, usize)) -> Selection {
        Selection::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
    }

    fn set(lines: &[usize]) -> HashSet<usize> {
        lines.iter().copied().collect()
    }

    #[test]
    fn no_selections() {
        assert!(selected_lines(Vec::<Selection>::new()).is_empty());
    }

    #[test]
    fn single_line_selection() {
        assert_eq!(selected_lines([sel((3, 2), (3, 9))]), set(&[3]));
    }

    #[test]
    fn caret_without_extent() {
        assert_eq!(selected_lines([sel((7, 4), (7, 4))]), set(&[7]));
    }

    #[test]
    fn multi_line_ending_at_column_zero_excludes_last_line() {
        assert_eq!(selected_lines([sel((1, 0), (4, 0))]), set(&[1, 2, 3]));
    }

    #[test]
    fn multi_line_ending_past_column_zero_includes_last_line() {
        assert_eq!(selected_lines([sel((1, 0), (4, 5))]), set(&[1, 2, 3, 4]));
    }

    #[test]
    fn reversed_endpoints_normalize() {
        assert_eq!(selected_lines([sel((4, 5), (1, 0))]), set(&[1, 2, 3, 4]));
        assert_eq!(selected_lines([sel((4, 0), (1, 2))]), set(&[1, 2, 3]));
    }

    #[test]
    fn single_line_at_column_zero_still_counts() {
        // The column-0 exclusion applies to multi-line selections only.
        assert_eq!(selected_lines([sel((2, 0), (2, 0))]), set(&[2]));
    }

    #[test]
    fn grouped_selections_flatten_and_dedupe() {
        let groups = vec![
            vec![sel((0, 0), (1, 3)), sel((1, 0), (1, 8))],
            vec![sel((5, 2), (6, 0))],
        ];

        assert_eq!(
            selected_lines(groups.iter().flatten()),
            set(&[0, 1, 5])
        );
    }
}
