// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns raw source text into a disassembly command for the interpreter.

/// Escapes source text for embedding inside a triple-double-quoted string
/// literal.
///
/// Backslashes are doubled first, so the backslashes inserted for the
/// triple-quote runs are not themselves re-escaped. Every non-overlapping run
/// of three `"` becomes `\"\"\"`; nothing else is altered, so input without
/// backslashes or docstring quotes comes back equal to itself.
pub fn escape_source(code: &str) -> String {
    code.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}

/// Builds the two-line command executed by the backend: an import followed by
/// a `dis.dis` call over the escaped source.
pub fn disassembly_command(code: &str) -> String {
    format!("import dis\ndis.dis(\"\"\"{}\"\"\")", escape_source(code))
}

#[cfg(test)]
mod tests {
    use super::{disassembly_command, escape_source};

    const ESCAPED_RUN: &str = "\\\"\\\"\\\"";

    fn src(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn empty_input() {
        assert_eq!(escape_source(""), "");
    }

    #[test]
    fn hash_comments_untouched() {
        let code = src(&["import math", "# an important constant", "math.pi"]);
        assert_eq!(escape_source(&code), code);
    }

    #[test]
    fn docstring_boundaries_escaped() {
        let code = src(&[
            "import math",
            "\"\"\"",
            "an important constant",
            "\"\"\"",
            "math.pi",
        ]);

        let escaped = escape_source(&code);

        assert_eq!(escaped.matches(ESCAPED_RUN).count(), 2);
    }

    #[test]
    fn two_docstrings_give_four_runs() {
        let code = src(&[
            "\"\"\"first\"\"\"",
            "x = 1",
            "\"\"\"second\"\"\"",
        ]);

        assert_eq!(escape_source(&code).matches(ESCAPED_RUN).count(), 4);
    }

    #[test]
    fn empty_docstrings_escaped_and_kept() {
        let code = src(&["import math", "\"\"\"\"\"\"", "\"\"\"\"\"\"", "math.pi"]);

        let escaped = escape_source(&code);

        assert_eq!(escaped.matches(ESCAPED_RUN).count(), 4);
        assert!(escaped.contains("\\\"\\\"\\\"\\\"\\\"\\\""));
    }

    #[test]
    fn backslashes_doubled_before_quotes() {
        assert_eq!(escape_source("print(\"\\n\")"), "print(\"\\\\n\")");
        // A backslash touching a docstring boundary must not eat the
        // backslash inserted for the quotes.
        assert_eq!(escape_source("\\\"\"\""), "\\\\\\\"\\\"\\\"");
    }

    #[test]
    fn command_wraps_escaped_source() {
        let command = disassembly_command("x = 1");

        assert_eq!(command, "import dis\ndis.dis(\"\"\"x = 1\"\"\")");
    }
}
