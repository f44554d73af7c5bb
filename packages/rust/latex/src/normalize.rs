//! LaTeX-to-plain-text normalization.
//!
//! Each pass is a regex substitution applied in a fixed order. The output
//! feeds embedding models and display summaries, so the goal is readable
//! prose, not round-trippable markup: citations and cross-references become
//! stable placeholder tokens, formatting commands are unwrapped to their
//! content, and everything else collapses to whitespace.

use std::sync::LazyLock;

use regex::Regex;

/// Line comments: `%` to end of line.
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%[^\n]*").expect("valid regex"));

/// Citation commands and their common synonyms (`\cite`, `\citep`, `\citet`).
static CITE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\cite[pt]?\{[^}]*\}").expect("valid regex"));

/// Cross-reference commands.
static REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\ref\{[^}]*\}").expect("valid regex"));

/// Commands carrying inline content, e.g. `\textbf{...}` — unwrapped, not deleted.
static ARG_CMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+\{([^}]*)\}").expect("valid regex"));

/// Bare commands with no argument, e.g. `\noindent`.
static BARE_CMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+").expect("valid regex"));

/// Runs of whitespace of any kind.
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize a LaTeX fragment into plain text.
///
/// Pure and idempotent: equal inputs yield equal outputs, and normalizing
/// an already-normalized string is a no-op. Empty input yields empty output.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let result = COMMENT_RE.replace_all(text, "");
    let result = CITE_RE.replace_all(&result, "[CITATION]");
    let result = REF_RE.replace_all(&result, "[REF]");
    let result = ARG_CMD_RE.replace_all(&result, "$1");
    let result = BARE_CMD_RE.replace_all(&result, " ");
    let result = WS_RE.replace_all(&result, " ");

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_comments() {
        let input = "Keep this % drop this\nand this";
        assert_eq!(normalize(input), "Keep this and this");
    }

    #[test]
    fn citations_become_placeholders() {
        let input = "Prior work \\cite{smith2020} and \\citep{jones2021,wu2022} agree.";
        assert_eq!(
            normalize(input),
            "Prior work [CITATION] and [CITATION] agree."
        );
    }

    #[test]
    fn citet_is_recognized() {
        assert_eq!(normalize("\\citet{a} showed X."), "[CITATION] showed X.");
    }

    #[test]
    fn references_become_placeholders() {
        let input = "See Section \\ref{sec:method} for details.";
        assert_eq!(normalize(input), "See Section [REF] for details.");
    }

    #[test]
    fn formatting_commands_are_unwrapped() {
        let input = "A \\textbf{bold} and \\emph{emphasized} claim.";
        assert_eq!(normalize(input), "A bold and emphasized claim.");
    }

    #[test]
    fn bare_commands_become_space() {
        let input = "\\noindent First.\\par Second.";
        assert_eq!(normalize(input), "First. Second.");
    }

    #[test]
    fn whitespace_collapses_and_trims() {
        let input = "  a\n\n  b\tc  ";
        assert_eq!(normalize(input), "a b c");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn whitespace_only_input_yields_empty_output() {
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Plain prose already.",
            "Mixed \\textit{markup} with \\cite{x} and % a comment\nmore",
            "\\section{Intro} text \\ref{a} \\noindent tail",
            "",
        ];
        for input in samples {
            let once = normalize(input);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn equal_inputs_equal_outputs() {
        let input = "Deterministic \\cite{x} output.";
        assert_eq!(normalize(input), normalize(input));
    }
}
