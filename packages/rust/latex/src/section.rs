//! Best-effort `\section{...}` span extraction.

use regex::RegexBuilder;

/// A named section's text, extracted from a logical document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpan {
    pub name: String,
    pub text: String,
}

/// Extract the first section whose marker matches `name`.
///
/// Matching is case-insensitive and tolerates a trailing annotation between
/// the name and the closing brace (`\section{Method \label{sec:m}}`). The
/// span runs from the end of the matched marker to the next `\section{` of
/// any name, or to the end of the document. Returns `None` when no marker
/// matches.
///
/// This is a heuristic, not a grammar: overlapping or malformed markers
/// yield a best-effort result, and only well-formed non-nested markers are
/// guaranteed correct.
pub fn extract_section(text: &str, name: &str) -> Option<SectionSpan> {
    let pattern = format!(
        r"\\section\{{{}[^}}]*\}}(.*?)(?:\\section\{{|\z)",
        regex::escape(name)
    );
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .ok()?;

    re.captures(text).map(|caps| SectionSpan {
        name: name.to_string(),
        text: caps[1].trim().to_string(),
    })
}

/// Extract the first section found among `names`, trying each in order.
pub fn extract_first(text: &str, names: &[&str]) -> Option<SectionSpan> {
    names.iter().find_map(|name| extract_section(text, name))
}
