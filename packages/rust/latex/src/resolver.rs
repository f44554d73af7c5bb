//! Recursive `\input` resolution over a paper's source tree.
//!
//! A paper bundle is a forest of `.tex` fragments linked by inclusion
//! directives. [`resolve`] flattens it into one logical text by splicing
//! each included file in place. Directives introduced by a splice are
//! themselves resolved, so the result contains no reachable directive.
//!
//! The traversal is an explicit frame stack rather than native recursion:
//! the set of paths on the active chain doubles as the cycle detector, and
//! stack depth stays bounded no matter how the inclusion graph is shaped.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Matches `\input{filename}` and the bare `\input filename` form.
static INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\input(?:\{([^}]+)\}|[ \t]+([^\s\\{}%]+))").expect("valid regex"));

/// A fully flattened document plus the faults recovered along the way.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The logical text with every reachable directive substituted.
    pub text: String,
    /// One human-readable line per missing file or detected cycle.
    pub warnings: Vec<String>,
}

/// One file being spliced: its text and the read cursor into it.
struct Frame {
    text: String,
    pos: usize,
    path: PathBuf,
}

/// Flatten the document tree rooted at `root` into one logical text.
///
/// `root` may omit the `.tex` extension; all inclusion targets are resolved
/// relative to `base_dir`. Missing files and inclusion cycles substitute
/// empty text and record a warning — resolution itself never fails.
pub fn resolve(root: &Path, base_dir: &Path) -> Resolved {
    let mut out = String::new();
    let mut warnings = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    push_file(root, &mut stack, &mut warnings);

    loop {
        // Scan the top frame for the next directive. The frame borrow must
        // end before we can push the included file.
        let next = {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let rest = &frame.text[frame.pos..];
            match INPUT_RE.captures(rest) {
                Some(caps) => {
                    let m = caps.get(0).expect("capture group 0 always present");
                    let lead = rest[..m.start()].to_string();
                    let target = caps
                        .get(1)
                        .or_else(|| caps.get(2))
                        .map(|g| g.as_str().to_string())
                        .unwrap_or_default();
                    frame.pos += m.end();
                    Some((lead, target))
                }
                None => {
                    out.push_str(rest);
                    None
                }
            }
        };

        match next {
            Some((lead, target)) => {
                out.push_str(&lead);
                let candidate = base_dir.join(&target);
                match locate(&candidate) {
                    Some(path) if stack.iter().any(|f| f.path == path) => {
                        record(
                            &mut warnings,
                            format!(
                                "inclusion cycle at {}, substituting empty text",
                                path.display()
                            ),
                        );
                    }
                    Some(path) => match std::fs::read_to_string(&path) {
                        Ok(text) => stack.push(Frame {
                            text,
                            pos: 0,
                            path,
                        }),
                        Err(e) => record(
                            &mut warnings,
                            format!("failed to read {}: {e}", path.display()),
                        ),
                    },
                    None => record(
                        &mut warnings,
                        format!("file not found: {}", candidate.display()),
                    ),
                }
            }
            None => {
                stack.pop();
            }
        }
    }

    Resolved {
        text: out,
        warnings,
    }
}

/// Read the root file onto the stack, or record why it could not be read.
fn push_file(path: &Path, stack: &mut Vec<Frame>, warnings: &mut Vec<String>) {
    match locate(path) {
        Some(located) => match std::fs::read_to_string(&located) {
            Ok(text) => stack.push(Frame {
                text,
                pos: 0,
                path: located,
            }),
            Err(e) => record(
                warnings,
                format!("failed to read {}: {e}", located.display()),
            ),
        },
        None => record(warnings, format!("file not found: {}", path.display())),
    }
}

/// Find a file at `path`, retrying with a `.tex` extension appended.
///
/// Returns a canonical path so that cycle detection is not fooled by two
/// spellings of the same file.
fn locate(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return path.canonicalize().ok();
    }
    let mut with_ext = path.as_os_str().to_os_string();
    with_ext.push(".tex");
    let with_ext = PathBuf::from(with_ext);
    if with_ext.is_file() {
        with_ext.canonicalize().ok()
    } else {
        None
    }
}

fn record(warnings: &mut Vec<String>, message: String) {
    warn!("{message}");
    warnings.push(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    /// Create a temp bundle directory with the given (name, content) files.
    fn bundle(files: &[(&str, &str)]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pg_resolve_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create bundle dir");
        for (name, content) in files {
            std::fs::write(dir.join(name), content).expect("write bundle file");
        }
        dir
    }

    #[test]
    fn resolves_braced_input() {
        let dir = bundle(&[
            ("main.tex", "before \\input{intro} after"),
            ("intro.tex", "INTRO"),
        ]);
        let resolved = resolve(&dir.join("main.tex"), &dir);
        assert_eq!(resolved.text, "before INTRO after");
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn resolves_bare_input() {
        let dir = bundle(&[
            ("main.tex", "x \\input intro\ny"),
            ("intro.tex", "INTRO"),
        ]);
        let resolved = resolve(&dir.join("main.tex"), &dir);
        assert_eq!(resolved.text, "x INTRO\ny");
    }

    #[test]
    fn resolves_nested_inputs() {
        let dir = bundle(&[
            ("main.tex", "A\\input{mid}D"),
            ("mid.tex", "B\\input{leaf}C"),
            ("leaf.tex", "X"),
        ]);
        let resolved = resolve(&dir.join("main.tex"), &dir);
        assert_eq!(resolved.text, "ABXCD");
    }

    #[test]
    fn root_extension_retry() {
        let dir = bundle(&[("main.tex", "hello")]);
        let resolved = resolve(&dir.join("main"), &dir);
        assert_eq!(resolved.text, "hello");
    }

    #[test]
    fn missing_include_substitutes_empty_with_warning() {
        let dir = bundle(&[("main.tex", "a\\input{nope}b")]);
        let resolved = resolve(&dir.join("main.tex"), &dir);
        assert_eq!(resolved.text, "ab");
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("not found"));
    }

    #[test]
    fn missing_root_yields_empty_text() {
        let dir = bundle(&[]);
        let resolved = resolve(&dir.join("ghost.tex"), &dir);
        assert_eq!(resolved.text, "");
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn self_inclusion_terminates() {
        let dir = bundle(&[("main.tex", "start \\input{main} end")]);
        let resolved = resolve(&dir.join("main.tex"), &dir);
        assert_eq!(resolved.text, "start  end");
        assert!(resolved.warnings.iter().any(|w| w.contains("cycle")));
    }

    #[test]
    fn two_file_cycle_terminates_nonempty() {
        let dir = bundle(&[
            ("a.tex", "A1\\input{b}A2"),
            ("b.tex", "B1\\input{a}B2"),
        ]);
        let resolved = resolve(&dir.join("a.tex"), &dir);
        assert_eq!(resolved.text, "A1B1B2A2");
        assert!(!resolved.text.is_empty());
        assert!(resolved.warnings.iter().any(|w| w.contains("cycle")));
    }

    #[test]
    fn repeated_noncyclic_include_is_allowed() {
        // The same file twice on *sibling* branches is not a cycle.
        let dir = bundle(&[
            ("main.tex", "\\input{x}-\\input{x}"),
            ("x.tex", "X"),
        ]);
        let resolved = resolve(&dir.join("main.tex"), &dir);
        assert_eq!(resolved.text, "X-X");
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn resolution_is_idempotent() {
        let dir = bundle(&[
            ("main.tex", "A \\input{sub} B"),
            ("sub.tex", "S1 \\input{leaf} S2"),
            ("leaf.tex", "L"),
        ]);
        let first = resolve(&dir.join("main.tex"), &dir);
        let second = resolve(&dir.join("main.tex"), &dir);
        assert_eq!(first.text, second.text);
        assert_eq!(first.text, "A S1 L S2 B");
    }
}
