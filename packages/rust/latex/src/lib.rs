//! LaTeX source handling: inclusion resolution, section extraction, and
//! plain-text normalization.
//!
//! This is deliberately not a LaTeX parser. It implements the three
//! heuristics the ingestion pipeline needs — recursive `\input` splicing,
//! `\section{...}` boundary detection, and command stripping — and promises
//! correctness only for well-formed, non-nested input.

mod normalize;
mod resolver;
mod section;

pub use normalize::normalize;
pub use resolver::{Resolved, resolve};
pub use section::{SectionSpan, extract_first, extract_section};
