//! Core pipeline orchestration and domain logic for PaperGraph.
//!
//! This crate ties together source location, LaTeX extraction, embedding,
//! relation classification, and graph storage into end-to-end workflows
//! (`ingest`), and implements query-time graph retrieval (`Retriever`).

pub mod classifier;
pub mod generation;
pub mod pipeline;
pub mod retriever;
pub mod source;
