//! Core domain types for the paper graph.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PaperId
// ---------------------------------------------------------------------------

/// Identifier of a paper, e.g. an arXiv id such as `2108.07258`.
///
/// Globally unique within a graph; the store enforces uniqueness on upsert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperId(pub String);

impl PaperId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaperId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PaperId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// PaperNode
// ---------------------------------------------------------------------------

/// A paper node as stored in the graph.
///
/// `problem_statement` and `core_method` are display summaries; the embedding
/// vectors are computed from the full normalized section texts. Both vectors
/// must have the store's fixed dimensionality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperNode {
    /// Unique identifier.
    pub id: PaperId,
    /// Paper title (recovered from `\title{...}` where possible).
    pub title: String,
    /// Publication year, 0 when unknown.
    pub year: i64,
    /// Venue, e.g. "arXiv" or "ACL".
    pub venue: String,
    /// Coarse paper type, e.g. "Survey", "Methodology", "Unknown".
    pub paper_type: String,
    /// Natural-language summary of the problem the paper addresses.
    pub problem_statement: String,
    /// Natural-language summary of the core method.
    pub core_method: String,
    /// Key findings, empty when not extracted.
    pub key_findings: String,
    /// Embedding of the full normalized problem text.
    pub embedding_problem: Vec<f32>,
    /// Embedding of the full normalized method text.
    pub embedding_method: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Relations
// ---------------------------------------------------------------------------

/// A classified relation between two papers, produced by one classification
/// method. The tagged variants cover the heuristic similarity table plus the
/// richer labels used by model-based classification paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationLabel {
    PotentialDuplicateOrIncremental,
    AlternativeApproach,
    RelatedWorkModerateOverlap,
    MethodReuse,
    LikelyUnrelated,
    LooselyRelated,
    Extend,
    Support,
    Contrast,
    Background,
    Unrelated,
}

impl RelationLabel {
    /// Canonical string form, used when storing an edge.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PotentialDuplicateOrIncremental => "Potential-Duplicate-or-Incremental",
            Self::AlternativeApproach => "Alternative-Approach",
            Self::RelatedWorkModerateOverlap => "Related-Work-Moderate-Overlap",
            Self::MethodReuse => "Method-Reuse",
            Self::LikelyUnrelated => "Likely-Unrelated",
            Self::LooselyRelated => "Loosely-Related",
            Self::Extend => "Extend",
            Self::Support => "Support",
            Self::Contrast => "Contrast",
            Self::Background => "Background",
            Self::Unrelated => "Unrelated",
        }
    }
}

impl std::fmt::Display for RelationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed relation edge between two papers.
///
/// Identity key is `(source, target, provenance)`: the same ordered pair may
/// carry one edge per classification method, and re-writing an edge with an
/// existing key merges (latest payload wins). The label is stored as free
/// text so the taxonomy can grow without a schema migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationEdge {
    pub source: PaperId,
    pub target: PaperId,
    /// Relation label, usually one of [`RelationLabel`]'s canonical forms.
    pub label: String,
    /// Numeric confidence in `[0, 1]`.
    pub confidence: f32,
    /// Free-text justification, citing the evidence behind the label.
    pub reasoning: String,
    /// Which classification method produced this edge.
    pub provenance: String,
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// An anchor paper selected by vector similarity against a query.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub id: PaperId,
    pub title: String,
    /// Problem-statement summary, shown in the rendered context.
    pub problem: String,
    /// Cosine similarity against the query embedding.
    pub score: f32,
}

/// One edge of an anchor's one-hop neighborhood, with enough neighbor data
/// to render the context block without further lookups.
#[derive(Debug, Clone)]
pub struct NeighborEdge {
    pub origin_title: String,
    /// Raw edge type in the store, e.g. `SEMANTIC_RELATION`.
    pub edge_type: String,
    /// Semantic relation label, preferred over `edge_type` when present.
    pub relation_label: Option<String>,
    pub reasoning: Option<String>,
    pub neighbor_title: String,
    pub neighbor_problem: String,
    pub neighbor_method: String,
}

/// Query-scoped retrieval result: anchors plus their expanded neighborhood.
/// Ephemeral — built per query, never persisted.
#[derive(Debug, Clone, Default)]
pub struct RetrievalContext {
    pub anchors: Vec<Anchor>,
    pub edges: Vec<NeighborEdge>,
}

impl RetrievalContext {
    /// True when anchor selection found nothing (the "no results" outcome).
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Similarity thresholds for the heuristic relation classifier.
/// Invariant: `high > low`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub high: f32,
    pub low: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: 0.75,
            low: 0.5,
        }
    }
}
