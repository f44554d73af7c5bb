//! Graph store interface and implementations.
//!
//! The core produces and consumes [`PaperNode`]/[`RelationEdge`] field
//! values; it never holds references into a store's internals. Everything a
//! store must do for the pipeline is the four operations on [`GraphStore`]:
//! idempotent node upsert, idempotent edge upsert keyed by
//! `(source, target, provenance)`, vector top-k over problem embeddings,
//! and one-hop neighbor expansion with edge metadata.
//!
//! Two implementations ship: [`MemoryGraph`] (identifier-keyed arenas, for
//! tests and store-free runs) and [`LocalGraph`] (embedded libSQL). A
//! production graph database sits behind the same trait.

mod local;
mod memory;
mod migrations;

use async_trait::async_trait;
use papergraph_shared::{Anchor, NeighborEdge, PaperId, PaperNode, RelationEdge, Result};

pub use local::LocalGraph;
pub use memory::MemoryGraph;

/// Raw edge type under which semantic relations are stored.
pub const EDGE_TYPE_SEMANTIC: &str = "SEMANTIC_RELATION";

/// The four store operations the pipeline depends on.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Insert or update a paper, merged by identifier (latest wins).
    /// Rejects embeddings that do not match the store's fixed dimensionality.
    async fn upsert_paper(&self, node: &PaperNode) -> Result<()>;

    /// Insert or update a relation edge, merged by
    /// `(source, target, provenance)` (latest payload wins).
    async fn upsert_relation(&self, edge: &RelationEdge) -> Result<()>;

    /// Top-`k` papers by cosine similarity of `embedding` against the stored
    /// problem embeddings, best first. Fewer than `k` results is not an
    /// error — a small graph returns what it has.
    async fn query_similar(&self, embedding: &[f32], k: usize) -> Result<Vec<Anchor>>;

    /// All edges touching any of `anchor_ids` in either direction, with the
    /// neighbor data needed to render a context block. Self-loops are
    /// skipped and each edge appears once even when both endpoints are
    /// anchors.
    async fn neighbors(&self, anchor_ids: &[PaperId]) -> Result<Vec<NeighborEdge>>;
}

/// Shared helper: validate a node's embeddings against a fixed dimension.
fn check_dimension(node: &PaperNode, dimension: usize) -> Result<()> {
    for (field, embedding) in [
        ("problem", &node.embedding_problem),
        ("method", &node.embedding_method),
    ] {
        if embedding.len() != dimension {
            return Err(papergraph_shared::PaperGraphError::validation(format!(
                "paper {}: {field} embedding has {} dimensions, store expects {dimension}",
                node.id,
                embedding.len()
            )));
        }
    }
    Ok(())
}
