//! Query-time graph retrieval: anchors, one-hop expansion, context assembly.

use std::sync::Arc;

use tracing::{info, instrument};

use papergraph_embeddings::Embedder;
use papergraph_graph::GraphStore;
use papergraph_shared::{PaperGraphError, PaperId, Result, RetrievalContext};

/// Retrieves a grounded context for a natural-language query.
pub struct Retriever {
    store: Arc<dyn GraphStore>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub fn new(store: Arc<dyn GraphStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Retrieve the top-`k` anchors for `query` and expand their one-hop
    /// neighborhood.
    ///
    /// Zero anchors short-circuits to an empty context — a "no results"
    /// outcome, not an error. Fewer than `k` anchors on a small graph is
    /// likewise fine.
    #[instrument(skip_all, fields(k))]
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalContext> {
        if k == 0 {
            return Err(PaperGraphError::validation(
                "k must be a positive integer",
            ));
        }

        let embedding = self.embedder.embed(query).await?;
        let anchors = self.store.query_similar(&embedding, k).await?;
        info!(anchors = anchors.len(), "anchor selection complete");

        if anchors.is_empty() {
            return Ok(RetrievalContext::default());
        }

        let anchor_ids: Vec<PaperId> = anchors.iter().map(|a| a.id.clone()).collect();
        let edges = self.store.neighbors(&anchor_ids).await?;
        info!(edges = edges.len(), "neighborhood expansion complete");

        Ok(RetrievalContext { anchors, edges })
    }
}

// ---------------------------------------------------------------------------
// Context assembly
// ---------------------------------------------------------------------------

/// Render the retrieval context as a deterministic, human-readable block.
///
/// Anchors come first (title, similarity at two decimals, problem
/// statement), then the expansion edges (origin, label, destination,
/// reasoning when present, destination method). The semantic relation label
/// is preferred over the raw edge type. Ordering follows the order the
/// store returned — the renderer never re-sorts.
pub fn render_context(ctx: &RetrievalContext) -> String {
    let mut out = String::from("### Retrieved Papers (Anchors):\n");
    for anchor in &ctx.anchors {
        out.push_str(&format!(
            "- **{}** (Score: {:.2})\n  Problem: {}\n\n",
            anchor.title, anchor.score, anchor.problem
        ));
    }

    out.push_str("### Related Work (Graph Connections):\n");
    for edge in &ctx.edges {
        let relation = edge.relation_label.as_deref().unwrap_or(&edge.edge_type);
        out.push_str(&format!(
            "- **{}** --[{}]--> **{}**\n",
            edge.origin_title, relation, edge.neighbor_title
        ));
        if let Some(reasoning) = &edge.reasoning {
            out.push_str(&format!("  Reasoning: {reasoning}\n"));
        }
        out.push_str(&format!("  Neighbor Method: {}\n\n", edge.neighbor_method));
    }

    out
}

/// Wrap the rendered context into the prompt handed to the generation
/// collaborator.
pub fn build_prompt(query: &str, ctx: &RetrievalContext) -> String {
    format!(
        "You are an expert scientific assistant. Answer the user's question using the \
         provided context from the paper graph.\n\
         Use the semantic relations (e.g., Extend, Contrast, Support) to explain *how* \
         the papers are related, not just *that* they are related.\n\n\
         User Query: \"{query}\"\n\n{}\nAnswer:\n",
        render_context(ctx)
    )
}
