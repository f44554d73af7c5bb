//! In-process graph store: arenas keyed by identifier strings.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use papergraph_embeddings::cosine_similarity;
use papergraph_shared::{Anchor, NeighborEdge, PaperId, PaperNode, RelationEdge, Result};

use crate::{EDGE_TYPE_SEMANTIC, GraphStore, check_dimension};

/// Edge identity key: `(source, target, provenance)`.
type EdgeKey = (String, String, String);

#[derive(Default)]
struct Inner {
    papers: HashMap<String, PaperNode>,
    relations: HashMap<EdgeKey, RelationEdge>,
}

/// A [`GraphStore`] held entirely in memory. Used by tests and store-free
/// pipeline runs; contents die with the process.
pub struct MemoryGraph {
    dimension: usize,
    inner: Mutex<Inner>,
}

impl MemoryGraph {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Number of stored papers.
    pub fn paper_count(&self) -> usize {
        self.inner.lock().expect("lock poisoned").papers.len()
    }

    /// Number of stored relation edges.
    pub fn relation_count(&self) -> usize {
        self.inner.lock().expect("lock poisoned").relations.len()
    }

    /// Fetch one edge by its identity key.
    pub fn get_relation(
        &self,
        source: &PaperId,
        target: &PaperId,
        provenance: &str,
    ) -> Option<RelationEdge> {
        let key = (
            source.0.clone(),
            target.0.clone(),
            provenance.to_string(),
        );
        self.inner
            .lock()
            .expect("lock poisoned")
            .relations
            .get(&key)
            .cloned()
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn upsert_paper(&self, node: &PaperNode) -> Result<()> {
        check_dimension(node, self.dimension)?;
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.papers.insert(node.id.0.clone(), node.clone());
        Ok(())
    }

    async fn upsert_relation(&self, edge: &RelationEdge) -> Result<()> {
        let key = (
            edge.source.0.clone(),
            edge.target.0.clone(),
            edge.provenance.clone(),
        );
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.relations.insert(key, edge.clone());
        Ok(())
    }

    async fn query_similar(&self, embedding: &[f32], k: usize) -> Result<Vec<Anchor>> {
        let inner = self.inner.lock().expect("lock poisoned");

        let mut anchors: Vec<Anchor> = inner
            .papers
            .values()
            .map(|node| Anchor {
                id: node.id.clone(),
                title: node.title.clone(),
                problem: node.problem_statement.clone(),
                score: cosine_similarity(embedding, &node.embedding_problem),
            })
            .collect();

        // Best first; ties broken by id so the order is reproducible.
        anchors.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        anchors.truncate(k);
        Ok(anchors)
    }

    async fn neighbors(&self, anchor_ids: &[PaperId]) -> Result<Vec<NeighborEdge>> {
        let inner = self.inner.lock().expect("lock poisoned");
        let anchors: HashSet<&str> = anchor_ids.iter().map(|id| id.0.as_str()).collect();

        let mut keys: Vec<&EdgeKey> = inner
            .relations
            .keys()
            .filter(|(source, target, _)| {
                source != target && (anchors.contains(source.as_str()) || anchors.contains(target.as_str()))
            })
            .collect();
        keys.sort();

        let mut edges = Vec::with_capacity(keys.len());
        for key in keys {
            let edge = &inner.relations[key];
            // Endpoints must both exist to render titles and summaries.
            let (Some(source), Some(target)) = (
                inner.papers.get(&edge.source.0),
                inner.papers.get(&edge.target.0),
            ) else {
                continue;
            };
            edges.push(NeighborEdge {
                origin_title: source.title.clone(),
                edge_type: EDGE_TYPE_SEMANTIC.to_string(),
                relation_label: Some(edge.label.clone()),
                reasoning: Some(edge.reasoning.clone()),
                neighbor_title: target.title.clone(),
                neighbor_problem: target.problem_statement.clone(),
                neighbor_method: target.core_method.clone(),
            });
        }
        Ok(edges)
    }
}
