//! End-to-end ingest pipeline: bundles → extraction → embeddings → graph.
//!
//! Phases, in dependency order:
//! 1. resolve + extract + normalize, fanned out per paper
//! 2. embed and upsert nodes
//! 3. pairwise relation classification and edge upserts
//!
//! Faults are recovered at the granularity of the failing item: a paper that
//! cannot be extracted or embedded is skipped with a warning and the batch
//! continues. Store failures are structural and abort the phase. Node and
//! edge writes are merge-by-key, so re-running an interrupted ingest leaves
//! the graph in the same observable state.

use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use regex::Regex;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use papergraph_embeddings::{Embedder, cosine_similarity};
use papergraph_graph::GraphStore;
use papergraph_shared::{PaperGraphError, PaperId, PaperNode, Result, Thresholds};

use crate::classifier;
use crate::source::{self, SourceFetcher};

/// Section names tried for the problem statement.
const PROBLEM_SECTIONS: &[&str] = &["Introduction"];

/// Section names tried for the core method, in preference order. Survey
/// papers often describe their approach under "Capabilities".
const METHOD_SECTIONS: &[&str] = &["Methodology", "Method", "Approach", "Capabilities"];

/// Character budget for the display summaries stored on a node. Embeddings
/// always use the full normalized text.
const SUMMARY_CHARS: usize = 500;

/// Matches `\title{...}` for title recovery.
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\title\{([^}]*)\}").expect("valid regex"));

// ---------------------------------------------------------------------------
// Config and report
// ---------------------------------------------------------------------------

/// Configuration for one ingest run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Papers to ingest, in order.
    pub paper_ids: Vec<PaperId>,
    /// Classifier thresholds.
    pub thresholds: Thresholds,
    /// Concurrent per-paper extraction tasks.
    pub concurrency: usize,
}

/// Result of an ingest run, including everything that was skipped.
#[derive(Debug)]
pub struct IngestReport {
    /// Successfully stored nodes, in ingest order.
    pub nodes: Vec<PaperNode>,
    /// Papers dropped from the batch, with the reason.
    pub skipped: Vec<(PaperId, String)>,
    /// Recovered warnings (missing includes, cycles, absent sections).
    pub warnings: Vec<String>,
    /// Relation edges written in the pairwise phase.
    pub relations_written: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

/// Run the full ingest pipeline for a batch of papers.
#[instrument(skip_all, fields(papers = config.paper_ids.len()))]
pub async fn ingest(
    config: &IngestConfig,
    fetcher: Arc<dyn SourceFetcher>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn GraphStore>,
) -> Result<IngestReport> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut skipped: Vec<(PaperId, String)> = Vec::new();

    // --- Phase 1: resolve + extract + normalize, one task per paper ---
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut handles = Vec::with_capacity(config.paper_ids.len());

    for id in &config.paper_ids {
        let id = id.clone();
        let fetcher = Arc::clone(&fetcher);
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let result = extract_paper(&id, fetcher.as_ref()).await;
            (id, result)
        }));
    }

    let mut extracted = Vec::new();
    for handle in handles {
        match handle.await {
            Ok((_, Ok(paper))) => extracted.push(paper),
            Ok((id, Err(e))) => {
                warn!(paper = %id, error = %e, "extraction failed, skipping paper");
                skipped.push((id, e.to_string()));
            }
            Err(e) => {
                return Err(PaperGraphError::validation(format!(
                    "extraction task failed: {e}"
                )));
            }
        }
    }

    // --- Phase 2: embed + store nodes ---
    let mut nodes = Vec::with_capacity(extracted.len());
    for mut paper in extracted {
        warnings.append(&mut paper.warnings);
        match embed_paper(&paper, embedder.as_ref()).await {
            Ok(node) => {
                store.upsert_paper(&node).await?;
                nodes.push(node);
            }
            Err(e) => {
                warn!(paper = %paper.id, error = %e, "embedding failed, skipping paper");
                skipped.push((paper.id.clone(), e.to_string()));
            }
        }
    }

    // --- Phase 3: pairwise relations ---
    let relations_written = relate(&nodes, &config.thresholds, store.as_ref()).await?;

    let report = IngestReport {
        nodes,
        skipped,
        warnings,
        relations_written,
        elapsed: start.elapsed(),
    };

    info!(
        ingested = report.nodes.len(),
        skipped = report.skipped.len(),
        relations = report.relations_written,
        elapsed_ms = report.elapsed.as_millis(),
        "ingest complete"
    );

    Ok(report)
}

/// Classify every unordered pair of `nodes` and upsert one directed edge
/// per pair (earlier paper → later paper). Returns the number written.
pub async fn relate(
    nodes: &[PaperNode],
    thresholds: &Thresholds,
    store: &dyn GraphStore,
) -> Result<usize> {
    let mut written = 0;

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let (a, b) = (&nodes[i], &nodes[j]);
            let problem_sim = cosine_similarity(&a.embedding_problem, &b.embedding_problem);
            let method_sim = cosine_similarity(&a.embedding_method, &b.embedding_method);

            let edge = classifier::edge_for_pair(&a.id, &b.id, problem_sim, method_sim, thresholds);
            debug!(source = %a.id, target = %b.id, label = %edge.label, "classified pair");

            store.upsert_relation(&edge).await?;
            written += 1;
        }
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Per-paper extraction
// ---------------------------------------------------------------------------

/// A paper's extracted text, before embedding.
struct ExtractedPaper {
    id: PaperId,
    title: String,
    problem_summary: String,
    method_summary: String,
    problem_full: String,
    method_full: String,
    warnings: Vec<String>,
}

/// Locate, resolve, and section one paper bundle.
async fn extract_paper(id: &PaperId, fetcher: &dyn SourceFetcher) -> Result<ExtractedPaper> {
    let dir = fetcher.fetch(id).await?;
    let main_tex = source::find_main_tex(&dir)?;
    let resolved = papergraph_latex::resolve(&main_tex, &dir);

    let mut warnings: Vec<String> = resolved
        .warnings
        .iter()
        .map(|w| format!("{id}: {w}"))
        .collect();

    // A paper without a usable problem section has nothing to anchor on.
    let problem_full = papergraph_latex::extract_first(&resolved.text, PROBLEM_SECTIONS)
        .map(|span| papergraph_latex::normalize(&span.text))
        .filter(|text| !text.is_empty())
        .ok_or_else(|| PaperGraphError::parse(format!("no usable problem section in {id}")))?;

    let method_full = match papergraph_latex::extract_first(&resolved.text, METHOD_SECTIONS) {
        Some(span) => papergraph_latex::normalize(&span.text),
        None => {
            warnings.push(format!("{id}: no method section found, using empty text"));
            String::new()
        }
    };

    let title = extract_title(&resolved.text).unwrap_or_else(|| id.to_string());

    Ok(ExtractedPaper {
        id: id.clone(),
        title,
        problem_summary: truncate_summary(&problem_full, SUMMARY_CHARS),
        method_summary: truncate_summary(&method_full, SUMMARY_CHARS),
        problem_full,
        method_full,
        warnings,
    })
}

/// Embed the full section texts and assemble the node.
async fn embed_paper(paper: &ExtractedPaper, embedder: &dyn Embedder) -> Result<PaperNode> {
    let embedding_problem = embedder.embed(&paper.problem_full).await?;
    let embedding_method = embedder.embed(&paper.method_full).await?;

    Ok(PaperNode {
        id: paper.id.clone(),
        title: paper.title.clone(),
        year: 0,
        venue: "arXiv".into(),
        paper_type: "Unknown".into(),
        problem_statement: paper.problem_summary.clone(),
        core_method: paper.method_summary.clone(),
        key_findings: String::new(),
        embedding_problem,
        embedding_method,
    })
}

/// Recover the paper title from `\title{...}`, normalized.
fn extract_title(text: &str) -> Option<String> {
    TITLE_RE
        .captures(text)
        .map(|caps| papergraph_latex::normalize(&caps[1]))
        .filter(|title| !title.is_empty())
}

/// Truncate to a character budget, marking the cut with an ellipsis.
fn truncate_summary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::LocalSource;
    use papergraph_embeddings::HashEmbedder;
    use papergraph_graph::MemoryGraph;
    use std::path::{Path, PathBuf};
    use uuid::Uuid;

    const DIM: usize = 256;

    fn write_bundle(root: &Path, id: &str, main_tex: &str) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).expect("create bundle dir");
        std::fs::write(dir.join("main.tex"), main_tex).expect("write main.tex");
    }

    fn source_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("pg_pipeline_{}", Uuid::now_v7()));
        std::fs::create_dir_all(&root).expect("create source root");
        root
    }

    /// Two papers sharing a problem, with unrelated methods.
    fn seed_alternative_pair(root: &Path) {
        let shared_problem = "Taxonomy construction for scientific corpora fails to \
                              adapt to evolving research topics and terminology.";
        write_bundle(
            root,
            "1001.00001",
            &format!(
                "\\title{{Graph Expansion for Taxonomies}}\n\
                 \\section{{Introduction}}\n{shared_problem}\n\
                 \\section{{Method}}\nWe grow a directed acyclic graph with \
                 breadth first expansion and prune by corpus frequency.\n"
            ),
        );
        write_bundle(
            root,
            "1001.00002",
            &format!(
                "\\title{{Prompted Taxonomy Induction}}\n\
                 \\section{{Introduction}}\n{shared_problem}\n\
                 \\section{{Method}}\nLarge language model prompting with \
                 chain of thought sampling and self consistency voting.\n"
            ),
        );
    }

    fn config(ids: &[&str]) -> IngestConfig {
        IngestConfig {
            paper_ids: ids.iter().map(|id| PaperId::new(*id)).collect(),
            thresholds: Thresholds::default(),
            concurrency: 2,
        }
    }

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate_summary("short", 10), "short");
    }

    #[test]
    fn truncate_long_text_marks_cut() {
        let long = "x".repeat(20);
        let cut = truncate_summary(&long, 10);
        assert_eq!(cut, format!("{}...", "x".repeat(10)));
    }

    #[test]
    fn title_recovery_normalizes_markup() {
        let text = "\\title{A \\textbf{Bold} Title}\n\\section{Introduction}\nx";
        assert_eq!(extract_title(text).as_deref(), Some("A Bold Title"));
    }

    #[test]
    fn missing_title_is_none() {
        assert!(extract_title("\\section{Introduction}\nx").is_none());
    }

    #[tokio::test]
    async fn ingest_two_papers_writes_nodes_and_edge() {
        let root = source_root();
        seed_alternative_pair(&root);

        let store = Arc::new(MemoryGraph::new(DIM));
        let report = ingest(
            &config(&["1001.00001", "1001.00002"]),
            Arc::new(LocalSource::new(&root)),
            Arc::new(HashEmbedder::new(DIM)),
            Arc::clone(&store) as Arc<dyn GraphStore>,
        )
        .await
        .expect("ingest");

        assert_eq!(report.nodes.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.relations_written, 1);
        assert_eq!(store.paper_count(), 2);
        assert_eq!(store.relation_count(), 1);

        // Identical problem text, disjoint method vocabulary.
        let edges = store
            .neighbors(&[PaperId::new("1001.00001")])
            .await
            .expect("expand");
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0].relation_label.as_deref(),
            Some("Alternative-Approach")
        );
        assert_eq!(edges[0].origin_title, "Graph Expansion for Taxonomies");
        assert_eq!(edges[0].neighbor_title, "Prompted Taxonomy Induction");

        // Confidence is the mean of a ~1.0 problem similarity and a near-zero
        // method similarity.
        let edge = store
            .get_relation(
                &PaperId::new("1001.00001"),
                &PaperId::new("1001.00002"),
                classifier::HEURISTIC_PROVENANCE,
            )
            .expect("edge stored");
        assert!(edge.confidence > 0.4 && edge.confidence < 0.7);
        assert!(edge.reasoning.contains("Problem similarity"));
    }

    #[tokio::test]
    async fn reingest_is_idempotent() {
        let root = source_root();
        seed_alternative_pair(&root);
        let store = Arc::new(MemoryGraph::new(DIM));

        for _ in 0..2 {
            ingest(
                &config(&["1001.00001", "1001.00002"]),
                Arc::new(LocalSource::new(&root)),
                Arc::new(HashEmbedder::new(DIM)),
                Arc::clone(&store) as Arc<dyn GraphStore>,
            )
            .await
            .expect("ingest");
        }

        assert_eq!(store.paper_count(), 2);
        assert_eq!(store.relation_count(), 1);
    }

    #[tokio::test]
    async fn missing_bundle_is_skipped_not_fatal() {
        let root = source_root();
        seed_alternative_pair(&root);
        let store = Arc::new(MemoryGraph::new(DIM));

        let report = ingest(
            &config(&["1001.00001", "9999.99999", "1001.00002"]),
            Arc::new(LocalSource::new(&root)),
            Arc::new(HashEmbedder::new(DIM)),
            Arc::clone(&store) as Arc<dyn GraphStore>,
        )
        .await
        .expect("ingest");

        assert_eq!(report.nodes.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0.as_str(), "9999.99999");
        assert_eq!(report.relations_written, 1);
    }

    #[tokio::test]
    async fn paper_without_problem_section_is_skipped() {
        let root = source_root();
        write_bundle(
            &root,
            "1002.00001",
            "\\title{No Intro}\n\\section{Method}\nJust a method.\n",
        );
        let store = Arc::new(MemoryGraph::new(DIM));

        let report = ingest(
            &config(&["1002.00001"]),
            Arc::new(LocalSource::new(&root)),
            Arc::new(HashEmbedder::new(DIM)),
            Arc::clone(&store) as Arc<dyn GraphStore>,
        )
        .await
        .expect("ingest");

        assert!(report.nodes.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].1.contains("problem section"));
    }

    #[tokio::test]
    async fn missing_method_section_degrades_with_warning() {
        let root = source_root();
        write_bundle(
            &root,
            "1002.00002",
            "\\title{Intro Only}\n\\section{Introduction}\nA real problem statement.\n",
        );
        let store = Arc::new(MemoryGraph::new(DIM));

        let report = ingest(
            &config(&["1002.00002"]),
            Arc::new(LocalSource::new(&root)),
            Arc::new(HashEmbedder::new(DIM)),
            Arc::clone(&store) as Arc<dyn GraphStore>,
        )
        .await
        .expect("ingest");

        assert_eq!(report.nodes.len(), 1);
        assert!(report.nodes[0].core_method.is_empty());
        assert!(report.warnings.iter().any(|w| w.contains("no method section")));
    }

    #[tokio::test]
    async fn inclusion_warnings_surface_in_report() {
        let root = source_root();
        write_bundle(
            &root,
            "1002.00003",
            "\\title{T}\n\\section{Introduction}\nProblem text. \\input{missing}\n\
             \\section{Method}\nMethod text.\n",
        );
        let store = Arc::new(MemoryGraph::new(DIM));

        let report = ingest(
            &config(&["1002.00003"]),
            Arc::new(LocalSource::new(&root)),
            Arc::new(HashEmbedder::new(DIM)),
            Arc::clone(&store) as Arc<dyn GraphStore>,
        )
        .await
        .expect("ingest");

        assert_eq!(report.nodes.len(), 1);
        assert!(report.warnings.iter().any(|w| w.contains("not found")));
    }

    #[tokio::test]
    async fn methodology_preferred_over_capabilities() {
        let root = source_root();
        write_bundle(
            &root,
            "1002.00004",
            "\\section{Introduction}\nProblem.\n\
             \\section{Capabilities}\nFallback text.\n\
             \\section{Methodology}\nPreferred text.\n",
        );
        let store = Arc::new(MemoryGraph::new(DIM));

        let report = ingest(
            &config(&["1002.00004"]),
            Arc::new(LocalSource::new(&root)),
            Arc::new(HashEmbedder::new(DIM)),
            Arc::clone(&store) as Arc<dyn GraphStore>,
        )
        .await
        .expect("ingest");

        assert_eq!(report.nodes[0].core_method, "Preferred text.");
    }
}
