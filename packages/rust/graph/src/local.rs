//! Embedded libSQL graph store.
//!
//! Stores papers and relation edges in a local database file. Top-k anchor
//! selection scans the stored problem embeddings and ranks by cosine
//! similarity in-process — the embedded stand-in for a production store's
//! vector index.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};
use papergraph_embeddings::cosine_similarity;
use papergraph_shared::{
    Anchor, NeighborEdge, PaperGraphError, PaperId, PaperNode, RelationEdge, Result,
};

use crate::{EDGE_TYPE_SEMANTIC, GraphStore, check_dimension, migrations};

/// Graph store backed by a local libSQL database file.
pub struct LocalGraph {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    dimension: usize,
}

impl LocalGraph {
    /// Open or create a database at `path` with the given fixed embedding
    /// dimensionality, applying pending migrations.
    pub async fn open(path: &Path, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(PaperGraphError::validation(
                "embedding dimension must be positive",
            ));
        }

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PaperGraphError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;

        let store = Self {
            db,
            conn,
            dimension,
        };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        PaperGraphError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// List stored papers as `(id, title, year)`, ordered by id.
    pub async fn list_papers(&self) -> Result<Vec<(String, String, i64)>> {
        let mut rows = self
            .conn
            .query("SELECT id, title, year FROM papers ORDER BY id", params![])
            .await
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push((
                row.get::<String>(0)
                    .map_err(|e| PaperGraphError::Storage(e.to_string()))?,
                row.get::<String>(1)
                    .map_err(|e| PaperGraphError::Storage(e.to_string()))?,
                row.get::<i64>(2)
                    .map_err(|e| PaperGraphError::Storage(e.to_string()))?,
            ));
        }
        Ok(results)
    }

    /// Number of stored relation edges.
    pub async fn count_relations(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM relations", params![])
            .await
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n as u64)
                .map_err(|e| PaperGraphError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(PaperGraphError::Storage(e.to_string())),
        }
    }

    /// Fetch edges touching one paper id, in either direction.
    async fn edges_for(&self, id: &str) -> Result<Vec<(String, RelationEdge, EdgeEndpoints)>> {
        let mut rows = self
            .conn
            .query(
                "SELECT r.source_id, r.target_id, r.label, r.confidence, r.reasoning,
                        r.provenance, s.title, t.title, t.problem_statement, t.core_method
                 FROM relations r
                 JOIN papers s ON s.id = r.source_id
                 JOIN papers t ON t.id = r.target_id
                 WHERE r.source_id <> r.target_id
                   AND (r.source_id = ?1 OR r.target_id = ?1)
                 ORDER BY r.source_id, r.target_id, r.provenance",
                params![id],
            )
            .await
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let source: String = get_column(&row, 0)?;
            let target: String = get_column(&row, 1)?;
            let provenance: String = get_column(&row, 5)?;
            let key = format!("{source}\u{1f}{target}\u{1f}{provenance}");

            let edge = RelationEdge {
                source: PaperId::new(source),
                target: PaperId::new(target),
                label: get_column(&row, 2)?,
                confidence: row
                    .get::<f64>(3)
                    .map_err(|e| PaperGraphError::Storage(e.to_string()))? as f32,
                reasoning: get_column(&row, 4)?,
                provenance,
            };
            let endpoints = EdgeEndpoints {
                source_title: get_column(&row, 6)?,
                target_title: get_column(&row, 7)?,
                target_problem: get_column(&row, 8)?,
                target_method: get_column(&row, 9)?,
            };
            results.push((key, edge, endpoints));
        }
        Ok(results)
    }
}

/// Endpoint data joined alongside an edge row.
struct EdgeEndpoints {
    source_title: String,
    target_title: String,
    target_problem: String,
    target_method: String,
}

fn get_column(row: &libsql::Row, index: i32) -> Result<String> {
    row.get::<String>(index)
        .map_err(|e| PaperGraphError::Storage(e.to_string()))
}

#[async_trait]
impl GraphStore for LocalGraph {
    async fn upsert_paper(&self, node: &PaperNode) -> Result<()> {
        check_dimension(node, self.dimension)?;

        let embedding_problem = serde_json::to_string(&node.embedding_problem)
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;
        let embedding_method = serde_json::to_string(&node.embedding_method)
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO papers (id, title, year, venue, paper_type, problem_statement,
                                     core_method, key_findings, embedding_problem,
                                     embedding_method, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(id) DO UPDATE SET
                   title = excluded.title,
                   year = excluded.year,
                   venue = excluded.venue,
                   paper_type = excluded.paper_type,
                   problem_statement = excluded.problem_statement,
                   core_method = excluded.core_method,
                   key_findings = excluded.key_findings,
                   embedding_problem = excluded.embedding_problem,
                   embedding_method = excluded.embedding_method,
                   updated_at = excluded.updated_at",
                params![
                    node.id.as_str(),
                    node.title.as_str(),
                    node.year,
                    node.venue.as_str(),
                    node.paper_type.as_str(),
                    node.problem_statement.as_str(),
                    node.core_method.as_str(),
                    node.key_findings.as_str(),
                    embedding_problem.as_str(),
                    embedding_method.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn upsert_relation(&self, edge: &RelationEdge) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO relations (source_id, target_id, label, confidence, reasoning,
                                        provenance, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(source_id, target_id, provenance) DO UPDATE SET
                   label = excluded.label,
                   confidence = excluded.confidence,
                   reasoning = excluded.reasoning,
                   created_at = excluded.created_at",
                params![
                    edge.source.as_str(),
                    edge.target.as_str(),
                    edge.label.as_str(),
                    f64::from(edge.confidence),
                    edge.reasoning.as_str(),
                    edge.provenance.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn query_similar(&self, embedding: &[f32], k: usize) -> Result<Vec<Anchor>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, title, problem_statement, embedding_problem FROM papers ORDER BY id",
                params![],
            )
            .await
            .map_err(|e| PaperGraphError::Storage(e.to_string()))?;

        let mut anchors = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let stored: Vec<f32> = serde_json::from_str(&get_column(&row, 3)?)
                .map_err(|e| PaperGraphError::Storage(format!("corrupt embedding: {e}")))?;
            anchors.push(Anchor {
                id: PaperId::new(get_column(&row, 0)?),
                title: get_column(&row, 1)?,
                problem: get_column(&row, 2)?,
                score: cosine_similarity(embedding, &stored),
            });
        }

        anchors.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        anchors.truncate(k);
        Ok(anchors)
    }

    async fn neighbors(&self, anchor_ids: &[PaperId]) -> Result<Vec<NeighborEdge>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut edges = Vec::new();

        for id in anchor_ids {
            for (key, edge, endpoints) in self.edges_for(id.as_str()).await? {
                if !seen.insert(key) {
                    continue; // already collected via another anchor
                }
                edges.push(NeighborEdge {
                    origin_title: endpoints.source_title,
                    edge_type: EDGE_TYPE_SEMANTIC.to_string(),
                    relation_label: Some(edge.label),
                    reasoning: Some(edge.reasoning),
                    neighbor_title: endpoints.target_title,
                    neighbor_problem: endpoints.target_problem,
                    neighbor_method: endpoints.target_method,
                });
            }
        }
        Ok(edges)
    }
}
