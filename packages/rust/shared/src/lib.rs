//! Shared types, errors, and configuration for PaperGraph.
//!
//! Every other crate in the workspace depends on this one; it carries no
//! domain logic of its own.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, DefaultsConfig, EmbeddingConfig, ThresholdsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_path, validate_config,
};
pub use error::{PaperGraphError, Result};
pub use types::{
    Anchor, NeighborEdge, PaperId, PaperNode, RelationEdge, RelationLabel, RetrievalContext,
    Thresholds,
};
