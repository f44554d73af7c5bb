//! Locating paper source bundles on disk.
//!
//! Obtaining bundles from the network is a collaborator concern; the core
//! only needs a directory per paper id. [`LocalSource`] serves bundles that
//! are already on disk under `<root>/<id>/`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use papergraph_shared::{PaperGraphError, PaperId, Result};

/// Yields the local bundle directory for a paper id.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, id: &PaperId) -> Result<PathBuf>;
}

/// Bundle lookup over a pre-populated source root.
///
/// Old-style ids containing a slash (`hep-th/0001001`) map to directories
/// with the slash replaced by an underscore, matching the archive layout.
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SourceFetcher for LocalSource {
    async fn fetch(&self, id: &PaperId) -> Result<PathBuf> {
        let dir = self.root.join(id.as_str().replace('/', "_"));
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(PaperGraphError::validation(format!(
                "no source bundle for {id} under {}",
                self.root.display()
            )))
        }
    }
}

/// Pick the main `.tex` file of a bundle.
///
/// Prefers a file whose name contains `main`; otherwise takes the
/// lexicographically first `.tex` file so the choice is reproducible.
pub fn find_main_tex(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir).map_err(|e| PaperGraphError::io(dir, e))?;

    let mut tex_files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "tex"))
        .collect();
    tex_files.sort();

    tex_files
        .iter()
        .find(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().contains("main"))
        })
        .or_else(|| tex_files.first())
        .cloned()
        .ok_or_else(|| {
            PaperGraphError::parse(format!("no .tex file found in {}", dir.display()))
        })
}
