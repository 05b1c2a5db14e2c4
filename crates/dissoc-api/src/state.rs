//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use dissoc_core::{DiagnosticsRepository, DissociationEngine, StudyRepository};
use dissoc_db::Database;

/// State handed to every handler. Clones share the store.
#[derive(Clone)]
pub struct AppState {
    pub engine: DissociationEngine,
    pub diagnostics: Arc<dyn DiagnosticsRepository>,
    /// Image served by `/img`.
    pub image_path: PathBuf,
}

impl AppState {
    /// Build state over any store implementation.
    pub fn new(
        studies: Arc<dyn StudyRepository>,
        diagnostics: Arc<dyn DiagnosticsRepository>,
        image_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine: DissociationEngine::new(studies),
            diagnostics,
            image_path: image_path.into(),
        }
    }

    /// Build state over the PostgreSQL store.
    pub fn from_database(db: &Database, image_path: impl Into<PathBuf>) -> Self {
        Self::new(db.studies(), db.diagnostics(), image_path)
    }
}
