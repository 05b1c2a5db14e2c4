//! # dissoc-db
//!
//! PostgreSQL + PostGIS study store for neurodissoc.
//!
//! This crate provides:
//! - Lazy connection pool management and database URL normalization
//! - Schema-scoped read-only transactions over the study namespace
//! - The study set repository behind the dissociation engine
//! - The diagnostics repository behind `/test_db`
//!
//! ## Example
//!
//! ```rust,ignore
//! use dissoc_db::{Database, PoolConfig};
//!
//! let db = Database::connect_lazy(&url, "ns", PoolConfig::default())?;
//! let engine = dissoc_core::DissociationEngine::new(db.studies());
//! let result = engine.by_terms("pain", "visual").await?;
//! ```
pub mod diagnostics;
pub mod pool;
pub mod schema_context;
pub mod schema_validation;
pub mod studies;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use them
pub mod test_fixtures;

use std::sync::Arc;

use sqlx::PgPool;

// Re-export core types
pub use dissoc_core::*;

pub use diagnostics::PgDiagnosticsRepository;
pub use pool::{
    create_lazy_pool, create_pool, log_pool_metrics, normalize_database_url, PoolConfig,
};
pub use schema_context::{SchemaContext, DEFAULT_SCHEMA};
pub use schema_validation::validate_schema_name;
pub use studies::PgStudyRepository;

/// Database handle: one pool plus the repositories scoped to the study schema.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone, Debug)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: PgPool,
    /// Study set queries.
    pub studies: PgStudyRepository,
    /// Connectivity and schema diagnostics.
    pub diagnostics: PgDiagnosticsRepository,
    schema: String,
}

impl Database {
    /// Create a Database from an existing pool, scoped to `schema`.
    pub fn new(pool: PgPool, schema: &str) -> Result<Self> {
        let ctx = SchemaContext::new(pool.clone(), schema)?;
        Ok(Self {
            studies: PgStudyRepository::new(ctx.clone()),
            diagnostics: PgDiagnosticsRepository::new(ctx),
            schema: schema.to_string(),
            pool,
        })
    }

    /// Create a Database whose pool connects on first use.
    pub fn connect_lazy(url: &str, schema: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_lazy_pool(url, config)?;
        Self::new(pool, schema)
    }

    /// Study repository as a shareable trait object.
    pub fn studies(&self) -> Arc<dyn StudyRepository> {
        Arc::new(self.studies.clone())
    }

    /// Diagnostics repository as a shareable trait object.
    pub fn diagnostics(&self) -> Arc<dyn DiagnosticsRepository> {
        Arc::new(self.diagnostics.clone())
    }

    /// Schema namespace of the study tables.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_connect_lazy_does_not_touch_store() {
        let db = Database::connect_lazy(
            "postgres://u:p@localhost:1/ns",
            DEFAULT_SCHEMA,
            PoolConfig::default(),
        )
        .expect("lazy database");
        assert_eq!(db.schema(), "ns");
        assert_eq!(db.pool().size(), 0);
        assert_eq!(db.diagnostics().dialect(), "postgresql");
    }

    #[tokio::test]
    async fn test_database_rejects_unsafe_schema() {
        let err = Database::connect_lazy(
            "postgres://u:p@localhost:1/ns",
            "ns;drop",
            PoolConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
