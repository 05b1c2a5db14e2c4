//! Schema-scoped, read-only database access.
//!
//! The study tables live in their own namespace (`ns` by default). A
//! `SchemaContext` runs each unit of work in one read-only transaction whose
//! `search_path` points at that namespace, so queries use unqualified table
//! names.

use std::future::Future;
use std::pin::Pin;

use dissoc_core::{Error, Result};
use sqlx::{PgPool, Postgres, Transaction};

use crate::schema_validation::validate_schema_name;

/// Default namespace of the study tables.
pub const DEFAULT_SCHEMA: &str = "ns";

/// A database context scoped to one PostgreSQL schema.
///
/// # Examples
///
/// ```rust,ignore
/// let ctx = SchemaContext::new(pool, "ns")?;
/// let n: i64 = ctx
///     .read(|tx| Box::pin(async move {
///         sqlx::query_scalar("SELECT COUNT(*) FROM coordinates")
///             .fetch_one(&mut **tx)
///             .await
///             .map_err(Error::Database)
///     }))
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct SchemaContext {
    pool: PgPool,
    schema: String,
}

impl SchemaContext {
    /// Create a context for `schema`, rejecting unsafe names.
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        validate_schema_name(&schema)?;
        Ok(Self { pool, schema })
    }

    /// Get the schema name for this context.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Run `f` inside a read-only transaction with the search_path set.
    ///
    /// The connection is taken from the pool for the duration of the call and
    /// returned afterwards. On error the transaction is rolled back when it is
    /// dropped.
    pub async fn read<F, T>(&self, f: F) -> Result<T>
    where
        F: for<'a> FnOnce(
            &'a mut Transaction<'_, Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>,
    {
        let mut tx = self.begin_read().await?;
        let result = f(&mut tx).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(result)
    }

    /// Open a read-only transaction with the search_path set.
    ///
    /// For callers that need the transaction's partial results when a later
    /// statement fails; prefer [`SchemaContext::read`] otherwise.
    pub(crate) async fn begin_read(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        // Not parameterizable; the name was validated in new()
        let set_search_path = format!("SET LOCAL search_path TO {}, public", self.schema);
        sqlx::query(&set_search_path)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        Ok(tx)
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
