//! Connectivity and schema introspection for the study tables.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{Connection, Postgres, Transaction};
use tracing::{info, warn};

use dissoc_core::{DiagnosticReport, DiagnosticsRepository, Error, Result};

use crate::pool::log_pool_metrics;
use crate::schema_context::SchemaContext;

/// Tables that must exist in the study namespace.
pub const STUDY_TABLES: [&str; 3] = ["coordinates", "metadata", "annotations_terms"];

/// Rows returned per sample.
pub const SAMPLE_LIMIT: i64 = 3;

const COORDINATES_SAMPLE_SQL: &str = r#"
    SELECT jsonb_build_object(
        'study_id', study_id,
        'x', ST_X(geom),
        'y', ST_Y(geom),
        'z', ST_Z(geom)
    )
    FROM coordinates
    LIMIT $1
"#;

const METADATA_SAMPLE_SQL: &str = "SELECT to_jsonb(m) FROM metadata m LIMIT $1";

const ANNOTATIONS_SAMPLE_SQL: &str = r#"
    SELECT jsonb_build_object(
        'study_id', study_id,
        'contrast_id', contrast_id,
        'term', term,
        'weight', weight
    )
    FROM annotations_terms
    LIMIT $1
"#;

/// PostgreSQL implementation of DiagnosticsRepository.
#[derive(Clone, Debug)]
pub struct PgDiagnosticsRepository {
    ctx: SchemaContext,
}

impl PgDiagnosticsRepository {
    pub fn new(ctx: SchemaContext) -> Self {
        Self { ctx }
    }
}

async fn count_rows(tx: &mut Transaction<'_, Postgres>, table: &'static str) -> Result<i64> {
    // table comes from STUDY_TABLES, never from a request
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    sqlx::query_scalar(&sql)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)
}

/// Run a sample query under a savepoint.
///
/// A failing sample (missing column, missing PostGIS function) rolls back to
/// the savepoint and yields an empty list, so the enclosing transaction stays
/// usable for the remaining queries.
async fn sample_rows(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
    sql: &'static str,
) -> Result<Vec<JsonValue>> {
    let mut savepoint = Connection::begin(&mut **tx).await.map_err(Error::Database)?;

    let rows = sqlx::query_scalar::<_, JsonValue>(sql)
        .bind(SAMPLE_LIMIT)
        .fetch_all(&mut *savepoint)
        .await;

    match rows {
        Ok(rows) => {
            savepoint.commit().await.map_err(Error::Database)?;
            Ok(rows)
        }
        Err(e) => {
            warn!(
                subsystem = "database",
                component = "diagnostics",
                db_table = table,
                error = %e,
                "Sample query failed, reporting empty sample"
            );
            savepoint.rollback().await.map_err(Error::Database)?;
            Ok(Vec::new())
        }
    }
}

impl PgDiagnosticsRepository {
    /// Fill `report` field by field inside one read-only transaction.
    ///
    /// On error the fields collected so far stay in `report`.
    async fn collect(&self, report: &mut DiagnosticReport) -> Result<()> {
        let mut tx = self.ctx.begin_read().await?;

        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?;
        report.version = Some(version);

        let [coordinates, metadata, annotations_terms] = STUDY_TABLES;
        report.coordinates_count = Some(count_rows(&mut tx, coordinates).await?);
        report.metadata_count = Some(count_rows(&mut tx, metadata).await?);
        report.annotations_terms_count = Some(count_rows(&mut tx, annotations_terms).await?);

        report.coordinates_sample =
            Some(sample_rows(&mut tx, coordinates, COORDINATES_SAMPLE_SQL).await?);
        report.metadata_sample = Some(sample_rows(&mut tx, metadata, METADATA_SAMPLE_SQL).await?);
        report.annotations_terms_sample =
            Some(sample_rows(&mut tx, annotations_terms, ANNOTATIONS_SAMPLE_SQL).await?);

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }
}

#[async_trait]
impl DiagnosticsRepository for PgDiagnosticsRepository {
    async fn run_diagnostics(&self) -> DiagnosticReport {
        let start = Instant::now();
        log_pool_metrics(self.ctx.pool());

        let mut report = DiagnosticReport::new(self.dialect());
        let outcome = self.collect(&mut report).await;
        let report = match outcome {
            Ok(()) => DiagnosticReport { ok: true, ..report },
            Err(e) => {
                warn!(
                    subsystem = "database",
                    component = "diagnostics",
                    op = "run_diagnostics",
                    schema = self.ctx.schema(),
                    error = %e,
                    "Diagnostics failed"
                );
                report.failed(e)
            }
        };

        info!(
            subsystem = "database",
            component = "diagnostics",
            op = "run_diagnostics",
            schema = self.ctx.schema(),
            ok = report.ok,
            coordinates_count = report.coordinates_count,
            metadata_count = report.metadata_count,
            annotations_terms_count = report.annotations_terms_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Diagnostics collected"
        );
        report
    }

    fn dialect(&self) -> &'static str {
        "postgresql"
    }
}
