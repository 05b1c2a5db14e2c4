//! Study set queries against the `annotations_terms` and `coordinates` tables.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Column, Postgres, Row, Transaction, TypeInfo};
use tracing::debug;

use dissoc_core::{Error, Result, StudyId, StudyQuery, StudyRepository, StudySet};

use crate::schema_context::SchemaContext;

/// Studies annotated with a term at positive weight.
///
/// Every query returns the id in its own type plus its text form, see
/// [`decode_study_id`].
const TERM_STUDIES_SQL: &str = r#"
    SELECT DISTINCT study_id, study_id::text AS study_id_text
    FROM annotations_terms
    WHERE term = $1 AND weight > 0 AND study_id IS NOT NULL
"#;

/// Studies with a coordinate within `$4` of `($1, $2, $3)`, compared in 3D
/// in the table's spatial reference (SRID 4326 POINTZ).
const NEAR_STUDIES_SQL: &str = r#"
    SELECT DISTINCT study_id, study_id::text AS study_id_text
    FROM coordinates
    WHERE ST_3DDWithin(
        geom,
        ST_SetSRID(ST_MakePoint($1, $2, $3), 4326)::geometry(POINTZ, 4326),
        $4
    )
    AND study_id IS NOT NULL
"#;

/// Decode a study id by the column's own type.
///
/// Integer keys become `StudyId::Int`; any other key type is carried as its
/// text form, never re-interpreted as a number.
fn decode_study_id(row: &PgRow) -> Result<StudyId> {
    let id = match row.column(0).type_info().name() {
        "INT2" => StudyId::Int(row.try_get::<i16, _>(0)?.into()),
        "INT4" => StudyId::Int(row.try_get::<i32, _>(0)?.into()),
        "INT8" => StudyId::Int(row.try_get::<i64, _>(0)?),
        _ => StudyId::Text(row.try_get::<String, _>(1)?),
    };
    Ok(id)
}

/// PostgreSQL implementation of StudyRepository.
#[derive(Clone, Debug)]
pub struct PgStudyRepository {
    ctx: SchemaContext,
}

impl PgStudyRepository {
    pub fn new(ctx: SchemaContext) -> Self {
        Self { ctx }
    }

    /// Resolve one query on an open transaction.
    pub async fn find_studies_tx(
        tx: &mut Transaction<'_, Postgres>,
        query: &StudyQuery,
    ) -> Result<StudySet> {
        let start = Instant::now();
        let rows: Vec<PgRow> = match query {
            StudyQuery::Term(term) => sqlx::query(TERM_STUDIES_SQL)
                .bind(term)
                .fetch_all(&mut **tx)
                .await
                .map_err(Error::Database)?,
            StudyQuery::Near { point, radius } => sqlx::query(NEAR_STUDIES_SQL)
                .bind(point.x)
                .bind(point.y)
                .bind(point.z)
                .bind(*radius)
                .fetch_all(&mut **tx)
                .await
                .map_err(Error::Database)?,
        };

        debug!(
            subsystem = "database",
            component = "studies",
            op = "find_studies",
            kind = query.kind(),
            result_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Study set resolved"
        );
        rows.iter().map(decode_study_id).collect()
    }
}

#[async_trait]
impl StudyRepository for PgStudyRepository {
    async fn find_studies(&self, query: &StudyQuery) -> Result<StudySet> {
        let query = query.clone();
        self.ctx
            .read(move |tx| Box::pin(async move { Self::find_studies_tx(tx, &query).await }))
            .await
    }

    async fn find_study_pair(
        &self,
        a: &StudyQuery,
        b: &StudyQuery,
    ) -> Result<(StudySet, StudySet)> {
        let (a, b) = (a.clone(), b.clone());
        self.ctx
            .read(move |tx| {
                Box::pin(async move {
                    let a_ids = Self::find_studies_tx(tx, &a).await?;
                    let b_ids = Self::find_studies_tx(tx, &b).await?;
                    Ok((a_ids, b_ids))
                })
            })
            .await
    }
}
