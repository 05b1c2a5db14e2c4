//! Test fixtures for database integration tests.
//!
//! Each [`TestDatabase`] owns a freshly created schema holding the three
//! study tables, so tests never touch the real `ns` namespace and can run in
//! parallel.
//!
//! ## Configuration
//!
//! The test database URL comes from `DATABASE_URL`. The database must have
//! the PostGIS extension available. When `DATABASE_URL` is unset or the
//! database cannot be prepared, [`TestDatabase::try_new`] returns `None` and
//! tests skip.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dissoc_db::test_fixtures::TestDatabase;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let Some(test_db) = TestDatabase::try_new().await else { return };
//!     test_db.insert_annotation(1, "pain", 0.5).await;
//!     // ...
//!     test_db.cleanup().await;
//! }
//! ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::{create_pool, Database, PoolConfig};

/// Environment variable holding the test database URL.
pub const TEST_DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Test database with an isolated study schema.
pub struct TestDatabase {
    pub pool: PgPool,
    pub db: Database,
    schema_name: String,
}

impl TestDatabase {
    /// Prepare an isolated schema, or `None` when no usable database is configured.
    pub async fn try_new() -> Option<Self> {
        let url = std::env::var(TEST_DATABASE_URL_VAR).ok()?;
        let pool = match create_pool(&url, PoolConfig::default().max_connections(4)).await {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("Skipping: cannot connect to {}: {}", TEST_DATABASE_URL_VAR, e);
                return None;
            }
        };

        if let Err(e) = sqlx::query("CREATE EXTENSION IF NOT EXISTS postgis")
            .execute(&pool)
            .await
        {
            eprintln!("Skipping: PostGIS unavailable: {}", e);
            return None;
        }

        let schema_name = format!("ns_test_{}", Uuid::new_v4().simple());
        let statements = [
            format!("CREATE SCHEMA {}", schema_name),
            format!(
                "CREATE TABLE {}.coordinates (study_id BIGINT, geom geometry(POINTZ, 4326))",
                schema_name
            ),
            format!(
                "CREATE TABLE {}.metadata (study_id BIGINT, title TEXT, journal TEXT)",
                schema_name
            ),
            format!(
                "CREATE TABLE {}.annotations_terms \
                 (study_id BIGINT, contrast_id TEXT, term TEXT, weight DOUBLE PRECISION)",
                schema_name
            ),
        ];
        for sql in &statements {
            if let Err(e) = sqlx::query(sql).execute(&pool).await {
                eprintln!("Skipping: cannot create test schema: {}", e);
                return None;
            }
        }

        let db = Database::new(pool.clone(), &schema_name).ok()?;
        Some(Self {
            pool,
            db,
            schema_name,
        })
    }

    /// Name of the isolated schema.
    pub fn schema(&self) -> &str {
        &self.schema_name
    }

    /// Insert an `annotations_terms` row.
    pub async fn insert_annotation(&self, study_id: i64, term: &str, weight: f64) {
        let sql = format!(
            "INSERT INTO {}.annotations_terms (study_id, contrast_id, term, weight) \
             VALUES ($1, '1', $2, $3)",
            self.schema_name
        );
        sqlx::query(&sql)
            .bind(study_id)
            .bind(term)
            .bind(weight)
            .execute(&self.pool)
            .await
            .expect("Failed to insert annotation");
    }

    /// Insert an `annotations_terms` row keyed by a text study id.
    ///
    /// Requires [`TestDatabase::use_text_study_ids`] on `annotations_terms` first.
    pub async fn insert_text_annotation(&self, study_id: &str, term: &str, weight: f64) {
        let sql = format!(
            "INSERT INTO {}.annotations_terms (study_id, contrast_id, term, weight) \
             VALUES ($1, '1', $2, $3)",
            self.schema_name
        );
        sqlx::query(&sql)
            .bind(study_id)
            .bind(term)
            .bind(weight)
            .execute(&self.pool)
            .await
            .expect("Failed to insert text-keyed annotation");
    }

    /// Switch a table's `study_id` column to TEXT.
    pub async fn use_text_study_ids(&self, table: &str) {
        let sql = format!(
            "ALTER TABLE {}.{} ALTER COLUMN study_id TYPE TEXT",
            self.schema_name, table
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .expect("Failed to retype study_id");
    }

    /// Insert a `coordinates` row.
    pub async fn insert_coordinate(&self, study_id: i64, x: f64, y: f64, z: f64) {
        let sql = format!(
            "INSERT INTO {}.coordinates (study_id, geom) \
             VALUES ($1, ST_SetSRID(ST_MakePoint($2, $3, $4), 4326))",
            self.schema_name
        );
        sqlx::query(&sql)
            .bind(study_id)
            .bind(x)
            .bind(y)
            .bind(z)
            .execute(&self.pool)
            .await
            .expect("Failed to insert coordinate");
    }

    /// Insert a `metadata` row.
    pub async fn insert_metadata(&self, study_id: i64, title: &str) {
        let sql = format!(
            "INSERT INTO {}.metadata (study_id, title, journal) VALUES ($1, $2, 'J Test')",
            self.schema_name
        );
        sqlx::query(&sql)
            .bind(study_id)
            .bind(title)
            .execute(&self.pool)
            .await
            .expect("Failed to insert metadata");
    }

    /// Drop a study table, to exercise failure paths.
    pub async fn drop_table(&self, table: &str) {
        let sql = format!("DROP TABLE {}.{}", self.schema_name, table);
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .expect("Failed to drop table");
    }

    /// Drop a column of a study table, to break one sample query.
    pub async fn drop_column(&self, table: &str, column: &str) {
        let sql = format!(
            "ALTER TABLE {}.{} DROP COLUMN {}",
            self.schema_name, table, column
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .expect("Failed to drop column");
    }

    /// Drop the isolated schema.
    pub async fn cleanup(self) {
        let sql = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema_name);
        if let Err(e) = sqlx::query(&sql).execute(&self.pool).await {
            eprintln!("Failed to drop test schema {}: {}", self.schema_name, e);
        }
    }
}
