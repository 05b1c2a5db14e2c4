//! In-memory study store for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dissoc_core::mock::InMemoryStudyStore;
//!
//! let store = InMemoryStudyStore::new()
//!     .with_annotation(1, "pain", 0.8)
//!     .with_coordinate(1, -38.0, 22.0, 4.0);
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::{DiagnosticReport, Point3, StudyId, StudyQuery, StudySet};
use crate::traits::{DiagnosticsRepository, StudyRepository};

#[derive(Debug, Clone)]
struct Annotation {
    study_id: StudyId,
    term: String,
    weight: f64,
}

#[derive(Debug, Clone)]
struct Coordinate {
    study_id: StudyId,
    point: Point3,
}

/// Study store backed by in-memory annotation and coordinate rows.
///
/// Clones share the query counter and the failure switch.
#[derive(Clone, Default)]
pub struct InMemoryStudyStore {
    annotations: Vec<Annotation>,
    coordinates: Vec<Coordinate>,
    queries: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStudyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an annotation row. Only positive weights associate the study.
    pub fn with_annotation(
        mut self,
        study_id: impl Into<StudyId>,
        term: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.annotations.push(Annotation {
            study_id: study_id.into(),
            term: term.into(),
            weight,
        });
        self
    }

    /// Add a coordinate row.
    pub fn with_coordinate(mut self, study_id: impl Into<StudyId>, x: f64, y: f64, z: f64) -> Self {
        self.coordinates.push(Coordinate {
            study_id: study_id.into(),
            point: Point3::new(x, y, z),
        });
        self
    }

    /// Make every subsequent query fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of set-membership queries answered (or attempted) so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl StudyRepository for InMemoryStudyStore {
    async fn find_studies(&self, query: &StudyQuery) -> Result<StudySet> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let ids = match query {
            StudyQuery::Term(term) => self
                .annotations
                .iter()
                .filter(|a| &a.term == term && a.weight > 0.0)
                .map(|a| a.study_id.clone())
                .collect(),
            StudyQuery::Near { point, radius } => self
                .coordinates
                .iter()
                .filter(|c| c.point.distance(point) <= *radius)
                .map(|c| c.study_id.clone())
                .collect(),
        };
        Ok(ids)
    }
}

#[async_trait]
impl DiagnosticsRepository for InMemoryStudyStore {
    async fn run_diagnostics(&self) -> DiagnosticReport {
        let report = DiagnosticReport::new(self.dialect());
        if let Err(e) = self.check_available() {
            return report.failed(e);
        }

        let coordinates_sample = self
            .coordinates
            .iter()
            .take(3)
            .map(|c| {
                json!({
                    "study_id": c.study_id,
                    "x": c.point.x,
                    "y": c.point.y,
                    "z": c.point.z,
                })
            })
            .collect();
        let annotations_terms_sample = self
            .annotations
            .iter()
            .take(3)
            .map(|a| {
                json!({
                    "study_id": a.study_id,
                    "contrast_id": null,
                    "term": a.term,
                    "weight": a.weight,
                })
            })
            .collect();

        DiagnosticReport {
            ok: true,
            version: Some("in-memory".to_string()),
            coordinates_count: Some(self.coordinates.len() as i64),
            metadata_count: Some(0),
            annotations_terms_count: Some(self.annotations.len() as i64),
            coordinates_sample: Some(coordinates_sample),
            metadata_sample: Some(Vec::new()),
            annotations_terms_sample: Some(annotations_terms_sample),
            ..report
        }
    }

    fn dialect(&self) -> &'static str {
        "memory"
    }
}
