//! The dissociation engine.
//!
//! A dissociation is the pair of set differences between the studies matched
//! by query A and the studies matched by query B.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{
    Dissociation, LocationDissociation, Point3, StudyQuery, StudySet, TermDissociation,
};
use crate::traits::StudyRepository;

/// Compute `A \ B` and `B \ A`, each ascending.
pub fn dissociate(a: &StudySet, b: &StudySet) -> Dissociation {
    Dissociation {
        a_minus_b: a.difference(b).cloned().collect(),
        b_minus_a: b.difference(a).cloned().collect(),
    }
}

/// Stateless engine over an injected study store.
#[derive(Clone)]
pub struct DissociationEngine {
    store: Arc<dyn StudyRepository>,
}

impl DissociationEngine {
    pub fn new(store: Arc<dyn StudyRepository>) -> Self {
        Self { store }
    }

    /// Dissociate the studies annotated with `term_a` from those annotated with `term_b`.
    ///
    /// Unknown terms match no studies; only empty terms are rejected.
    pub async fn by_terms(&self, term_a: &str, term_b: &str) -> Result<TermDissociation> {
        if term_a.is_empty() || term_b.is_empty() {
            return Err(Error::InvalidInput("Terms must not be empty".to_string()));
        }

        let diff = self
            .run(
                "by_terms",
                StudyQuery::Term(term_a.to_string()),
                StudyQuery::Term(term_b.to_string()),
            )
            .await?;

        Ok(TermDissociation {
            a: term_a.to_string(),
            b: term_b.to_string(),
            a_minus_b: diff.a_minus_b,
            b_minus_a: diff.b_minus_a,
        })
    }

    /// Dissociate the studies reported near `a` from those reported near `b`.
    pub async fn by_locations(
        &self,
        a: Point3,
        b: Point3,
        radius: f64,
    ) -> Result<LocationDissociation> {
        let diff = self
            .run(
                "by_locations",
                StudyQuery::Near { point: a, radius },
                StudyQuery::Near { point: b, radius },
            )
            .await?;

        Ok(LocationDissociation {
            a,
            b,
            radius,
            a_minus_b: diff.a_minus_b,
            b_minus_a: diff.b_minus_a,
        })
    }

    async fn run(&self, op: &'static str, a: StudyQuery, b: StudyQuery) -> Result<Dissociation> {
        let start = Instant::now();
        debug!(
            subsystem = "engine",
            component = "dissociation",
            op,
            query_a = ?a,
            query_b = ?b,
            "Resolving study sets"
        );

        let (a_ids, b_ids) = self.store.find_study_pair(&a, &b).await?;
        let diff = dissociate(&a_ids, &b_ids);

        info!(
            subsystem = "engine",
            component = "dissociation",
            op,
            a_count = a_ids.len(),
            b_count = b_ids.len(),
            a_minus_b = diff.a_minus_b.len(),
            b_minus_a = diff.b_minus_a.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Dissociation computed"
        );
        Ok(diff)
    }
}
