//! Core traits for neurodissoc abstractions.
//!
//! These traits define the interfaces that store implementations must
//! satisfy, so the engine and the HTTP layer can run against PostgreSQL in
//! production and against an in-memory store in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DiagnosticReport, StudyQuery, StudySet};

/// Resolves study queries to study sets.
#[async_trait]
pub trait StudyRepository: Send + Sync {
    /// Resolve one query.
    async fn find_studies(&self, query: &StudyQuery) -> Result<StudySet>;

    /// Resolve two queries against one consistent view of the store.
    ///
    /// Implementations backed by a database run both queries inside a single
    /// transaction on one connection. Either both sets are returned or the
    /// call fails as a whole.
    async fn find_study_pair(
        &self,
        a: &StudyQuery,
        b: &StudyQuery,
    ) -> Result<(StudySet, StudySet)> {
        let a_ids = self.find_studies(a).await?;
        let b_ids = self.find_studies(b).await?;
        Ok((a_ids, b_ids))
    }
}

/// Connectivity and schema introspection of the study store.
#[async_trait]
pub trait DiagnosticsRepository: Send + Sync {
    /// Collect server version, table counts and table samples.
    ///
    /// Never fails outright: a failure is recorded in the report alongside
    /// whatever was collected before it.
    async fn run_diagnostics(&self) -> DiagnosticReport;

    /// Store dialect name reported alongside diagnostics.
    fn dialect(&self) -> &'static str;
}
