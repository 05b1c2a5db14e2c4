//! Domain models for study dissociation.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Default search radius for location queries, in store coordinate units.
pub const DEFAULT_RADIUS: f64 = 6.0;

// =============================================================================
// STUDIES
// =============================================================================

/// Opaque study identifier.
///
/// Carries the store's own key type: integer-keyed tables (PMIDs) yield
/// `Int`, every other key type yields `Text`. Ids of one column therefore
/// share a variant and sort in that type's natural order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudyId {
    Int(i64),
    Text(String),
}

impl From<i64> for StudyId {
    fn from(id: i64) -> Self {
        StudyId::Int(id)
    }
}

impl From<String> for StudyId {
    fn from(raw: String) -> Self {
        StudyId::Text(raw)
    }
}

impl From<&str> for StudyId {
    fn from(raw: &str) -> Self {
        StudyId::from(raw.to_string())
    }
}

impl fmt::Display for StudyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyId::Int(n) => write!(f, "{}", n),
            StudyId::Text(s) => f.write_str(s),
        }
    }
}

/// Distinct, ascending set of studies matched by one query.
pub type StudySet = BTreeSet<StudyId>;

// =============================================================================
// QUERIES
// =============================================================================

/// A point in the store's spatial reference (MNI space for the neuroimaging data).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 3]")]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

/// A set-membership query resolved against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StudyQuery {
    /// Studies annotated with this exact term at positive weight.
    Term(String),
    /// Studies with at least one coordinate within `radius` of `point`.
    Near { point: Point3, radius: f64 },
}

impl StudyQuery {
    /// Short label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            StudyQuery::Term(_) => "term",
            StudyQuery::Near { .. } => "location",
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// The two set differences between study sets A and B.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dissociation {
    /// Studies in A but not in B, ascending.
    pub a_minus_b: Vec<StudyId>,
    /// Studies in B but not in A, ascending.
    pub b_minus_a: Vec<StudyId>,
}

/// Response body of the term dissociation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TermDissociation {
    /// First term.
    pub a: String,
    /// Second term.
    pub b: String,
    /// Studies associated with `a` but not `b`.
    #[schema(value_type = Vec<Object>)]
    pub a_minus_b: Vec<StudyId>,
    /// Studies associated with `b` but not `a`.
    #[schema(value_type = Vec<Object>)]
    pub b_minus_a: Vec<StudyId>,
}

/// Response body of the location dissociation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LocationDissociation {
    /// First point as `[x, y, z]`.
    #[schema(value_type = Vec<f64>)]
    pub a: Point3,
    /// Second point as `[x, y, z]`.
    #[schema(value_type = Vec<f64>)]
    pub b: Point3,
    /// Radius both points were searched with.
    pub radius: f64,
    /// Studies near `a` but not near `b`.
    #[schema(value_type = Vec<Object>)]
    pub a_minus_b: Vec<StudyId>,
    /// Studies near `b` but not near `a`.
    #[schema(value_type = Vec<Object>)]
    pub b_minus_a: Vec<StudyId>,
}

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Connectivity and schema report for the study store.
///
/// Fields are filled in as they are collected. When collection fails part
/// way, `ok` is false, `error` holds the cause and everything gathered before
/// the failure is kept. Samples are best-effort: a sample query that fails
/// yields an empty list instead of failing the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct DiagnosticReport {
    pub ok: bool,
    /// Store dialect, e.g. "postgresql".
    pub dialect: String,
    /// Server version string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations_terms_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub coordinates_sample: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub metadata_sample: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub annotations_terms_sample: Option<Vec<JsonValue>>,
    /// Cause of the failure when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiagnosticReport {
    /// Empty report for `dialect`; nothing collected yet.
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            ..Self::default()
        }
    }

    /// Mark the report as failed, keeping what was collected.
    pub fn failed(mut self, error: impl ToString) -> Self {
        self.ok = false;
        self.error = Some(error.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_ids_stay_text() {
        assert_eq!(StudyId::from("17"), StudyId::Text("17".to_string()));
        assert_eq!(StudyId::from("007"), StudyId::Text("007".to_string()));
        assert_eq!(
            StudyId::from("study-a"),
            StudyId::Text("study-a".to_string())
        );
    }

    #[test]
    fn test_text_ids_sort_and_serialize_as_strings() {
        let set: StudySet = ["10", "9", "0042", "abc"]
            .into_iter()
            .map(StudyId::from)
            .collect();
        let ids: Vec<StudyId> = set.into_iter().collect();
        assert_eq!(
            serde_json::to_value(&ids).unwrap(),
            serde_json::json!(["0042", "10", "9", "abc"])
        );
    }

    #[test]
    fn test_integer_ids_sort_numerically() {
        let set: StudySet = [10i64, 2, 1].into_iter().map(StudyId::from).collect();
        let ordered: Vec<String> = set.iter().map(|id| id.to_string()).collect();
        assert_eq!(ordered, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_study_id_serializes_untagged() {
        let ids = vec![StudyId::Int(4), StudyId::Text("x1".to_string())];
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[4,"x1"]"#);
    }

    #[test]
    fn test_study_id_deserializes_untagged() {
        let ids: Vec<StudyId> = serde_json::from_str(r#"[4,"x1"]"#).unwrap();
        assert_eq!(ids, vec![StudyId::Int(4), StudyId::Text("x1".to_string())]);
    }

    #[test]
    fn test_point_distance() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 3.0, 6.0);
        assert_eq!(a.distance(&b), 7.0);
        assert_eq!(b.distance(&a), 7.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_point_serializes_as_triple() {
        let p = Point3::new(-38.0, 22.5, 4.0);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[-38.0,22.5,4.0]");
    }

    #[test]
    fn test_location_dissociation_shape() {
        let body = LocationDissociation {
            a: Point3::new(0.0, 0.0, 0.0),
            b: Point3::new(10.0, 10.0, 10.0),
            radius: 1.0,
            a_minus_b: vec![],
            b_minus_a: vec![StudyId::Int(9)],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["a"], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(json["radius"], serde_json::json!(1.0));
        assert_eq!(json["b_minus_a"], serde_json::json!([9]));
    }

    #[test]
    fn test_failed_report_keeps_partial_fields() {
        let mut report = DiagnosticReport::new("postgresql");
        report.version = Some("PostgreSQL 16".to_string());
        report.coordinates_count = Some(12);
        let json = serde_json::to_value(report.failed("relation \"metadata\" does not exist"))
            .unwrap();

        assert_eq!(json["ok"], serde_json::json!(false));
        assert_eq!(json["version"], serde_json::json!("PostgreSQL 16"));
        assert_eq!(json["coordinates_count"], serde_json::json!(12));
        assert!(json.get("metadata_count").is_none());
        assert!(json.get("coordinates_sample").is_none());
        assert_eq!(
            json["error"],
            serde_json::json!("relation \"metadata\" does not exist")
        );
    }

    #[test]
    fn test_query_kind() {
        assert_eq!(StudyQuery::Term("pain".into()).kind(), "term");
        let near = StudyQuery::Near {
            point: Point3::new(0.0, 0.0, 0.0),
            radius: DEFAULT_RADIUS,
        };
        assert_eq!(near.kind(), "location");
    }
}
