//! Integration tests for the PostGIS study store.
//!
//! Tests verify the SQL behind the dissociation routes and `/test_db`:
//! - Term sets only count positive weights
//! - Location sets use inclusive 3D distance
//! - Both sets of a pair resolve in one transaction
//! - Diagnostics tolerate failing samples
//!
//! Test Pattern:
//! - Each test creates its own `ns_test_<uuid>` schema via `TestDatabase`
//! - Requires `DATABASE_URL` pointing at a PostGIS-enabled database
//!   (tests skip gracefully if unavailable)

use dissoc_core::{
    DiagnosticsRepository, DissociationEngine, Point3, StudyId, StudyQuery, StudyRepository,
};
use dissoc_db::test_fixtures::TestDatabase;

/// Skip test if no PostGIS database is configured.
macro_rules! require_db {
    () => {
        match TestDatabase::try_new().await {
            Some(db) => db,
            None => {
                eprintln!("Skipping: DATABASE_URL not set or database not usable");
                return;
            }
        }
    };
}

fn ids(raw: &[i64]) -> Vec<StudyId> {
    raw.iter().copied().map(StudyId::from).collect()
}

async fn seed_terms(test_db: &TestDatabase) {
    for (id, term, weight) in [
        (1, "pain", 0.9),
        (2, "pain", 0.1),
        (3, "pain", 0.4),
        (2, "visual", 0.7),
        (3, "visual", 0.2),
        (4, "visual", 0.3),
        (5, "pain", 0.0),
        (6, "visual", -1.0),
    ] {
        test_db.insert_annotation(id, term, weight).await;
    }
}

#[tokio::test]
async fn test_term_set_counts_only_positive_weights() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    seed_terms(&test_db).await;

    let pain = test_db
        .db
        .studies
        .find_studies(&StudyQuery::Term("pain".to_string()))
        .await
        .expect("term query");
    assert_eq!(pain.into_iter().collect::<Vec<_>>(), ids(&[1, 2, 3]));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_term_dissociation_end_to_end() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    seed_terms(&test_db).await;

    let engine = DissociationEngine::new(test_db.db.studies());
    let result = engine.by_terms("pain", "visual").await.expect("dissociate");
    assert_eq!(result.a_minus_b, ids(&[1]));
    assert_eq!(result.b_minus_a, ids(&[4]));

    let unknown = engine.by_terms("pain", "olfactory").await.expect("dissociate");
    assert_eq!(unknown.a_minus_b, ids(&[1, 2, 3]));
    assert!(unknown.b_minus_a.is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_location_set_is_inclusive_3d_distance() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    test_db.insert_coordinate(10, 3.0, 4.0, 0.0).await;
    test_db.insert_coordinate(11, 0.0, 0.0, 5.5).await;
    test_db.insert_coordinate(12, 0.0, 0.0, 0.0).await;

    let near = |radius: f64| StudyQuery::Near {
        point: Point3::new(0.0, 0.0, 0.0),
        radius,
    };

    let within_5 = test_db.db.studies.find_studies(&near(5.0)).await.unwrap();
    assert_eq!(within_5.into_iter().collect::<Vec<_>>(), ids(&[10, 12]));

    let exact = test_db.db.studies.find_studies(&near(0.0)).await.unwrap();
    assert_eq!(exact.into_iter().collect::<Vec<_>>(), ids(&[12]));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_location_dissociation_far_apart_points() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    test_db.insert_coordinate(20, -40.0, 20.0, 4.0).await;

    let engine = DissociationEngine::new(test_db.db.studies());
    let result = engine
        .by_locations(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0), 1.0)
        .await
        .expect("dissociate");
    assert!(result.a_minus_b.is_empty());
    assert!(result.b_minus_a.is_empty());
    assert_eq!(result.radius, 1.0);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_pair_fails_as_a_whole_when_table_missing() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    seed_terms(&test_db).await;
    test_db.drop_table("coordinates").await;

    let result = test_db
        .db
        .studies
        .find_study_pair(
            &StudyQuery::Term("pain".to_string()),
            &StudyQuery::Near {
                point: Point3::new(0.0, 0.0, 0.0),
                radius: 6.0,
            },
        )
        .await;
    assert!(matches!(result, Err(dissoc_core::Error::Database(_))));

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_text_keyed_studies_stay_text() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    test_db.use_text_study_ids("annotations_terms").await;
    for id in ["10", "9", "0042", "abc"] {
        test_db.insert_text_annotation(id, "pain", 0.5).await;
    }
    test_db.insert_text_annotation("9", "visual", 0.5).await;

    let engine = DissociationEngine::new(test_db.db.studies());
    let result = engine.by_terms("pain", "visual").await.expect("dissociate");
    assert_eq!(
        serde_json::to_value(&result.a_minus_b).unwrap(),
        serde_json::json!(["0042", "10", "abc"])
    );
    assert!(result.b_minus_a.is_empty());

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_integer_keyed_studies_are_numbers() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    seed_terms(&test_db).await;

    let pain = test_db
        .db
        .studies
        .find_studies(&StudyQuery::Term("pain".to_string()))
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(pain.into_iter().collect::<Vec<_>>()).unwrap(),
        serde_json::json!([1, 2, 3])
    );

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_diagnostics_report_counts_and_samples() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    seed_terms(&test_db).await;
    test_db.insert_coordinate(1, 1.5, 2.0, 3.0).await;
    test_db.insert_metadata(1, "Pain and the insula").await;

    let report = test_db.db.diagnostics.run_diagnostics().await;
    assert!(report.ok, "unexpected failure: {:?}", report.error);
    assert_eq!(report.dialect, "postgresql");
    assert!(report.version.as_deref().unwrap().contains("PostgreSQL"));
    assert_eq!(report.coordinates_count, Some(1));
    assert_eq!(report.metadata_count, Some(1));
    assert_eq!(report.annotations_terms_count, Some(8));
    assert_eq!(report.annotations_terms_sample.as_ref().unwrap().len(), 3);
    let coordinates = report.coordinates_sample.as_ref().unwrap();
    assert_eq!(coordinates[0]["x"].as_f64(), Some(1.5));
    let metadata = report.metadata_sample.as_ref().unwrap();
    assert_eq!(metadata[0]["title"], serde_json::json!("Pain and the insula"));
    assert!(report.error.is_none());

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_diagnostics_failed_sample_is_empty_and_rest_continue() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    seed_terms(&test_db).await;
    test_db.insert_coordinate(1, 1.0, 2.0, 3.0).await;
    test_db.drop_column("coordinates", "geom").await;

    let report = test_db.db.diagnostics.run_diagnostics().await;
    assert!(report.ok);
    assert_eq!(report.coordinates_count, Some(1));
    assert_eq!(report.coordinates_sample, Some(vec![]));
    assert_eq!(report.annotations_terms_sample.as_ref().unwrap().len(), 3);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_diagnostics_missing_table_keeps_partial_report() {
    dotenvy::dotenv().ok();
    let test_db = require_db!();
    test_db.insert_coordinate(1, 1.0, 2.0, 3.0).await;
    test_db.drop_table("metadata").await;

    let report = test_db.db.diagnostics.run_diagnostics().await;
    assert!(!report.ok);
    assert_eq!(report.dialect, "postgresql");
    assert!(report.version.is_some());
    assert_eq!(report.coordinates_count, Some(1));
    assert_eq!(report.metadata_count, None);
    assert_eq!(report.coordinates_sample, None);
    assert!(report.error.as_deref().unwrap().contains("metadata"));

    test_db.cleanup().await;
}
