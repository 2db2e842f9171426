use poi_proximity::core::bounding_box::bounding_box;
use poi_proximity::core::distance::distance_miles;
use poi_proximity::utils::error::ErrorCategory;
use poi_proximity::{
    render_json, DatasetPointStore, GeoPoint, InMemoryPointStore, LocalStorage, ProximityError,
    ProximityQuery, ProximitySearch,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

const CENTER_LAT: f64 = 40.176415;
const CENTER_LON: f64 = -75.304980;

fn sample_store() -> DatasetPointStore<LocalStorage> {
    let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/data");
    DatasetPointStore::new(LocalStorage::new(data_dir.to_string()), "sample_parks.csv").unwrap()
}

fn ids(results: &[poi_proximity::AnnotatedRecord]) -> Vec<i64> {
    results
        .iter()
        .map(|r| r.record.get("id").unwrap().as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_reference_search_over_sample_dataset() {
    let engine = ProximitySearch::new(sample_store());
    let query = ProximityQuery::new(CENTER_LAT, CENTER_LON, 10.0);

    let results = engine.search(&query).await.unwrap();

    // dataset order, not distance order
    assert_eq!(ids(&results), vec![1, 2, 3, 9, 10]);

    let evansburg = &results[4];
    assert_eq!(evansburg.record.get("name").unwrap(), "Evansburg Meadows RV");
    assert_eq!(evansburg.record.get("zip").unwrap(), 19426);
    assert!(evansburg.record.get("phone").unwrap().is_null());
    assert!((evansburg.distance - 4.715).abs() < 0.01, "{}", evansburg.distance);

    // the box corner lets in a park just past the radius
    let perkiomen = &results[1];
    assert!(perkiomen.distance > 10.0 && perkiomen.distance < 10.1);
}

#[tokio::test]
async fn test_distances_match_haversine() {
    let engine = ProximitySearch::new(sample_store());
    let center = GeoPoint::new(CENTER_LAT, CENTER_LON);
    let results = engine
        .search(&ProximityQuery::new(CENTER_LAT, CENTER_LON, 30.0))
        .await
        .unwrap();

    assert!(!results.is_empty());
    let bbox = bounding_box(center, 30.0);
    for result in &results {
        let point = result.record.point().unwrap();
        assert!(bbox.contains(point));
        assert_eq!(result.distance, distance_miles(center, point));
    }
}

#[tokio::test]
async fn test_empty_area_returns_empty_sequence() {
    let engine = ProximitySearch::new(sample_store());
    // middle of the Atlantic
    let query = ProximityQuery::new(35.0, -50.0, 25.0);

    let results = engine.search(&query).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(render_json(&results, false).unwrap(), "[]");
}

#[tokio::test]
async fn test_zero_radius_matches_exact_location_only() {
    let engine = ProximitySearch::new(sample_store());
    let results = engine
        .search(&ProximityQuery::new(40.1322, -75.3290, 0.0))
        .await
        .unwrap();

    assert_eq!(ids(&results), vec![9]);
    assert_eq!(results[0].distance, 0.0);
}

#[tokio::test]
async fn test_missing_dataset_is_storage_error() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let engine = ProximitySearch::new(DatasetPointStore::new(storage, "parks.csv").unwrap());

    let err = engine
        .search(&ProximityQuery::new(CENTER_LAT, CENTER_LON, 10.0))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Storage);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_json_dataset_file() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = json!([
        {"id": "a", "name": "North Lot", "latitude": 40.20, "longitude": -75.30, "amenities": ["water", "power"]},
        {"id": "b", "name": "Far Lot", "latitude": 44.00, "longitude": -75.30}
    ]);
    std::fs::write(
        temp_dir.path().join("parks.json"),
        serde_json::to_vec(&dataset).unwrap(),
    )
    .unwrap();

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let engine = ProximitySearch::new(DatasetPointStore::new(storage, "parks.json").unwrap());

    let results = engine
        .search(&ProximityQuery::new(CENTER_LAT, CENTER_LON, 5.0))
        .await
        .unwrap();

    let rendered: serde_json::Value =
        serde_json::from_str(&render_json(&results, true).unwrap()).unwrap();
    assert_eq!(rendered.as_array().unwrap().len(), 1);
    assert_eq!(rendered[0]["amenities"], json!(["water", "power"]));
    assert!(rendered[0]["distance"].as_f64().unwrap() < 5.0);
}

#[tokio::test]
async fn test_malformed_dataset_yields_no_partial_output() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("parks.csv"),
        "id,name,latitude,longitude\n1,Good,40.17,-75.30\n2,Broken,40.18\n",
    )
    .unwrap();

    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let engine = ProximitySearch::new(DatasetPointStore::new(storage, "parks.csv").unwrap());

    let result = engine
        .search(&ProximityQuery::new(CENTER_LAT, CENTER_LON, 10.0))
        .await;

    assert!(matches!(result, Err(ProximityError::StorageError { .. })));
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let engine = ProximitySearch::new(InMemoryPointStore::new(Vec::new()));

    for query in [
        ProximityQuery::new(-91.0, 0.0, 1.0),
        ProximityQuery::new(0.0, 180.5, 1.0),
        ProximityQuery::new(0.0, 0.0, -0.1),
        ProximityQuery::new(f64::NAN, 0.0, 1.0),
        ProximityQuery::new(0.0, 0.0, f64::INFINITY),
    ] {
        let err = engine.search(&query).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Input, "{:?}", query);
    }
    assert_eq!(engine.store().acquired_sessions(), 0);
}

#[tokio::test]
async fn test_concurrent_searches_share_one_engine() {
    let store = InMemoryPointStore::from_values(vec![
        json!({"id": 1, "latitude": 40.20, "longitude": -75.30}),
        json!({"id": 2, "latitude": 40.10, "longitude": -75.40}),
    ])
    .unwrap();
    let engine = Arc::new(ProximitySearch::new(store));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let radius = if i % 2 == 0 { 10.0 } else { 1.0 };
                engine
                    .search(&ProximityQuery::new(CENTER_LAT, CENTER_LON, radius))
                    .await
                    .map(|results| results.len())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let count = handle.await.unwrap().unwrap();
        assert_eq!(count, if i % 2 == 0 { 2 } else { 0 });
    }

    assert_eq!(engine.store().acquired_sessions(), 16);
    assert_eq!(engine.store().open_sessions(), 0);
}

#[tokio::test]
async fn test_reference_search_over_sqlite_database() {
    use sqlx::sqlite::SqliteConnectOptions;
    use sqlx::{ConnectOptions, Connection, Executor};

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("rvParks.db");
    let mut conn = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();
    conn.execute(
        "CREATE TABLE park (id INTEGER, name TEXT, city TEXT, state TEXT, zip TEXT, \
         latitude REAL, longitude REAL)",
    )
    .await
    .unwrap();
    conn.execute(
        "INSERT INTO park VALUES \
         (1, 'Skippack Creek Campground', 'Skippack', 'PA', '19474', 40.2246, -75.3982), \
         (2, 'Perkiomen Valley RV Resort', 'Schwenksville', 'PA', '19473', 40.2561, -75.4638), \
         (6, 'Delaware Seashore RV Park', 'Rehoboth Beach', 'DE', '19971', 38.6068, -75.0682), \
         (9, 'Norristown Farm Park Camping', 'Norristown', 'PA', '19403', 40.1322, -75.329), \
         (10, 'Evansburg Meadows RV', 'Collegeville', 'PA', '19426', 40.1918, -75.392)",
    )
    .await
    .unwrap();
    conn.close().await.unwrap();

    let store =
        poi_proximity::SqlitePointStore::new(db_path.to_string_lossy(), "park").unwrap();
    let engine = ProximitySearch::new(store);
    let results = engine
        .search(&ProximityQuery::new(CENTER_LAT, CENTER_LON, 10.0))
        .await
        .unwrap();

    let mut found = ids(&results);
    found.sort_unstable();
    assert_eq!(found, vec![1, 2, 9, 10]);

    let rendered = render_json(&results, false).unwrap();
    assert!(rendered.starts_with(r#"[{"id":"#));
    let first = results[0].record.data.keys().cloned().collect::<Vec<_>>();
    assert_eq!(
        first,
        vec!["id", "name", "city", "state", "zip", "latitude", "longitude"]
    );
    assert!(results.iter().all(|r| r.record.get("zip").unwrap().is_string()));
}
