use crate::core::assembler::assemble;
use crate::core::bounding_box::bounding_box;
use crate::core::range_query::RangeQueryExecutor;
use crate::core::{AnnotatedRecord, PointStore, ProximityQuery, SearchConfig};
use crate::utils::error::Result;

/// The proximity search operation: validate, box, scan, annotate.
pub struct ProximitySearch<S: PointStore> {
    store: S,
    max_radius_miles: Option<f64>,
}

impl<S: PointStore> ProximitySearch<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_radius_miles: None,
        }
    }

    pub fn from_config<C: SearchConfig>(store: S, config: &C) -> Self {
        Self {
            store,
            max_radius_miles: config.max_radius_miles(),
        }
    }

    pub fn with_max_radius(mut self, max_radius_miles: f64) -> Self {
        self.max_radius_miles = Some(max_radius_miles);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every stored point inside the bounding box of the search circle, each with
    /// its haversine distance from the center. Order follows the store's output;
    /// points near the box corners may lie beyond the radius.
    pub async fn search(&self, query: &ProximityQuery) -> Result<Vec<AnnotatedRecord>> {
        query.validate(self.max_radius_miles)?;

        let bounds = bounding_box(query.center, query.radius_miles);
        tracing::debug!(
            "Searching {} miles around ({}, {})",
            query.radius_miles,
            query.center.latitude,
            query.center.longitude
        );

        let candidates = RangeQueryExecutor::new(&self.store)
            .fetch_candidates(&bounds)
            .await?;
        let results = assemble(query.center, candidates)?;

        tracing::info!("Proximity search matched {} points", results.len());
        Ok(results)
    }
}

/// Encodes results as a JSON array of objects.
pub fn render_json(results: &[AnnotatedRecord], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(results)?
    } else {
        serde_json::to_string(results)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPointStore;
    use crate::utils::error::{ErrorCategory, ProximityError};
    use serde_json::json;

    fn store() -> InMemoryPointStore {
        InMemoryPointStore::from_values(vec![
            json!({"id": 1, "name": "Oak Grove", "latitude": 40.20, "longitude": -75.30}),
            json!({"id": 2, "name": "Pine Hollow", "latitude": 40.10, "longitude": -75.40}),
            json!({"id": 3, "name": "Lakeside", "latitude": 42.00, "longitude": -78.00}),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_annotates_candidates() {
        let engine = ProximitySearch::new(store());
        let query = ProximityQuery::new(40.176415, -75.304980, 10.0);

        let results = engine.search(&query).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.get("name").unwrap(), "Oak Grove");
        assert!(results.iter().all(|r| r.distance > 0.0 && r.distance < 10.0));
        assert_eq!(engine.store().open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_never_touches_storage() {
        let engine = ProximitySearch::new(store());
        let query = ProximityQuery::new(120.0, -75.0, 10.0);

        let err = engine.search(&query).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(engine.store().acquired_sessions(), 0);
    }

    #[tokio::test]
    async fn test_max_radius_is_enforced() {
        let engine = ProximitySearch::new(store()).with_max_radius(50.0);
        let err = engine
            .search(&ProximityQuery::new(40.0, -75.0, 75.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ProximityError::InputError { .. }));
    }

    #[test]
    fn test_render_json() {
        let results = vec![AnnotatedRecord {
            record: serde_json::from_value(json!({"latitude": 1.0, "longitude": 2.0})).unwrap(),
            distance: 0.5,
        }];
        let compact = render_json(&results, false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(parsed, json!([{"latitude": 1.0, "longitude": 2.0, "distance": 0.5}]));

        assert!(render_json(&results, true).unwrap().contains('\n'));
        assert_eq!(render_json(&[], false).unwrap(), "[]");
    }
}
