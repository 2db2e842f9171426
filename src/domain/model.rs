use crate::utils::error::{ProximityError, Result};
use crate::utils::validation::{validate_latitude, validate_longitude, validate_radius};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

pub const LATITUDE_FIELD: &str = "latitude";
pub const LONGITUDE_FIELD: &str = "longitude";
pub const DISTANCE_FIELD: &str = "distance";

/// A position on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Axis-aligned latitude/longitude rectangle, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lon
            && point.longitude <= self.max_lon
    }
}

/// A stored point of interest. Every attribute other than the coordinates is opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointRecord {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl PointRecord {
    pub fn new(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }

    /// Reads the stored coordinates. A record without numeric coordinates breaks
    /// the storage contract, so this is reported as a storage error.
    pub fn point(&self) -> Result<GeoPoint> {
        Ok(GeoPoint::new(
            self.coordinate(LATITUDE_FIELD)?,
            self.coordinate(LONGITUDE_FIELD)?,
        ))
    }

    fn coordinate(&self, field: &str) -> Result<f64> {
        let value = self.data.get(field).ok_or_else(|| {
            ProximityError::storage(format!("record is missing the '{}' field", field))
        })?;

        let number = match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        number.filter(|n| n.is_finite()).ok_or_else(|| {
            ProximityError::storage(format!(
                "record field '{}' is not a number: {}",
                field, value
            ))
        })
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for PointRecord {
    fn from(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self::new(data)
    }
}

/// A record plus its great-circle distance from the query center, in miles.
///
/// Serializes as the record's own fields with `distance` appended. A stored
/// `distance` attribute is replaced by the computed one.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    pub record: PointRecord,
    pub distance: f64,
}

impl Serialize for AnnotatedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let stored = self
            .record
            .data
            .iter()
            .filter(|(key, _)| key.as_str() != DISTANCE_FIELD);

        let mut map = serializer.serialize_map(None)?;
        for (key, value) in stored {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(DISTANCE_FIELD, &self.distance)?;
        map.end()
    }
}

/// One proximity search request. Lives for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityQuery {
    pub center: GeoPoint,
    pub radius_miles: f64,
}

impl ProximityQuery {
    pub fn new(latitude: f64, longitude: f64, radius_miles: f64) -> Self {
        Self {
            center: GeoPoint::new(latitude, longitude),
            radius_miles,
        }
    }

    /// Rejects out-of-domain input before anything touches storage.
    pub fn validate(&self, max_radius_miles: Option<f64>) -> Result<()> {
        validate_latitude(LATITUDE_FIELD, self.center.latitude)?;
        validate_longitude(LONGITUDE_FIELD, self.center.longitude)?;
        validate_radius("radius_miles", self.radius_miles, max_radius_miles)
    }
}
