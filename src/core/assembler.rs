use crate::core::distance::distance_miles;
use crate::core::{AnnotatedRecord, GeoPoint, PointRecord};
use crate::utils::error::Result;

/// Attaches the distance from `center` to every candidate, keeping input order.
///
/// Fails as a whole if any record lacks usable coordinates; no partial output.
pub fn assemble(center: GeoPoint, records: Vec<PointRecord>) -> Result<Vec<AnnotatedRecord>> {
    records
        .into_iter()
        .map(|record| {
            let distance = distance_miles(center, record.point()?);
            Ok(AnnotatedRecord { record, distance })
        })
        .collect()
}
