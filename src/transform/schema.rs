//! Header revision detection.

use tracing::{info, warn};

use crate::domain::{Metric, Record, SchemaKeys};
use crate::transform::TransformError;

/// Key set chosen for a sheet, plus whether normalization is actually possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub keys: SchemaKeys,
    pub normalize: bool,
}

/// Pick the key set from the first record: `geoId` means the post-2020-03-27
/// headers, `GeoId` the earlier ones. Anything else is rejected.
pub fn resolve_schema(
    records: &[Record],
    metric: Metric,
    normalize: bool,
) -> Result<Schema, TransformError> {
    let first = records.first().ok_or(TransformError::UnknownSchema)?;

    let keys = if first.contains_key("geoId") {
        SchemaKeys::lowercase(metric)
    } else if first.contains_key("GeoId") {
        SchemaKeys::capitalized(metric)
    } else {
        return Err(TransformError::UnknownSchema);
    };
    info!("Using `{}` schema, counting `{}`", keys.region, keys.count);

    let normalize = if normalize && keys.population.is_none() {
        warn!("No population data in this sheet; normalization disabled");
        false
    } else {
        normalize
    };

    Ok(Schema { keys, normalize })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cell;

    fn record(keys: &[&str]) -> Record {
        keys.iter()
            .map(|k| (k.to_string(), Cell::Number(1.0)))
            .collect()
    }

    #[test]
    fn lowercase_keys_when_first_record_has_geo_id() {
        let records = vec![record(&["geoId", "year", "cases"])];
        let schema = resolve_schema(&records, Metric::Cases, true).unwrap();
        assert_eq!(schema.keys, SchemaKeys::lowercase(Metric::Cases));
        assert!(schema.normalize);
    }

    #[test]
    fn capitalized_keys_otherwise() {
        let records = vec![record(&["GeoId", "Year", "Deaths"])];
        let schema = resolve_schema(&records, Metric::Deaths, true).unwrap();
        assert_eq!(schema.keys.count, "Deaths");
        assert_eq!(schema.keys.region, "GeoId");
        // Old sheets carry no population column.
        assert!(!schema.normalize);
    }

    #[test]
    fn unknown_or_empty_sheets_are_rejected() {
        let records = vec![record(&["country", "date", "cases"])];
        assert_eq!(
            resolve_schema(&records, Metric::Cases, false),
            Err(TransformError::UnknownSchema)
        );
        assert_eq!(
            resolve_schema(&[], Metric::Cases, false),
            Err(TransformError::UnknownSchema)
        );
    }
}
