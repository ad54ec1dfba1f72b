//! Export des enregistrements en GeoJSON (WGS84)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue};
use serde_json::Value;
use tracing::warn;

use crate::entity::EntityRecord;

/// Construit une FeatureCollection de points depuis des enregistrements
///
/// `longitude`/`latitude` deviennent la géométrie, les autres colonnes les
/// propriétés. Un enregistrement sans coordonnées numériques est ignoré.
pub fn to_feature_collection(records: &[EntityRecord]) -> FeatureCollection {
    let features = records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let feature = to_feature(record);
            if feature.is_none() {
                warn!(index = i + 1, "Enregistrement sans coordonnées, ignoré à l'export");
            }
            feature
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn to_feature(record: &EntityRecord) -> Option<Feature> {
    let lon = record.get("longitude").and_then(Value::as_f64)?;
    let lat = record.get("latitude").and_then(Value::as_f64)?;

    let properties: JsonObject = record
        .iter()
        .filter(|(k, _)| k.as_str() != "longitude" && k.as_str() != "latitude")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeoValue::Point(vec![lon, lat]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Exporte des enregistrements dans un fichier GeoJSON
pub fn export_to_geojson(records: &[EntityRecord], output_path: &Path) -> Result<usize> {
    let collection = to_feature_collection(records);

    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &collection).context("Failed to write GeoJSON")?;
    writer.flush()?;

    Ok(collection.features.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> EntityRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_to_feature_collection() {
        let records = vec![
            record(json!({ "name": "Bac 1", "status": "active", "latitude": 14.69, "longitude": -17.44 })),
            record(json!({ "name": "Sans position" })),
        ];

        let collection = to_feature_collection(&records);
        assert_eq!(collection.features.len(), 1);

        let feature = &collection.features[0];
        assert_eq!(
            feature.geometry.as_ref().map(|g| &g.value),
            Some(&GeoValue::Point(vec![-17.44, 14.69]))
        );
        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties.get("name"), Some(&json!("Bac 1")));
        assert!(!properties.contains_key("latitude"));
    }

    #[test]
    fn test_export_to_geojson() {
        let records = vec![record(json!({ "name": "PRN Plateau", "latitude": 14.67, "longitude": -17.43 }))];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mobilier.geojson");
        let written = export_to_geojson(&records, &path).unwrap();
        assert_eq!(written, 1);

        let geojson: geojson::GeoJson = std::fs::read_to_string(&path).unwrap().parse().unwrap();
        match geojson {
            geojson::GeoJson::FeatureCollection(fc) => {
                assert_eq!(fc.features.len(), 1);
                assert_eq!(fc.features[0].property("name"), Some(&json!("PRN Plateau")));
            }
            other => panic!("FeatureCollection attendue, reçu {:?}", other),
        }
    }
}
