//! Conversion d'une position GeoJSON brute via le détecteur de CRS

use crs_sn::{Converted, CrsDetector, CrsError};
use geo::Coord;
use serde::Serialize;
use serde_json::Value;

/// Valide une position brute `[x, y, ...]` puis la convertit en WGS84
///
/// Aucune reprojection n'est tentée si l'entrée n'est pas un tableau d'au
/// moins deux nombres.
pub fn convert_value(detector: &CrsDetector<'_>, raw: &Value) -> Result<Converted, CrsError> {
    let Some(items) = raw.as_array() else {
        return Err(CrsError::invalid(format!(
            "un tableau [x, y] est attendu, reçu {}",
            raw
        )));
    };

    if items.len() < 2 {
        return Err(CrsError::invalid(format!(
            "au moins 2 valeurs attendues, {} reçue(s)",
            items.len()
        )));
    }

    let x = items[0]
        .as_f64()
        .ok_or_else(|| CrsError::invalid(format!("x n'est pas numérique ({})", items[0])))?;
    let y = items[1]
        .as_f64()
        .ok_or_else(|| CrsError::invalid(format!("y n'est pas numérique ({})", items[1])))?;

    detector.convert(Coord { x, y })
}

/// Forme sérialisée d'un résultat de conversion
///
/// Succès: `{longitude, latitude, sourceSystem, usedFallback}`;
/// échec: `{longitude: null, latitude: null, error}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRecord {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    #[serde(rename = "sourceSystem", skip_serializing_if = "Option::is_none")]
    pub source_system: Option<String>,
    #[serde(rename = "usedFallback", skip_serializing_if = "Option::is_none")]
    pub used_fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<Converted, CrsError>> for ConversionRecord {
    fn from(result: Result<Converted, CrsError>) -> Self {
        match result {
            Ok(c) => Self {
                longitude: Some(c.longitude),
                latitude: Some(c.latitude),
                source_system: Some(c.source.to_string()),
                used_fallback: Some(c.fallback),
                error: None,
            },
            Err(e) => Self {
                longitude: None,
                latitude: None,
                source_system: None,
                used_fallback: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crs_sn::Catalogue;
    use serde_json::json;

    #[test]
    fn test_invalid_inputs_fail_before_projection() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        for raw in [
            json!("-17.4,14.7"),
            json!({ "x": 1 }),
            json!([]),
            json!([-17.4]),
            json!(["-17.4", 14.7]),
            json!([-17.4, null]),
        ] {
            assert!(
                matches!(convert_value(&detector, &raw), Err(CrsError::InvalidCoordinate(_))),
                "raw={}",
                raw
            );
        }
    }

    #[test]
    fn test_extra_dimension_is_ignored() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        let c = convert_value(&detector, &json!([-17.44, 14.69, 12.0])).unwrap();
        assert_eq!((c.longitude, c.latitude), (-17.44, 14.69));
    }

    #[test]
    fn test_record_shapes() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        let ok = ConversionRecord::from(convert_value(&detector, &json!([-17.44, 14.69])));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({
                "longitude": -17.44,
                "latitude": 14.69,
                "sourceSystem": "EPSG:4326",
                "usedFallback": false
            })
        );

        let failed = ConversionRecord::from(convert_value(&detector, &json!([800000.0, 1900000.0])));
        let value = serde_json::to_value(&failed).unwrap();
        assert!(value["longitude"].is_null());
        assert!(value["latitude"].is_null());
        assert!(value["error"].as_str().unwrap().contains("hors du Sénégal"));
        assert!(value.get("sourceSystem").is_none());
    }
}
