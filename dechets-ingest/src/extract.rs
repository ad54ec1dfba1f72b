//! Extraction d'une coordonnée représentative depuis une géométrie GeoJSON
//!
//! Une seule position suffit pour détecter le système de coordonnées et
//! vérifier l'emprise: la première position de la géométrie est retenue.

use serde_json::Value;
use tracing::warn;

/// Profondeur d'imbrication entre `coordinates` et la première position
fn nesting_depth(geometry_type: &str) -> Option<usize> {
    match geometry_type {
        "Point" => Some(0),
        "LineString" | "MultiPoint" => Some(1),
        "Polygon" | "MultiLineString" => Some(2),
        "MultiPolygon" => Some(3),
        _ => None,
    }
}

/// Retourne la position représentative `[x, y, ...]` d'une géométrie brute
///
/// Pour un Point, `coordinates` est retourné tel quel (la validation numérique
/// est faite à la conversion). Pour les autres types, la position atteinte
/// doit être un tableau d'au moins deux éléments. Retourne `None` pour un type
/// non supporté ou une imbrication mal formée.
pub fn extract_coordinates(geometry: &Value) -> Option<&Value> {
    let geometry_type = geometry.get("type").and_then(Value::as_str);

    let Some(depth) = geometry_type.and_then(nesting_depth) else {
        warn!(
            geometry_type = geometry_type.unwrap_or("<absent>"),
            "Type de géométrie non supporté"
        );
        return None;
    };

    let mut current = geometry.get("coordinates")?;
    if depth == 0 {
        return Some(current);
    }

    for _ in 0..depth {
        current = match current.as_array().and_then(|items| items.first()) {
            Some(first) => first,
            None => {
                warn!(
                    geometry_type = geometry_type.unwrap_or_default(),
                    "Géométrie mal formée: imbrication des coordonnées inattendue"
                );
                return None;
            }
        };
    }

    match current.as_array() {
        Some(position) if position.len() >= 2 => Some(current),
        _ => {
            warn!(
                geometry_type = geometry_type.unwrap_or_default(),
                "Géométrie mal formée: position invalide"
            );
            None
        }
    }
}
