//! Détection du système de coordonnées et reprojection vers WGS84
//!
//! La détection est heuristique: les plages du catalogue sont testées dans
//! l'ordre et la première qui contient le point l'emporte. UTM 28N et 27N se
//! recouvrent; 28N est testé en premier. Un point qui ne tombe dans aucune
//! plage est traité comme UTM 28N et le résultat le signale (`fallback`).

use geo::Coord;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalogue::{Catalogue, CrsDefinition};
use crate::CrsError;

/// Zone de validité des résultats (longitude/latitude en degrés)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

/// Emprise du Sénégal
pub const SENEGAL_BOUNDS: RegionBounds = RegionBounds {
    min_lon: -17.8,
    max_lon: -11.2,
    min_lat: 12.0,
    max_lat: 16.8,
};

impl RegionBounds {
    /// Vrai si le point est dans l'emprise (bornes incluses)
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }
}

/// Options du détecteur
#[derive(Debug, Clone, Copy)]
pub struct DetectorOptions {
    /// Emprise de validation après reprojection
    pub bounds: RegionBounds,
    /// Valider aussi les entrées déjà en longitude/latitude
    pub validate_geographic: bool,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            bounds: SENEGAL_BOUNDS,
            validate_geographic: false,
        }
    }
}

/// Système retenu pour une coordonnée
#[derive(Debug, Clone, Copy)]
pub struct Detection<'a> {
    pub crs: &'a CrsDefinition,
    /// Vrai si aucune plage ne correspondait (système par défaut)
    pub fallback: bool,
}

/// Coordonnée convertie en WGS84
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Converted {
    pub longitude: f64,
    pub latitude: f64,
    /// Identifiant du système détecté
    #[serde(rename = "sourceSystem")]
    pub source: &'static str,
    /// Vrai si le système par défaut a été utilisé
    #[serde(rename = "usedFallback")]
    pub fallback: bool,
}

/// Détecteur de système de coordonnées et reprojecteur
#[derive(Debug, Clone, Copy)]
pub struct CrsDetector<'a> {
    catalogue: &'a Catalogue,
    options: DetectorOptions,
}

impl<'a> CrsDetector<'a> {
    /// Crée un détecteur sur le catalogue donné avec les options par défaut
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self::with_options(catalogue, DetectorOptions::default())
    }

    pub fn with_options(catalogue: &'a Catalogue, options: DetectorOptions) -> Self {
        Self { catalogue, options }
    }

    /// Détermine le système d'une coordonnée brute
    pub fn detect(&self, coord: Coord) -> Detection<'a> {
        if let Some(crs) = self
            .catalogue
            .entries()
            .iter()
            .find(|e| e.detection.contains(coord))
        {
            return Detection {
                crs,
                fallback: false,
            };
        }

        let crs = self.catalogue.fallback();
        warn!(
            x = coord.x,
            y = coord.y,
            fallback = crs.id,
            "Système de coordonnées non reconnu, utilisation du système par défaut"
        );
        Detection {
            crs,
            fallback: true,
        }
    }

    /// Convertit une coordonnée brute en longitude/latitude WGS84
    pub fn convert(&self, coord: Coord) -> Result<Converted, CrsError> {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(CrsError::invalid(format!(
                "valeurs non finies ({}, {})",
                coord.x, coord.y
            )));
        }

        let detection = self.detect(coord);
        let crs = detection.crs;

        if crs.projection.is_geographic() {
            // Passage direct, sans arrondi
            if self.options.validate_geographic {
                self.check_bounds(coord.x, coord.y)?;
            }
            return Ok(Converted {
                longitude: coord.x,
                latitude: coord.y,
                source: crs.id,
                fallback: detection.fallback,
            });
        }

        let (lon, lat) = crs.projection.to_wgs84(coord.x, coord.y).to_degrees();
        if !lon.is_finite() || !lat.is_finite() {
            return Err(CrsError::projection(crs.id, "résultat non fini"));
        }

        let longitude = round6(lon);
        let latitude = round6(lat);
        debug!(
            x = coord.x,
            y = coord.y,
            source = crs.id,
            longitude,
            latitude,
            "Coordonnée reprojetée"
        );

        self.check_bounds(longitude, latitude)?;

        Ok(Converted {
            longitude,
            latitude,
            source: crs.id,
            fallback: detection.fallback,
        })
    }

    /// Raccourci pour une paire (x, y)
    pub fn convert_xy(&self, x: f64, y: f64) -> Result<Converted, CrsError> {
        self.convert(Coord { x, y })
    }

    fn check_bounds(&self, lon: f64, lat: f64) -> Result<(), CrsError> {
        if self.options.bounds.contains(lon, lat) {
            Ok(())
        } else {
            Err(CrsError::OutOfRegion { lon, lat })
        }
    }
}

/// Arrondi à 6 décimales (~10 cm)
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{LAMBERT_SN_ID, UTM_27N_ID, UTM_28N_ID, WGS84_ID};

    fn detect_id(catalogue: &Catalogue, x: f64, y: f64) -> (&'static str, bool) {
        let d = CrsDetector::new(catalogue).detect(Coord { x, y });
        (d.crs.id, d.fallback)
    }

    #[test]
    fn test_detection_boundaries_inclusive() {
        let catalogue = Catalogue::senegal().unwrap();

        assert_eq!(detect_id(&catalogue, -180.0, -90.0), (WGS84_ID, false));
        assert_eq!(detect_id(&catalogue, 180.0, 90.0), (WGS84_ID, false));

        assert_eq!(detect_id(&catalogue, 200000.0, 1400000.0), (UTM_28N_ID, false));
        assert_eq!(detect_id(&catalogue, 800000.0, 1900000.0), (UTM_28N_ID, false));

        // 27N n'est atteint qu'au-delà de la plage 28N
        assert_eq!(detect_id(&catalogue, 900000.0, 1400000.0), (UTM_27N_ID, false));
        assert_eq!(detect_id(&catalogue, 800000.5, 1900000.0), (UTM_27N_ID, false));

        assert_eq!(detect_id(&catalogue, 200000.0, 0.0), (LAMBERT_SN_ID, false));
        assert_eq!(detect_id(&catalogue, 600000.0, 500000.0), (LAMBERT_SN_ID, false));
    }

    #[test]
    fn test_utm_overlap_prefers_28n() {
        let catalogue = Catalogue::senegal().unwrap();
        // Dans les deux plages
        assert_eq!(detect_id(&catalogue, 600000.0, 1600000.0), (UTM_28N_ID, false));
    }

    #[test]
    fn test_fallback_is_flagged() {
        let catalogue = Catalogue::senegal().unwrap();
        assert_eq!(detect_id(&catalogue, 1000000.0, 1000000.0), (UTM_28N_ID, true));
        assert_eq!(detect_id(&catalogue, 180.5, 0.0), (UTM_28N_ID, true));
    }

    #[test]
    fn test_fallback_is_carried_by_conversion() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        // Sous la plage UTM, à l'est de la plage Lambert: traité comme 28N
        let c = detector.convert_xy(810000.0, 1350000.0).unwrap();
        assert_eq!(c.source, UTM_28N_ID);
        assert!(c.fallback);
        assert!((c.longitude - (-12.151269)).abs() < 1e-5, "lon={}", c.longitude);
        assert!((c.latitude - 12.197299).abs() < 1e-5, "lat={}", c.latitude);

        let c = detector.convert_xy(300000.0, 1630000.0).unwrap();
        assert!(!c.fallback);
    }

    #[test]
    fn test_geographic_passthrough_is_exact() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        let c = detector.convert_xy(-17.4440123456789, 14.6927987654321).unwrap();
        assert_eq!(c.longitude, -17.4440123456789);
        assert_eq!(c.latitude, 14.6927987654321);
        assert_eq!(c.source, WGS84_ID);
        assert!(!c.fallback);

        // Hors Sénégal mais accepté tel quel par défaut
        let paris = detector.convert_xy(2.35, 48.85).unwrap();
        assert_eq!((paris.longitude, paris.latitude), (2.35, 48.85));
    }

    #[test]
    fn test_strict_geographic_bounds() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::with_options(
            &catalogue,
            DetectorOptions {
                validate_geographic: true,
                ..Default::default()
            },
        );

        assert!(detector.convert_xy(-17.44, 14.69).is_ok());
        assert_eq!(
            detector.convert_xy(2.35, 48.85),
            Err(CrsError::OutOfRegion {
                lon: 2.35,
                lat: 48.85
            })
        );
    }

    #[test]
    fn test_utm28n_dakar() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        let c = detector.convert_xy(300000.0, 1630000.0).unwrap();
        assert_eq!(c.source, UTM_28N_ID);
        assert!(!c.fallback);
        assert!(SENEGAL_BOUNDS.contains(c.longitude, c.latitude));
        assert!((c.latitude - 14.73).abs() < 0.05, "lat={}", c.latitude);
        assert!((c.longitude - (-16.86)).abs() < 0.05, "lon={}", c.longitude);

        // Arrondi à 6 décimales
        assert_eq!(round6(c.longitude), c.longitude);
        assert_eq!(round6(c.latitude), c.latitude);
    }

    #[test]
    fn test_utm27n_conversion() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        let c = detector.convert_xy(900000.0, 1400000.0).unwrap();
        assert_eq!(c.source, UTM_27N_ID);
        assert!((c.longitude - (-17.32)).abs() < 0.05, "lon={}", c.longitude);
        assert!((c.latitude - 12.64).abs() < 0.05, "lat={}", c.latitude);
    }

    #[test]
    fn test_lambert_conversion() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        // Origine de la projection: ~(-14°, 14.5°) à quelques centaines de mètres près
        let c = detector.convert_xy(400000.0, 300000.0).unwrap();
        assert_eq!(c.source, LAMBERT_SN_ID);
        assert!((c.longitude - (-14.0)).abs() < 0.01, "lon={}", c.longitude);
        assert!((c.latitude - 14.5).abs() < 0.01, "lat={}", c.latitude);
    }

    #[test]
    fn test_out_of_region() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        // Coin nord-est de la plage 28N: au nord du fleuve Sénégal
        let err = detector.convert_xy(800000.0, 1900000.0).unwrap_err();
        let CrsError::OutOfRegion { lon, lat } = err else {
            panic!("Expected OutOfRegion, got {:?}", err);
        };
        assert!(lat > 16.8, "lat={}", lat);
        assert!(err.to_string().contains(&format!("{:.2}", lon)));
    }

    #[test]
    fn test_non_finite_input() {
        let catalogue = Catalogue::senegal().unwrap();
        let detector = CrsDetector::new(&catalogue);

        assert!(matches!(
            detector.convert_xy(f64::NAN, 14.0),
            Err(CrsError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            detector.convert_xy(-17.0, f64::INFINITY),
            Err(CrsError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_converted_serialization() {
        let c = Converted {
            longitude: -17.0,
            latitude: 14.0,
            source: UTM_28N_ID,
            fallback: true,
        };
        let json = serde_json::to_value(c).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "longitude": -17.0,
                "latitude": 14.0,
                "sourceSystem": "EPSG:32628",
                "usedFallback": true
            })
        );
    }
}
