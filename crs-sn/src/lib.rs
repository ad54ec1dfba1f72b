//! # crs-sn
//!
//! Détection et reprojection des systèmes de coordonnées rencontrés dans les
//! données géographiques du Sénégal, en Rust pur.
//!
//! ## Systèmes supportés
//!
//! - WGS84 (EPSG:4326) - longitude/latitude, passage direct
//! - UTM 28N (EPSG:32628) - système projeté par défaut
//! - UTM 27N (EPSG:32627) - variante occidentale
//! - Lambert Sénégal - conique conforme, Clarke 1880 + Helmert vers WGS84
//!
//! ## Usage
//!
//! ```rust
//! use crs_sn::{Catalogue, CrsDetector};
//!
//! let catalogue = Catalogue::senegal()?;
//! let detector = CrsDetector::new(&catalogue);
//!
//! let converted = detector.convert_xy(237000.0, 1626000.0)?;
//! assert_eq!(converted.source, "EPSG:32628");
//! assert!(converted.longitude < -17.0);
//! # Ok::<(), crs_sn::CrsError>(())
//! ```

pub mod catalogue;
pub mod datum;
pub mod detector;
pub mod ellipsoid;
pub mod error;
pub mod lambert;
pub mod utm;

pub use catalogue::{Catalogue, CrsDefinition, DetectionRange, Projection};
pub use detector::{
    Converted, CrsDetector, Detection, DetectorOptions, RegionBounds, SENEGAL_BOUNDS,
};
pub use error::CrsError;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}
