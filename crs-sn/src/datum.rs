//! Changement de datum par transformation de Helmert à 7 paramètres
//!
//! Convention "position vector" (celle de `+towgs84` dans PROJ):
//! translations en mètres, rotations en secondes d'arc, facteur d'échelle en ppm.

use super::ellipsoid::Ellipsoid;
use super::Geographic;

const ARC_SECOND: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Paramètres de transformation vers WGS84
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Helmert {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub ds: f64,
}

impl Helmert {
    /// Construit depuis la liste `+towgs84=dx,dy,dz[,rx,ry,rz,ds]`
    pub fn from_towgs84(values: &[f64]) -> Option<Self> {
        match *values {
            [dx, dy, dz] => Some(Self {
                dx,
                dy,
                dz,
                ..Default::default()
            }),
            [dx, dy, dz, rx, ry, rz, ds] => Some(Self {
                dx,
                dy,
                dz,
                rx,
                ry,
                rz,
                ds,
            }),
            _ => None,
        }
    }

    /// Vrai si la transformation est l'identité
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Applique la transformation à un point cartésien géocentrique
    fn apply(&self, (x, y, z): (f64, f64, f64)) -> (f64, f64, f64) {
        let rx = self.rx * ARC_SECOND;
        let ry = self.ry * ARC_SECOND;
        let rz = self.rz * ARC_SECOND;
        let m = 1.0 + self.ds * 1e-6;

        (
            self.dx + m * (x - rz * y + ry * z),
            self.dy + m * (rz * x + y - rx * z),
            self.dz + m * (-ry * x + rx * y + z),
        )
    }

    /// Transforme des coordonnées géographiques de `source` vers `target`
    ///
    /// La hauteur ellipsoïdale est supposée nulle en entrée et ignorée en sortie.
    pub fn transform(&self, geo: Geographic, source: &Ellipsoid, target: &Ellipsoid) -> Geographic {
        let cartesian = geographic_to_geocentric(geo, source);
        geocentric_to_geographic(self.apply(cartesian), target)
    }
}

/// Coordonnées géographiques (h = 0) vers cartésiennes géocentriques
fn geographic_to_geocentric(geo: Geographic, ellipsoid: &Ellipsoid) -> (f64, f64, f64) {
    let n = ellipsoid.grande_normale(geo.lat);
    let e2 = ellipsoid.e2();

    (
        n * geo.lat.cos() * geo.lon.cos(),
        n * geo.lat.cos() * geo.lon.sin(),
        n * (1.0 - e2) * geo.lat.sin(),
    )
}

/// Cartésiennes géocentriques vers géographiques (itératif)
fn geocentric_to_geographic((x, y, z): (f64, f64, f64), ellipsoid: &Ellipsoid) -> Geographic {
    let e2 = ellipsoid.e2();
    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);

    let mut lat = z.atan2(p * (1.0 - e2));
    for _ in 0..10 {
        let n = ellipsoid.grande_normale(lat);
        let h = p / lat.cos() - n;
        let new_lat = z.atan2(p * (1.0 - e2 * n / (n + h)));

        if (new_lat - lat).abs() < 1e-12 {
            return Geographic::new(lon, new_lat);
        }
        lat = new_lat;
    }

    Geographic::new(lon, lat)
}
