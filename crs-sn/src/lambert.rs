//! Projection conique conforme de Lambert à 2 parallèles standards

use super::ellipsoid::Ellipsoid;
use super::Geographic;

/// Paramètres d'une projection Lambert (angles en radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertParams {
    /// Premier parallèle standard
    pub lat1: f64,
    /// Deuxième parallèle standard
    pub lat2: f64,
    /// Latitude origine
    pub lat0: f64,
    /// Longitude origine
    pub lon0: f64,
    /// False easting
    pub x0: f64,
    /// False northing
    pub y0: f64,
}

/// Constantes de projection dérivées des paramètres et de l'ellipsoïde
struct Cone {
    /// Exposant de la projection
    n: f64,
    /// Constante C
    c: f64,
    /// Rayon à l'origine
    r0: f64,
}

impl Cone {
    fn new(params: &LambertParams, ellipsoid: &Ellipsoid) -> Self {
        let e = ellipsoid.e();

        let n1 = ellipsoid.grande_normale(params.lat1);
        let n2 = ellipsoid.grande_normale(params.lat2);

        let iso_lat1 = isometric_latitude(params.lat1, e);
        let iso_lat2 = isometric_latitude(params.lat2, e);
        let iso_lat0 = isometric_latitude(params.lat0, e);

        let n = ((n1 * params.lat1.cos()).ln() - (n2 * params.lat2.cos()).ln())
            / (iso_lat2 - iso_lat1);
        let c = (n1 * params.lat1.cos() / n) * (n * iso_lat1).exp();
        let r0 = c * (-n * iso_lat0).exp();

        Self { n, c, r0 }
    }
}

/// Calcule la latitude isométrique
fn isometric_latitude(lat: f64, e: f64) -> f64 {
    let sin_lat = lat.sin();
    let term = ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).powf(e / 2.0);
    ((std::f64::consts::FRAC_PI_4 + lat / 2.0).tan() * term).ln()
}

/// Calcule la latitude depuis la latitude isométrique (itératif)
fn latitude_from_isometric(iso_lat: f64, e: f64) -> f64 {
    let mut lat = 2.0 * iso_lat.exp().atan() - std::f64::consts::FRAC_PI_2;

    for _ in 0..10 {
        let sin_lat = lat.sin();
        let term = ((1.0 + e * sin_lat) / (1.0 - e * sin_lat)).powf(e / 2.0);
        let new_lat = 2.0 * (iso_lat.exp() * term).atan() - std::f64::consts::FRAC_PI_2;

        if (new_lat - lat).abs() < 1e-12 {
            return new_lat;
        }
        lat = new_lat;
    }
    lat
}

/// Convertit des coordonnées Lambert en géographiques sur l'ellipsoïde de la projection
pub fn lambert_to_geographic(
    x: f64,
    y: f64,
    params: &LambertParams,
    ellipsoid: &Ellipsoid,
) -> Geographic {
    let cone = Cone::new(params, ellipsoid);

    let dx = x - params.x0;
    let dy = y - params.y0;

    let r = (dx.powi(2) + (cone.r0 - dy).powi(2)).sqrt();
    let r = if cone.n < 0.0 { -r } else { r };

    let gamma = (dx / (cone.r0 - dy)).atan();

    let iso_lat = -(r / cone.c).ln() / cone.n;
    let lat = latitude_from_isometric(iso_lat, ellipsoid.e());
    let lon = params.lon0 + gamma / cone.n;

    Geographic::new(lon, lat)
}

/// Convertit des coordonnées géographiques en Lambert (sens direct)
#[cfg(test)]
fn geographic_to_lambert(
    geo: Geographic,
    params: &LambertParams,
    ellipsoid: &Ellipsoid,
) -> (f64, f64) {
    let cone = Cone::new(params, ellipsoid);

    let r = cone.c * (-cone.n * isometric_latitude(geo.lat, ellipsoid.e())).exp();
    let gamma = cone.n * (geo.lon - params.lon0);

    let x = params.x0 + r * gamma.sin();
    let y = params.y0 + cone.r0 - r * gamma.cos();

    (x, y)
}
