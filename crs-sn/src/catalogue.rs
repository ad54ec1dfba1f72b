//! Catalogue des systèmes de coordonnées supportés
//!
//! Le catalogue est construit une seule fois au démarrage et passé par
//! référence au détecteur. Les définitions proj4 font foi: les paramètres
//! typés sont obtenus en les analysant.

use std::ops::RangeInclusive;

use geo::Coord;

use crate::datum::Helmert;
use crate::ellipsoid::{Ellipsoid, WGS84};
use crate::lambert::{lambert_to_geographic, LambertParams};
use crate::utm::{utm_to_geographic, UtmZone};
use crate::{CrsError, Geographic};

/// Identifiant du système géographique WGS84
pub const WGS84_ID: &str = "EPSG:4326";
/// Identifiant UTM zone 28N
pub const UTM_28N_ID: &str = "EPSG:32628";
/// Identifiant UTM zone 27N
pub const UTM_27N_ID: &str = "EPSG:32627";
/// Identifiant du Lambert sénégalais
pub const LAMBERT_SN_ID: &str = "SN:LAMBERT";

/// Définitions proj4 du catalogue sénégalais, dans l'ordre de détection
const SENEGAL: &[(&str, &str, &str)] = &[
    (
        WGS84_ID,
        "WGS84 (longitude/latitude)",
        "+proj=longlat +datum=WGS84 +no_defs",
    ),
    (
        UTM_28N_ID,
        "WGS84 / UTM zone 28N",
        "+proj=utm +zone=28 +datum=WGS84 +units=m +no_defs",
    ),
    (
        UTM_27N_ID,
        "WGS84 / UTM zone 27N",
        "+proj=utm +zone=27 +datum=WGS84 +units=m +no_defs",
    ),
    (
        LAMBERT_SN_ID,
        "Lambert Sénégal (Clarke 1880)",
        "+proj=lcc +lat_1=13.5 +lat_2=15.5 +lat_0=14.5 +lon_0=-14 +x_0=400000 +y_0=300000 +ellps=clrk80 +towgs84=-263,6,431,0,0,0,0 +units=m +no_defs",
    ),
];

/// Plage numérique (bornes incluses) servant à reconnaître un système
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRange {
    pub x: RangeInclusive<f64>,
    pub y: RangeInclusive<f64>,
}

impl DetectionRange {
    pub fn new(x: RangeInclusive<f64>, y: RangeInclusive<f64>) -> Self {
        Self { x, y }
    }

    /// Vrai si la coordonnée tombe dans la plage
    pub fn contains(&self, coord: Coord) -> bool {
        self.x.contains(&coord.x) && self.y.contains(&coord.y)
    }
}

/// Paramètres de projection typés
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Longitude/latitude en degrés
    LongLat { ellipsoid: Ellipsoid },
    /// Transverse Mercator universelle
    Utm { zone: UtmZone, ellipsoid: Ellipsoid },
    /// Conique conforme de Lambert, avec changement de datum vers WGS84
    Lambert {
        params: LambertParams,
        ellipsoid: Ellipsoid,
        to_wgs84: Helmert,
    },
}

impl Projection {
    /// Analyse une définition proj4 (`+proj=... +zone=... ...`)
    ///
    /// Seuls les paramètres utilisés par le catalogue sont reconnus.
    pub fn parse(definition: &str) -> Result<Self, CrsError> {
        let unsupported = |reason: &str| {
            CrsError::UnsupportedDefinition(format!("{} ({})", definition, reason))
        };

        let mut proj = None;
        let mut ellipsoid = None;
        let mut towgs84 = None;
        let mut zone = None;
        let mut south = false;
        let mut lat1 = None;
        let mut lat2 = None;
        let mut lat0 = None;
        let mut lon0 = None;
        let mut x0 = 0.0;
        let mut y0 = 0.0;

        for token in definition.split_whitespace() {
            let Some(token) = token.strip_prefix('+') else {
                return Err(unsupported("paramètre sans '+'"));
            };
            let (key, value) = match token.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (token, None),
            };

            let number = |v: Option<&str>| -> Result<f64, CrsError> {
                v.and_then(|v| v.parse::<f64>().ok())
                    .ok_or_else(|| unsupported(&format!("valeur numérique attendue pour {}", key)))
            };

            match key {
                "proj" => proj = value,
                "datum" | "ellps" => {
                    let name = value.unwrap_or_default();
                    ellipsoid = Some(
                        Ellipsoid::by_name(name)
                            .ok_or_else(|| unsupported(&format!("ellipsoïde {}", name)))?,
                    );
                }
                "towgs84" => {
                    let values: Result<Vec<f64>, _> = value
                        .unwrap_or_default()
                        .split(',')
                        .map(|v| v.trim().parse::<f64>())
                        .collect();
                    let values = values.map_err(|_| unsupported("towgs84 invalide"))?;
                    towgs84 = Some(
                        Helmert::from_towgs84(&values)
                            .ok_or_else(|| unsupported("towgs84 attend 3 ou 7 valeurs"))?,
                    );
                }
                "zone" => {
                    zone = Some(
                        value
                            .and_then(|v| v.parse::<u8>().ok())
                            .filter(|z| (1..=60).contains(z))
                            .ok_or_else(|| unsupported("zone UTM invalide"))?,
                    );
                }
                "south" => south = true,
                "lat_1" => lat1 = Some(number(value)?),
                "lat_2" => lat2 = Some(number(value)?),
                "lat_0" => lat0 = Some(number(value)?),
                "lon_0" => lon0 = Some(number(value)?),
                "x_0" => x0 = number(value)?,
                "y_0" => y0 = number(value)?,
                "units" if value != Some("m") => return Err(unsupported("unité autre que le mètre")),
                "units" | "no_defs" => {}
                other => return Err(unsupported(&format!("paramètre inconnu {}", other))),
            }
        }

        let ellipsoid = ellipsoid.ok_or_else(|| unsupported("ellipsoïde manquant"))?;

        match proj {
            Some("longlat") => Ok(Self::LongLat { ellipsoid }),
            Some("utm") => Ok(Self::Utm {
                zone: UtmZone {
                    zone: zone.ok_or_else(|| unsupported("zone UTM manquante"))?,
                    south,
                },
                ellipsoid,
            }),
            Some("lcc") => {
                let lat1 = lat1.ok_or_else(|| unsupported("lat_1 manquant"))?;
                let lat2 = lat2.unwrap_or(lat1);
                // Un cône tangent (lat_1 = lat_2) n'est pas géré par la forme 2SP
                if (lat1 - lat2).abs() < 1e-12 {
                    return Err(unsupported("lat_1 et lat_2 identiques"));
                }
                Ok(Self::Lambert {
                    params: LambertParams {
                        lat1: lat1.to_radians(),
                        lat2: lat2.to_radians(),
                        lat0: lat0.unwrap_or(lat1).to_radians(),
                        lon0: lon0.unwrap_or(0.0).to_radians(),
                        x0,
                        y0,
                    },
                    ellipsoid,
                    to_wgs84: towgs84.unwrap_or_default(),
                })
            }
            Some(other) => Err(unsupported(&format!("projection {}", other))),
            None => Err(unsupported("+proj manquant")),
        }
    }

    /// Vrai pour un système en longitude/latitude
    pub fn is_geographic(&self) -> bool {
        matches!(self, Self::LongLat { .. })
    }

    /// Projette (x, y) vers des coordonnées géographiques WGS84
    pub fn to_wgs84(&self, x: f64, y: f64) -> Geographic {
        match self {
            Self::LongLat { .. } => Geographic::from_degrees(x, y),
            Self::Utm { zone, ellipsoid } => utm_to_geographic(x, y, *zone, ellipsoid),
            Self::Lambert {
                params,
                ellipsoid,
                to_wgs84,
            } => {
                let local = lambert_to_geographic(x, y, params, ellipsoid);
                if to_wgs84.is_identity() && *ellipsoid == WGS84 {
                    local
                } else {
                    to_wgs84.transform(local, ellipsoid, &WGS84)
                }
            }
        }
    }
}

/// Une entrée du catalogue
#[derive(Debug, Clone)]
pub struct CrsDefinition {
    /// Identifiant unique (ex: "EPSG:32628")
    pub id: &'static str,
    /// Libellé lisible
    pub label: &'static str,
    /// Définition proj4 d'origine
    pub definition: &'static str,
    /// Paramètres analysés
    pub projection: Projection,
    /// Plage de détection
    pub detection: DetectionRange,
}

/// Catalogue immuable des systèmes connus
#[derive(Debug, Clone)]
pub struct Catalogue {
    entries: Vec<CrsDefinition>,
    fallback: usize,
}

impl Catalogue {
    /// Catalogue des 4 systèmes utilisés au Sénégal
    ///
    /// L'ordre des entrées est l'ordre de priorité de la détection;
    /// UTM 28N est aussi le système par défaut.
    pub fn senegal() -> Result<Self, CrsError> {
        let ranges = [
            DetectionRange::new(-180.0..=180.0, -90.0..=90.0),
            DetectionRange::new(200000.0..=800000.0, 1400000.0..=1900000.0),
            DetectionRange::new(400000.0..=900000.0, 1400000.0..=1900000.0),
            DetectionRange::new(200000.0..=600000.0, 0.0..=500000.0),
        ];

        let entries = SENEGAL
            .iter()
            .zip(ranges)
            .map(|(&(id, label, definition), detection)| -> Result<_, CrsError> {
                Ok(CrsDefinition {
                    id,
                    label,
                    definition,
                    projection: Projection::parse(definition)?,
                    detection,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            entries,
            fallback: 1,
        })
    }

    /// Entrées dans l'ordre de détection
    pub fn entries(&self) -> &[CrsDefinition] {
        &self.entries
    }

    /// Système utilisé quand aucune plage ne correspond
    pub fn fallback(&self) -> &CrsDefinition {
        &self.entries[self.fallback]
    }
}
