//! # dechets-ingest
//!
//! Import de données géographiques (GeoJSON) pour la gestion des déchets à
//! Dakar: points de collecte, mobilier urbain, circuits de balayage.
//!
//! ## Features
//!
//! - Extraction d'une coordonnée représentative par géométrie
//! - Détection du système de coordonnées (WGS84, UTM 28N/27N, Lambert Sénégal)
//!   et conversion en WGS84 via [`crs_sn`]
//! - Mapping des propriétés par alias (configuration JSON)
//! - Insertion PostgreSQL par lot, export GeoJSON ou JSON
//!
//! ## Usage CLI
//!
//! ```bash
//! # Conversion d'une coordonnée
//! dechets-ingest convert 237000 1626000
//!
//! # Mapping vers fichiers (sans base de données)
//! dechets-ingest map --path bacs.geojson --kind collection-point --output bacs.json
//!
//! # Import dans PostgreSQL
//! dechets-ingest import --path mobilier.geojson --kind urban-furniture
//! ```

pub mod config;
pub mod convert;
pub mod entity;
pub mod error;
pub mod extract;
pub mod fields;
pub mod import;
pub mod mapper;
pub mod report;
pub mod store;

pub use config::Config;
pub use convert::{convert_value, ConversionRecord};
pub use entity::{EntityKind, EntityRecord};
pub use error::IngestError;
pub use extract::extract_coordinates;
pub use import::import_collection;
pub use mapper::{FeatureMapper, MappedBatch, MapperOptions};
pub use report::{ConversionStats, ImportReport, ImportStatus};
pub use store::pool::{create_pool, DatabaseConfig};
pub use store::{JsonSink, PgSink, RecordSink};
