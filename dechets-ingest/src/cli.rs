//! Définition et implémentation des commandes CLI
//!
//! - `convert`: une coordonnée → WGS84
//! - `systems`: liste des systèmes de coordonnées reconnus
//! - `map`: GeoJSON → enregistrements JSON/GeoJSON (sans DB)
//! - `import`: GeoJSON → PostgreSQL

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use crs_sn::{Catalogue, CrsDetector, DetectorOptions};
use serde_json::Value;
use tracing::info;

use dechets_ingest::store::geojson::export_to_geojson;
use dechets_ingest::store::pool::{create_pool, test_connection, DatabaseConfig, DatabaseOverrides, SslMode};
use dechets_ingest::{
    convert_value, import_collection, Config, ConversionRecord, EntityKind, FeatureMapper, ImportReport,
    ImportStatus, JsonSink, PgSink,
};

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a single coordinate to WGS84
    Convert {
        /// X (longitude or easting)
        #[arg(allow_negative_numbers = true)]
        x: f64,

        /// Y (latitude or northing)
        #[arg(allow_negative_numbers = true)]
        y: f64,

        /// Reject geographic inputs outside Senegal
        #[arg(long)]
        strict_bounds: bool,
    },

    /// List the supported coordinate systems
    Systems,

    /// Map a GeoJSON file to entity records (no database required)
    Map {
        #[command(flatten)]
        input: InputArgs,

        /// Output JSON file for the records
        #[arg(short, long)]
        output: PathBuf,

        /// Also export the records as a WGS84 GeoJSON file
        #[arg(long)]
        geojson: Option<PathBuf>,
    },

    /// Map a GeoJSON file and insert the records into PostgreSQL
    Import {
        #[command(flatten)]
        input: InputArgs,

        /// Target PostgreSQL schema
        #[arg(long, default_value = "public")]
        schema: String,

        /// PostgreSQL host (défaut : env PGHOST / localhost)
        #[arg(long)]
        host: Option<String>,

        /// PostgreSQL database name (défaut : env PGDATABASE / dechets)
        #[arg(long)]
        database: Option<String>,

        /// PostgreSQL user (défaut : env PGUSER / postgres)
        #[arg(long)]
        user: Option<String>,

        /// PostgreSQL password (défaut : env PGPASSWORD)
        #[arg(long)]
        password: Option<String>,

        /// PostgreSQL port (défaut : env PGPORT / 5432)
        #[arg(long)]
        port: Option<u16>,

        /// SSL mode: disable, prefer, require (défaut : env PGSSLMODE / disable)
        #[arg(long)]
        ssl: Option<SslMode>,
    },
}

/// Arguments communs à `map` et `import`
#[derive(Args)]
pub struct InputArgs {
    /// Path to the GeoJSON file
    #[arg(short, long)]
    pub path: PathBuf,

    /// Entity kind to produce
    #[arg(short, long, value_enum)]
    pub kind: EntityKind,

    /// Config preset name (default) or path to a JSON config
    #[arg(long, default_value = "default")]
    pub config: String,

    /// Save the import report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Refuse files with more features than this
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Reject geographic inputs outside Senegal
    #[arg(long)]
    pub strict_bounds: bool,
}

fn detector_options(strict_bounds: bool) -> DetectorOptions {
    DetectorOptions {
        validate_geographic: strict_bounds,
        ..Default::default()
    }
}

/// Exécute la commande convert
pub fn cmd_convert(x: f64, y: f64, strict_bounds: bool) -> Result<()> {
    let catalogue = Catalogue::senegal()?;
    let detector = CrsDetector::with_options(&catalogue, detector_options(strict_bounds));

    let record = ConversionRecord::from(convert_value(&detector, &Value::from(vec![x, y])));
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Exécute la commande systems
pub fn cmd_systems() -> Result<()> {
    let catalogue = Catalogue::senegal()?;
    let fallback = catalogue.fallback().id;
    for crs in catalogue.entries() {
        let marker = if crs.id == fallback { " (défaut)" } else { "" };
        println!("{:<12} {}{}", crs.id, crs.label, marker);
        println!("{:<12} {}", "", crs.definition);
    }
    Ok(())
}

/// Exécute la commande map
pub async fn cmd_map(input: &InputArgs, output: &Path, geojson: Option<&Path>) -> Result<()> {
    let config = Config::from_spec(&input.config)?;
    let document = read_geojson(&input.path, input.max_features)?;

    let catalogue = Catalogue::senegal()?;
    let mapper = FeatureMapper::new(
        CrsDetector::with_options(&catalogue, detector_options(input.strict_bounds)),
        &config,
    );

    let sink = JsonSink::new(output);
    let (report, batch) =
        import_collection(&mapper, &sink, &document, input.kind, &input.path.display().to_string()).await;

    if let (Some(path), Some(batch)) = (geojson, &batch) {
        if report.status != ImportStatus::Failed {
            let written = export_to_geojson(&batch.records, path)?;
            info!(path = %path.display(), features = written, "GeoJSON exporté");
        }
    }

    finish(&report, input.report.as_deref())
}

/// Exécute la commande import
pub async fn cmd_import(input: &InputArgs, schema: &str, overrides: DatabaseOverrides) -> Result<()> {
    let config = Config::from_spec(&input.config)?;
    let document = read_geojson(&input.path, input.max_features)?;

    let db_config = DatabaseConfig::from_env().with_overrides(overrides);
    info!(
        host = %db_config.host,
        database = %db_config.dbname,
        schema,
        "Connexion à PostgreSQL"
    );
    let pool = create_pool(&db_config)?;
    test_connection(&pool).await?;

    let catalogue = Catalogue::senegal()?;
    let mapper = FeatureMapper::new(
        CrsDetector::with_options(&catalogue, detector_options(input.strict_bounds)),
        &config,
    );

    let sink = PgSink::new(pool, schema);
    let (report, _) =
        import_collection(&mapper, &sink, &document, input.kind, &input.path.display().to_string()).await;

    finish(&report, input.report.as_deref())
}

fn finish(report: &ImportReport, report_path: Option<&Path>) -> Result<()> {
    report.display();

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Rapport sauvegardé");
    }

    if report.status == ImportStatus::Failed {
        bail!("{}", report.summary());
    }
    println!("{}", report.summary());
    Ok(())
}

/// Lit un fichier GeoJSON, en refusant les fichiers trop volumineux
fn read_geojson(path: &Path, max_features: Option<usize>) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse GeoJSON file: {}", path.display()))?;

    if let Some(max) = max_features {
        check_feature_count(&document, max)?;
    }
    Ok(document)
}

fn check_feature_count(document: &Value, max: usize) -> Result<()> {
    let count = document
        .get("features")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    if count > max {
        bail!("Trop de features: {} (maximum {})", count, max);
    }
    Ok(())
}
