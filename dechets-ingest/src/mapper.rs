//! Mapping d'une FeatureCollection vers des enregistrements d'entités
//!
//! Validation structurelle d'abord (échec immédiat), puis traitement feature
//! par feature: une feature en échec est comptée et ignorée, le lot continue.

use chrono::{DateTime, Utc};
use crs_sn::{Converted, CrsDetector};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::{Config, EntityConfig};
use crate::convert::convert_value;
use crate::entity::{EntityKind, EntityRecord};
use crate::extract::extract_coordinates;
use crate::fields::FieldContext;
use crate::report::{ConversionStats, FailureStage, FeatureFailure};
use crate::IngestError;

/// Options du mapper
#[derive(Debug, Clone, Copy)]
pub struct MapperOptions {
    /// Date d'import, utilisée pour les champs timestamp par défaut
    pub imported_at: DateTime<Utc>,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            imported_at: Utc::now(),
        }
    }
}

/// Résultat du mapping d'un lot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedBatch {
    /// Enregistrements prêts à insérer
    pub records: Vec<EntityRecord>,
    /// Nombre d'enregistrements
    pub count: usize,
    /// Nombre de features ignorées
    pub skipped: usize,
    pub conversion_stats: ConversionStats,
    /// Diagnostics des features ignorées
    pub failures: Vec<FeatureFailure>,
}

/// Mapper de features GeoJSON vers enregistrements
pub struct FeatureMapper<'a> {
    detector: CrsDetector<'a>,
    config: &'a Config,
    options: MapperOptions,
}

impl<'a> FeatureMapper<'a> {
    pub fn new(detector: CrsDetector<'a>, config: &'a Config) -> Self {
        Self::with_options(detector, config, MapperOptions::default())
    }

    pub fn with_options(detector: CrsDetector<'a>, config: &'a Config, options: MapperOptions) -> Self {
        Self {
            detector,
            config,
            options,
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Transforme une FeatureCollection en enregistrements du type demandé
    ///
    /// # Errors
    ///
    /// Erreur structurelle si le document n'est pas une FeatureCollection
    /// non vide; `NoValidFeatures` si aucune feature n'a pu être convertie.
    pub fn map(&self, geojson: &Value, kind: EntityKind) -> Result<MappedBatch, IngestError> {
        let features = validate_collection(geojson)?;
        let entity = self.config.entity(kind);

        let mut records = Vec::with_capacity(features.len());
        let mut stats = ConversionStats::default();
        let mut failures = Vec::new();

        for (i, feature) in features.iter().enumerate() {
            let index = i + 1;
            match self.map_feature(index, feature, entity) {
                Ok((record, converted)) => {
                    stats.record_success(converted.source, converted.fallback);
                    records.push(record);
                }
                Err(failure) => {
                    debug!(
                        index = failure.index,
                        stage = ?failure.stage,
                        error = %failure.message,
                        "Feature ignorée"
                    );
                    stats.record_failure();
                    failures.push(failure);
                }
            }
        }

        info!(
            kind = %kind,
            total = stats.total,
            success = stats.success,
            failed = stats.failed,
            fallback = stats.fallback,
            systems = ?stats.systems,
            "Conversion des coordonnées terminée"
        );

        if records.is_empty() {
            return Err(IngestError::NoValidFeatures {
                total: stats.total,
                failed: stats.failed,
            });
        }
        if stats.failed > 0 {
            warn!(failed = stats.failed, total = stats.total, "Des features ont été ignorées");
        }

        Ok(MappedBatch {
            count: records.len(),
            skipped: stats.failed,
            records,
            conversion_stats: stats,
            failures,
        })
    }

    /// Traite une feature; retourne l'enregistrement et le système détecté
    fn map_feature(
        &self,
        index: usize,
        feature: &Value,
        entity: &EntityConfig,
    ) -> Result<(EntityRecord, Converted), FeatureFailure> {
        let fail = |stage, message: String| FeatureFailure {
            index,
            stage,
            message,
        };

        let Some(feature) = feature.as_object() else {
            return Err(fail(FailureStage::Mapping, "la feature n'est pas un objet".to_string()));
        };

        let geometry = feature.get("geometry").unwrap_or(&Value::Null);
        let raw = extract_coordinates(geometry).ok_or_else(|| {
            fail(
                FailureStage::Extraction,
                "géométrie absente, non supportée ou mal formée".to_string(),
            )
        })?;

        let converted = convert_value(&self.detector, raw)
            .map_err(|e| fail(FailureStage::Conversion, e.to_string()))?;

        let empty = Map::new();
        let properties = match feature.get("properties") {
            Some(Value::Object(p)) => p,
            None | Some(Value::Null) => &empty,
            Some(other) => {
                return Err(fail(
                    FailureStage::Mapping,
                    format!("propriétés invalides: {}", other),
                ))
            }
        };

        let ctx = FieldContext {
            index,
            imported_at: self.options.imported_at,
        };

        let mut record = EntityRecord::new();
        for field in &entity.fields {
            record.insert(field.target.clone(), field.resolve(properties, &ctx));
        }
        record.insert("latitude".to_string(), Value::from(converted.latitude));
        record.insert("longitude".to_string(), Value::from(converted.longitude));

        Ok((record, converted))
    }
}

/// Vérifie la structure d'une FeatureCollection et retourne ses features
pub fn validate_collection(geojson: &Value) -> Result<&[Value], IngestError> {
    let Some(object) = geojson.as_object() else {
        return Err(IngestError::NotAnObject);
    };

    match object.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        other => {
            return Err(IngestError::NotFeatureCollection(
                other.unwrap_or("<absent>").to_string(),
            ))
        }
    }

    let Some(features) = object.get("features").and_then(Value::as_array) else {
        return Err(IngestError::FeaturesNotArray);
    };

    if features.is_empty() {
        return Err(IngestError::EmptyFeatures);
    }

    Ok(features)
}
