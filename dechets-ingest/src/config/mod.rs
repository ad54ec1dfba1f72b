//! Configuration des tables cibles et des alias de propriétés

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;

/// Colonnes ajoutées par l'import, interdites comme cible de mapping
pub const RESERVED_COLUMNS: [&str; 2] = ["latitude", "longitude"];

/// Configuration principale: une entrée par type d'entité
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub collection_point: EntityConfig,
    pub urban_furniture: EntityConfig,
    pub sweeping_route: EntityConfig,
}

/// Configuration d'un type d'entité
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntityConfig {
    /// Nom de la table PostgreSQL cible
    pub table: String,

    /// Champs de l'enregistrement, dans l'ordre
    pub fields: Vec<FieldMapping>,
}

/// Mapping d'un champ cible vers une liste d'alias de propriétés
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldMapping {
    /// Nom de la colonne cible
    pub target: String,

    /// Clés de propriétés candidates, par ordre de priorité
    pub aliases: Vec<String>,

    /// Type de données
    #[serde(default)]
    pub data_type: DataType,

    /// Valeur par défaut si aucun alias ne correspond.
    /// `{index}` est remplacé par le rang (1-based) de la feature;
    /// `"now"` sur un champ timestamp donne la date d'import.
    #[serde(default)]
    pub default: serde_json::Value,
}

/// Type de données d'un champ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Text,
    Integer,
    Number,
    Timestamp,
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            _ => bail!("Unknown preset: {}. Use: default", preset),
        }
    }

    /// Preset embarqué ou chemin vers un fichier JSON
    pub fn from_spec(spec: &str) -> Result<Self> {
        let path = Path::new(spec);
        if path.extension().is_some_and(|ext| ext == "json") || path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(spec)
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse embedded config")?;
        config.validate()?;
        Ok(config)
    }

    /// Récupère la configuration d'un type d'entité
    pub fn entity(&self, kind: EntityKind) -> &EntityConfig {
        match kind {
            EntityKind::CollectionPoint => &self.collection_point,
            EntityKind::UrbanFurniture => &self.urban_furniture,
            EntityKind::SweepingRoute => &self.sweeping_route,
        }
    }

    /// Vérifie la cohérence des mappings
    pub fn validate(&self) -> Result<()> {
        for kind in EntityKind::ALL {
            let entity = self.entity(kind);
            if entity.table.trim().is_empty() {
                bail!("{}: table cible manquante", kind);
            }

            let mut targets = HashSet::new();
            for field in &entity.fields {
                if RESERVED_COLUMNS.contains(&field.target.as_str()) {
                    bail!("{}: la colonne '{}' est réservée", kind, field.target);
                }
                if !targets.insert(field.target.as_str()) {
                    bail!("{}: colonne '{}' définie deux fois", kind, field.target);
                }
                if field.aliases.is_empty() {
                    bail!("{}: aucun alias pour '{}'", kind, field.target);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_preset() {
        let config = Config::from_preset("default").unwrap();

        let cp = config.entity(EntityKind::CollectionPoint);
        assert_eq!(cp.table, "collection_points");
        let name = &cp.fields[0];
        assert_eq!(name.target, "name");
        assert_eq!(name.aliases, vec!["name", "nom", "NAME", "NOM"]);

        let capacity = cp.fields.iter().find(|f| f.target == "capacity_kg").unwrap();
        assert_eq!(capacity.data_type, DataType::Integer);
        assert_eq!(capacity.default, serde_json::json!(0));

        let route = config.entity(EntityKind::SweepingRoute);
        let code = route.fields.iter().find(|f| f.target == "code").unwrap();
        assert!(code.default.is_null());

        let furniture = config.entity(EntityKind::UrbanFurniture);
        let status = furniture.fields.iter().find(|f| f.target == "status").unwrap();
        assert_eq!(status.default, serde_json::json!("good"));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Config::from_preset("full").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut config = Config::from_preset("default").unwrap();
        config.collection_point.table = "bacs".to_string();

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{}", serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = Config::from_spec(file.path().to_str().unwrap()).unwrap();
        assert_eq!(loaded.entity(EntityKind::CollectionPoint).table, "bacs");
    }

    #[test]
    fn test_validate_rejects_reserved_column() {
        let mut config = Config::from_preset("default").unwrap();
        config.sweeping_route.fields.push(FieldMapping {
            target: "latitude".to_string(),
            aliases: vec!["lat".to_string()],
            data_type: DataType::Number,
            default: serde_json::Value::Null,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_target() {
        let mut config = Config::from_preset("default").unwrap();
        let dup = config.urban_furniture.fields[0].clone();
        config.urban_furniture.fields.push(dup);
        assert!(config.validate().is_err());
    }
}
