//! Types d'entités cibles de l'import

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Enregistrement prêt à être inséré (colonne -> valeur)
pub type EntityRecord = serde_json::Map<String, serde_json::Value>;

/// Type d'entité produit par l'import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Point de collecte (bac, conteneur)
    #[value(alias = "collection_point", alias = "point_collecte", alias = "point-collecte")]
    CollectionPoint,
    /// Mobilier urbain (corbeille, PRN...)
    #[value(alias = "urban_furniture", alias = "mobilier")]
    UrbanFurniture,
    /// Circuit de balayage
    #[value(alias = "sweeping_route", alias = "circuit_balayage", alias = "circuit-balayage")]
    SweepingRoute,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::CollectionPoint,
        EntityKind::UrbanFurniture,
        EntityKind::SweepingRoute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectionPoint => "collection_point",
            Self::UrbanFurniture => "urban_furniture",
            Self::SweepingRoute => "sweeping_route",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: &str) -> Result<EntityKind, String> {
        <EntityKind as ValueEnum>::from_str(value, true)
    }

    #[test]
    fn test_value_enum_names_and_aliases() {
        assert_eq!(parse("collection-point"), Ok(EntityKind::CollectionPoint));
        assert_eq!(parse("collection_point"), Ok(EntityKind::CollectionPoint));
        assert_eq!(parse("point_collecte"), Ok(EntityKind::CollectionPoint));
        assert_eq!(parse("Mobilier"), Ok(EntityKind::UrbanFurniture));
        assert_eq!(parse("urban_furniture"), Ok(EntityKind::UrbanFurniture));
        assert_eq!(parse("circuit_balayage"), Ok(EntityKind::SweepingRoute));
        assert_eq!(parse("sweeping-route"), Ok(EntityKind::SweepingRoute));
        assert!(parse("parcelle").is_err());
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&EntityKind::SweepingRoute).unwrap();
        assert_eq!(json, "\"sweeping_route\"");
        for kind in EntityKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }
}
