//! Types d'erreurs pour l'import

use thiserror::Error;

/// Erreurs remontées à l'appelant d'un import
///
/// Les erreurs propres à une feature (géométrie mal formée, conversion
/// impossible) ne sortent jamais du mapper: elles sont comptées dans les
/// statistiques.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Le document n'est pas un objet JSON
    #[error("Données GeoJSON invalides: un objet est attendu")]
    NotAnObject,

    /// Le type racine n'est pas FeatureCollection
    #[error("Le GeoJSON doit être de type FeatureCollection (reçu: {0})")]
    NotFeatureCollection(String),

    /// Le champ features est absent ou n'est pas un tableau
    #[error("Le GeoJSON doit contenir un tableau 'features'")]
    FeaturesNotArray,

    /// Le tableau features est vide
    #[error("Le fichier GeoJSON ne contient aucune feature")]
    EmptyFeatures,

    /// Aucune feature n'a survécu à l'extraction et à la conversion
    #[error("Aucune feature valide après conversion des coordonnées ({failed}/{total} en échec)")]
    NoValidFeatures { total: usize, failed: usize },

    /// Échec de l'insertion en base
    #[error("Erreur lors de l'insertion dans {table}: {source}")]
    Insert {
        table: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Erreur d'I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur de (dé)sérialisation JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IngestError {
    /// Crée une erreur d'insertion avec contexte
    pub fn insert(
        table: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Insert {
            table: table.into(),
            source: source.into(),
        }
    }

    /// Vrai pour les erreurs de structure détectées avant tout traitement
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::NotAnObject
                | Self::NotFeatureCollection(_)
                | Self::FeaturesNotArray
                | Self::EmptyFeatures
        )
    }
}
