//! Types d'erreurs pour le crate crs-sn

use thiserror::Error;

/// Erreurs pouvant survenir lors de la conversion d'une coordonnée
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrsError {
    /// Coordonnée d'entrée inutilisable (non numérique, non finie, incomplète)
    #[error("Coordonnées invalides: {0}")]
    InvalidCoordinate(String),

    /// Résultat de la reprojection hors de la zone attendue
    #[error("Coordonnées hors du Sénégal: [{lon:.2}, {lat:.2}]")]
    OutOfRegion { lon: f64, lat: f64 },

    /// Échec du calcul de projection
    #[error("Erreur de projection {crs}: {reason}")]
    Projection { crs: String, reason: String },

    /// Définition de projection non reconnue
    #[error("Définition de projection non supportée: {0}")]
    UnsupportedDefinition(String),
}

impl CrsError {
    /// Crée une erreur de coordonnée invalide
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidCoordinate(reason.into())
    }

    /// Crée une erreur de projection avec contexte
    pub fn projection(crs: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Projection {
            crs: crs.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_region_message() {
        let err = CrsError::OutOfRegion {
            lon: -12.23456,
            lat: 17.18999,
        };
        assert_eq!(err.to_string(), "Coordonnées hors du Sénégal: [-12.23, 17.19]");
    }
}
