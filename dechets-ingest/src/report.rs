//! Statistiques de conversion et rapport d'import
//!
//! Les échecs par feature ne sont jamais remontés comme erreurs: ils sont
//! comptés ici et détaillés dans les logs et le rapport JSON.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::entity::EntityKind;

/// Statistiques de conversion d'un lot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Nombre de features traitées
    pub total: usize,
    /// Features converties avec succès
    pub success: usize,
    /// Features en échec (extraction ou conversion)
    pub failed: usize,
    /// Features converties avec le système par défaut, faute de plage reconnue
    pub fallback: usize,
    /// Nombre de features par système détecté
    pub systems: BTreeMap<String, usize>,
}

impl ConversionStats {
    /// Enregistre une feature convertie depuis `system`
    pub fn record_success(&mut self, system: &str, fallback: bool) {
        self.total += 1;
        self.success += 1;
        if fallback {
            self.fallback += 1;
        }
        *self.systems.entry(system.to_string()).or_default() += 1;
    }

    /// Enregistre une feature en échec
    pub fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }
}

/// Étape à laquelle une feature a échoué
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Géométrie absente, non supportée ou mal formée
    Extraction,
    /// Coordonnée invalide, hors emprise ou erreur de projection
    Conversion,
    /// Feature inexploitable (pas un objet, propriétés invalides)
    Mapping,
}

/// Diagnostic d'une feature rejetée
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFailure {
    /// Rang de la feature (1-based)
    pub index: usize,
    pub stage: FailureStage,
    pub message: String,
}

/// Statut global de l'import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportStatus {
    /// Toutes les features ont été importées
    Success,
    /// Import réussi avec des features rejetées
    PartialSuccess,
    /// Import échoué
    Failed,
}

/// Rapport complet d'un import
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Fichier source
    pub source: String,
    /// Type d'entité importé
    pub kind: EntityKind,
    /// Table cible
    pub table: String,
    /// Durée de l'import
    pub duration_secs: f64,
    /// Statut global
    pub status: ImportStatus,
    /// Statistiques de conversion
    pub conversion: ConversionStats,
    /// Nombre d'enregistrements produits
    pub records: usize,
    /// Nombre d'enregistrements insérés (ou écrits)
    pub inserted: usize,
    /// Features rejetées
    pub failures: Vec<FeatureFailure>,
    /// Erreur fatale éventuelle
    pub error: Option<String>,
}

impl ImportReport {
    /// Crée un rapport vide
    pub fn new(source: &str, kind: EntityKind, table: &str) -> Self {
        Self {
            source: source.to_string(),
            kind,
            table: table.to_string(),
            duration_secs: 0.0,
            status: ImportStatus::Success,
            conversion: ConversionStats::default(),
            records: 0,
            inserted: 0,
            failures: Vec::new(),
            error: None,
        }
    }

    /// Enregistre le résultat du mapping
    pub fn record_batch(&mut self, conversion: ConversionStats, records: usize, failures: Vec<FeatureFailure>) {
        self.conversion = conversion;
        self.records = records;
        self.failures = failures;
    }

    /// Enregistre les enregistrements insérés
    pub fn record_insert(&mut self, count: usize) {
        self.inserted += count;
    }

    /// Enregistre une erreur fatale
    pub fn record_fatal(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    /// Définit la durée de l'import
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.error.is_some() || self.records == 0 {
            ImportStatus::Failed
        } else if self.conversion.failed > 0 {
            ImportStatus::PartialSuccess
        } else {
            ImportStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("IMPORT REPORT - {} ({})", self.source, self.kind);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Table: {}", self.table);

        println!("\n--- CONVERSION ---");
        println!(
            "Features: {} total, {} converted, {} failed",
            self.conversion.total, self.conversion.success, self.conversion.failed
        );
        for (system, count) in &self.conversion.systems {
            println!("  {}: {}", system, count);
        }
        if self.conversion.fallback > 0 {
            println!("  dont {} par défaut (système non reconnu)", self.conversion.fallback);
        }
        println!("Records: {} produced, {} inserted", self.records, self.inserted);

        if !self.failures.is_empty() {
            println!("\n--- FAILURES ({}) ---", self.failures.len());
            for f in self.failures.iter().take(20) {
                println!("  #{} {:?}: {}", f.index, f.stage, f.message);
            }
            if self.failures.len() > 20 {
                println!("  ... and {} more", self.failures.len() - 20);
            }
        }

        if let Some(ref error) = self.error {
            println!("\n--- ERROR ---");
            println!("  {}", error);
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Message unique affiché à l'utilisateur
    pub fn summary(&self) -> String {
        match (&self.error, self.status) {
            (Some(error), _) => format!("Échec de l'import: {}", error),
            (None, ImportStatus::PartialSuccess) => format!(
                "{} éléments importés dans {} ({} features ignorées)",
                self.inserted, self.table, self.conversion.failed
            ),
            (None, _) => format!("{} éléments importés dans {}", self.inserted, self.table),
        }
    }
}
