//! Destinations des enregistrements (PostgreSQL, fichiers)

pub mod geojson;
pub mod pool;
pub mod postgres;

use std::fs::File;
use std::future::Future;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::entity::EntityRecord;
use crate::IngestError;

pub use self::postgres::PgSink;

/// Destination d'un lot d'enregistrements
pub trait RecordSink {
    /// Insère un lot dans `table`; retourne le nombre d'enregistrements écrits
    fn insert(
        &self,
        table: &str,
        records: &[EntityRecord],
    ) -> impl Future<Output = Result<usize, IngestError>> + Send;
}

/// Écrit les enregistrements dans un fichier JSON (tableau)
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, records: &[EntityRecord]) -> Result<usize, IngestError> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
        Ok(records.len())
    }
}

impl RecordSink for JsonSink {
    fn insert(
        &self,
        table: &str,
        records: &[EntityRecord],
    ) -> impl Future<Output = Result<usize, IngestError>> + Send {
        let result = self.write(records);
        if result.is_ok() {
            info!(table, path = %self.path.display(), count = records.len(), "Enregistrements écrits");
        }
        async move { result }
    }
}
