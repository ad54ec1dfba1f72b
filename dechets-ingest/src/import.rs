//! Enchaînement mapping puis insertion, résumé dans un rapport

use std::time::Instant;

use serde_json::Value;
use tracing::{error, info};

use crate::entity::EntityKind;
use crate::mapper::{FeatureMapper, MappedBatch};
use crate::report::ImportReport;
use crate::store::RecordSink;

/// Importe une FeatureCollection dans `sink`
///
/// Toute erreur (structure, lot vide, insertion) est consignée dans le
/// rapport: l'appelant n'a qu'un message à afficher. Le lot mappé est
/// retourné quand le mapping a réussi, même si l'insertion a échoué.
pub async fn import_collection<S: RecordSink>(
    mapper: &FeatureMapper<'_>,
    sink: &S,
    geojson: &Value,
    kind: EntityKind,
    source: &str,
) -> (ImportReport, Option<MappedBatch>) {
    let start = Instant::now();
    let table = mapper.config().entity(kind).table.clone();
    let mut report = ImportReport::new(source, kind, &table);

    let batch = match mapper.map(geojson, kind) {
        Ok(batch) => batch,
        Err(e) => {
            error!(source, kind = %kind, error = %e, "Échec du mapping");
            report.record_fatal(&e.to_string());
            report.set_duration(start.elapsed());
            report.finalize();
            return (report, None);
        }
    };

    report.record_batch(batch.conversion_stats.clone(), batch.count, batch.failures.clone());

    match sink.insert(&table, &batch.records).await {
        Ok(inserted) => {
            report.record_insert(inserted);
            info!(table = %table, inserted, skipped = batch.skipped, "Import terminé");
        }
        Err(e) => {
            error!(table = %table, error = %e, "Échec de l'insertion");
            report.record_fatal(&e.to_string());
        }
    }

    report.set_duration(start.elapsed());
    report.finalize();
    (report, Some(batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entity::EntityRecord;
    use crate::report::ImportStatus;
    use crate::IngestError;
    use crs_sn::{Catalogue, CrsDetector};
    use serde_json::json;
    use std::future::Future;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink {
        rows: Mutex<Vec<(String, EntityRecord)>>,
        fail: bool,
    }

    impl RecordSink for MemorySink {
        fn insert(
            &self,
            table: &str,
            records: &[EntityRecord],
        ) -> impl Future<Output = Result<usize, IngestError>> + Send {
            let result = if self.fail {
                Err(IngestError::insert(table, "connexion refusée"))
            } else {
                let mut rows = self.rows.lock().unwrap();
                rows.extend(records.iter().map(|r| (table.to_string(), r.clone())));
                Ok(records.len())
            };
            async move { result }
        }
    }

    fn collection() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [-17.44, 14.69] }, "properties": { "nom": "Bac 1" } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [300000.0, 1630000.0] }, "properties": {} },
                { "type": "Feature", "geometry": { "type": "GeometryCollection", "geometries": [] }, "properties": {} }
            ]
        })
    }

    #[tokio::test]
    async fn test_import_partial_success() {
        let catalogue = Catalogue::senegal().unwrap();
        let config = Config::from_preset("default").unwrap();
        let mapper = FeatureMapper::new(CrsDetector::new(&catalogue), &config);
        let sink = MemorySink::default();

        let (report, batch) =
            import_collection(&mapper, &sink, &collection(), EntityKind::CollectionPoint, "test.geojson").await;

        assert_eq!(report.status, ImportStatus::PartialSuccess);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.conversion.failed, 1);
        assert_eq!(batch.unwrap().count, 2);

        let rows = sink.rows.lock().unwrap();
        assert!(rows.iter().all(|(table, _)| table == "collection_points"));
        assert_eq!(rows[0].1["name"], "Bac 1");
    }

    #[tokio::test]
    async fn test_import_insert_failure() {
        let catalogue = Catalogue::senegal().unwrap();
        let config = Config::from_preset("default").unwrap();
        let mapper = FeatureMapper::new(CrsDetector::new(&catalogue), &config);
        let sink = MemorySink {
            fail: true,
            ..Default::default()
        };

        let (report, batch) =
            import_collection(&mapper, &sink, &collection(), EntityKind::UrbanFurniture, "test.geojson").await;

        assert_eq!(report.status, ImportStatus::Failed);
        assert!(batch.is_some());
        assert!(report
            .summary()
            .contains("Erreur lors de l'insertion dans urban_furniture"));
    }

    #[tokio::test]
    async fn test_import_structural_error() {
        let catalogue = Catalogue::senegal().unwrap();
        let config = Config::from_preset("default").unwrap();
        let mapper = FeatureMapper::new(CrsDetector::new(&catalogue), &config);
        let sink = MemorySink::default();

        let (report, batch) = import_collection(
            &mapper,
            &sink,
            &json!({ "type": "FeatureCollection", "features": [] }),
            EntityKind::SweepingRoute,
            "vide.geojson",
        )
        .await;

        assert!(batch.is_none());
        assert_eq!(report.status, ImportStatus::Failed);
        assert_eq!(
            report.error.as_deref(),
            Some("Le fichier GeoJSON ne contient aucune feature")
        );
        assert!(sink.rows.lock().unwrap().is_empty());
    }
}
