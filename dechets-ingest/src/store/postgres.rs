//! Insertion des enregistrements dans PostgreSQL
//!
//! Un lot est envoyé en un seul paramètre JSONB et déplié côté serveur avec
//! `jsonb_populate_recordset`: les conversions de type (timestamp, numeric)
//! sont faites par PostgreSQL d'après la définition de la table.

use std::future::Future;

use deadpool_postgres::Pool;
use tokio_postgres::types::Json;
use tracing::{debug, info};

use crate::entity::EntityRecord;
use crate::store::RecordSink;
use crate::IngestError;

/// Destination PostgreSQL
#[derive(Clone)]
pub struct PgSink {
    pool: Pool,
    schema: String,
}

impl PgSink {
    pub fn new(pool: Pool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    async fn insert_batch(&self, table: &str, records: &[EntityRecord]) -> Result<usize, IngestError> {
        let Some(sql) = insert_statement(&self.schema, table, records) else {
            return Ok(0);
        };
        debug!(sql = %sql, "Requête d'insertion");

        let mut client = self
            .pool
            .get()
            .await
            .map_err(|e| IngestError::insert(table, e))?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| IngestError::insert(table, e))?;

        let inserted = tx
            .execute(sql.as_str(), &[&Json(records)])
            .await
            .map_err(|e| IngestError::insert(table, e))?;

        tx.commit().await.map_err(|e| IngestError::insert(table, e))?;

        info!(schema = %self.schema, table, inserted, "Lot inséré");
        Ok(inserted as usize)
    }
}

impl RecordSink for PgSink {
    fn insert(
        &self,
        table: &str,
        records: &[EntityRecord],
    ) -> impl Future<Output = Result<usize, IngestError>> + Send {
        self.insert_batch(table, records)
    }
}

/// Requête `INSERT ... SELECT ... FROM jsonb_populate_recordset(...)`
///
/// Les colonnes sont celles du premier enregistrement (le mapper produit des
/// enregistrements homogènes). `None` pour un lot vide.
pub fn insert_statement(schema: &str, table: &str, records: &[EntityRecord]) -> Option<String> {
    let first = records.first()?;
    let columns = first
        .keys()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let qualified = format!("{}.{}", quote_ident(schema), quote_ident(table));

    Some(format!(
        "INSERT INTO {qualified} ({columns}) SELECT {columns} FROM jsonb_populate_recordset(NULL::{qualified}, $1)"
    ))
}

/// Identifiant SQL entre guillemets
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_statement() {
        let record = json!({ "name": "Bac 1", "status": "active", "latitude": 14.69, "longitude": -17.44 });
        let records = vec![record.as_object().cloned().unwrap()];

        let sql = insert_statement("public", "collection_points", &records).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO \"public\".\"collection_points\" (\"latitude\", \"longitude\", \"name\", \"status\") \
             SELECT \"latitude\", \"longitude\", \"name\", \"status\" \
             FROM jsonb_populate_recordset(NULL::\"public\".\"collection_points\", $1)"
        );
    }

    #[test]
    fn test_insert_statement_empty() {
        assert!(insert_statement("public", "collection_points", &[]).is_none());
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("type"), "\"type\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
