//! Résolution des champs depuis les propriétés d'une feature
//!
//! Chaque champ cible porte une liste ordonnée d'alias (casse, français,
//! anglais). Le premier alias présent, non nul et non vide l'emporte; sinon
//! la valeur par défaut du mapping est utilisée.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::config::{DataType, FieldMapping};

/// Contexte de résolution propre à une feature
#[derive(Debug, Clone, Copy)]
pub struct FieldContext {
    /// Rang de la feature dans la collection (1-based)
    pub index: usize,
    /// Date d'import, utilisée pour les défauts `"now"`
    pub imported_at: DateTime<Utc>,
}

/// Premier alias présent avec une valeur utilisable
pub fn first_alias<'a>(properties: &'a Map<String, Value>, aliases: &[String]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| properties.get(key))
        .find(|value| !is_empty(value))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

impl FieldMapping {
    /// Résout la valeur du champ pour une feature
    pub fn resolve(&self, properties: &Map<String, Value>, ctx: &FieldContext) -> Value {
        if let Some(raw) = first_alias(properties, &self.aliases) {
            match coerce(raw, self.data_type) {
                Some(value) => return value,
                None => debug!(
                    field = %self.target,
                    value = %raw,
                    data_type = ?self.data_type,
                    "Valeur non convertible, utilisation de la valeur par défaut"
                ),
            }
        }
        self.default_value(ctx)
    }

    /// Valeur par défaut, avec substitution de `{index}` et `"now"`
    pub fn default_value(&self, ctx: &FieldContext) -> Value {
        match &self.default {
            Value::String(s) if self.data_type == DataType::Timestamp && s == "now" => {
                Value::String(ctx.imported_at.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::String(s) if s.contains("{index}") => {
                Value::String(s.replace("{index}", &ctx.index.to_string()))
            }
            other => other.clone(),
        }
    }
}

/// Convertit une valeur brute vers le type du champ
fn coerce(raw: &Value, data_type: DataType) -> Option<Value> {
    match data_type {
        DataType::Text => match raw {
            Value::String(s) => Some(Value::String(s.trim().to_string())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        DataType::Integer => as_f64(raw).map(|v| Value::from(v.round() as i64)),
        DataType::Number => as_f64(raw).and_then(Number::from_f64).map(Value::Number),
        DataType::Timestamp => match raw {
            Value::String(s) => Some(Value::String(s.trim().to_string())),
            _ => None,
        },
    }
}

/// Lecture numérique tolérante (les CSV et shapefiles livrent souvent du texte)
fn as_f64(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}
