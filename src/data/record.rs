use serde_json::{Map, Value};
use std::sync::Arc;

/// One structured item: an ordered column name -> value mapping.
///
/// Records are shared, never mutated once fetched. Two lookups of the same
/// cached index hand out clones of the same `Arc`.
pub type Record = Arc<Map<String, Value>>;

/// The display-ordered values of a record
pub type Row = Vec<Value>;

/// Build a record from any JSON value.
///
/// Objects keep their key order; anything else is wrapped as `{"value": v}`
/// so that scalar streams still show up as a one-column table.
pub fn record_from_value(value: Value) -> Record {
    match value {
        Value::Object(map) => Arc::new(map),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Arc::new(map)
        }
    }
}

/// Build a record from ordered (column, value) pairs
pub fn record_from_pairs<K, I>(pairs: I) -> Record
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    Arc::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
}

pub fn row_of(record: &Record) -> Row {
    record.values().cloned().collect()
}

/// Text shown in a cell and searched by the text predicates
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::from("null"),
        _ => value.to_string(),
    }
}
