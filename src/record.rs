/// Records held by the data source.
///
/// A record is either object-shaped (an ordered mapping of field name to
/// value) or a bare primitive. Object records carry a hidden row id that the
/// record store stamps at ingestion; it is the join key a grid uses to map a
/// rendered row back to its source record.

use crate::value::Value;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Property name under which the row id is serialised.
pub const ROW_ID_FIELD: &str = "_rowId";

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Object {
        row_id: Option<usize>,
        fields: IndexMap<String, Value>,
    },
    Primitive(Value),
}

impl Record {
    /// Creates an unstamped object record from `(field, value)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridsource::{Record, Value};
    ///
    /// let record = Record::object([("id", Value::from(1)), ("name", Value::from("Alice"))]);
    /// assert_eq!(record.get("name"), Some(&Value::from("Alice")));
    /// assert_eq!(record.row_id(), None);
    /// ```
    pub fn object<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Record::Object {
            row_id: None,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn primitive(value: impl Into<Value>) -> Self {
        Record::Primitive(value.into())
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Record::Object { .. })
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Record::Primitive(_))
    }

    pub fn row_id(&self) -> Option<usize> {
        match self {
            Record::Object { row_id, .. } => *row_id,
            Record::Primitive(_) => None,
        }
    }

    /// Stamps the row id. Primitive records have nowhere to hold one.
    pub(crate) fn set_row_id(&mut self, id: usize) {
        if let Record::Object { row_id, .. } = self {
            *row_id = Some(id);
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Record::Object { fields, .. } => fields.get(field),
            Record::Primitive(_) => None,
        }
    }

    /// Value of `field`, with missing fields (and every field of a primitive)
    /// reading as null.
    pub fn field_value(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.get(field).unwrap_or(&NULL)
    }

    /// The value field-based operations read: `field` of an object record, or
    /// the record itself for a primitive.
    pub fn subject(&self, field: &str) -> &Value {
        match self {
            Record::Primitive(value) => value,
            Record::Object { .. } => self.field_value(field),
        }
    }

    pub fn fields(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Record::Object { fields, .. } => Some(fields),
            Record::Primitive(_) => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&Value> {
        match self {
            Record::Primitive(value) => Some(value),
            Record::Object { .. } => None,
        }
    }

    /// Converts one element of a JSON array. Objects become object records,
    /// everything else becomes a primitive.
    pub fn from_json_value(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(obj) => Record::Object {
                row_id: None,
                fields: obj
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            },
            other => Record::Primitive(Value::from(other)),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Record::Primitive(value) => value.serialize(serializer),
            Record::Object { row_id, fields } => {
                let len = fields.len() + usize::from(row_id.is_some());
                let mut map = serializer.serialize_map(Some(len))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                if let Some(id) = row_id {
                    map.serialize_entry(ROW_ID_FIELD, id)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_record_access() {
        let record = Record::object([("id", Value::from(7)), ("dept", Value::from("A"))]);
        assert!(record.is_object());
        assert_eq!(record.get("id").and_then(Value::as_i64), Some(7));
        assert_eq!(record.field_value("missing"), &Value::Null);
        assert_eq!(record.fields().map(|f| f.len()), Some(2));
    }

    #[test]
    fn test_primitive_record_has_no_fields() {
        let mut record = Record::primitive("plain");
        record.set_row_id(4);
        assert!(record.is_primitive());
        assert_eq!(record.row_id(), None);
        assert_eq!(record.get("anything"), None);
        assert_eq!(record.as_primitive(), Some(&Value::from("plain")));
    }

    #[test]
    fn test_from_json_value() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"id": 1, "score": 2.5, "tags": ["x"], "ok": true}"#).unwrap();
        let record = Record::from_json_value(&json);

        assert_eq!(record.get("id"), Some(&Value::Int(1)));
        assert_eq!(record.get("score"), Some(&Value::Float(2.5)));
        assert_eq!(record.get("tags"), Some(&Value::from(r#"["x"]"#)));
        assert_eq!(record.get("ok"), Some(&Value::Bool(true)));

        let primitive = Record::from_json_value(&serde_json::json!("text"));
        assert_eq!(primitive, Record::primitive("text"));
    }

    #[test]
    fn test_serialize_includes_row_id() {
        let mut record = Record::object([("name", "Bob")]);
        record.set_row_id(3);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Bob");
        assert_eq!(json[ROW_ID_FIELD], 3);
    }
}
