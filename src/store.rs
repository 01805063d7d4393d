/// Record store: the raw, ordered record sequence owned by a data source.
///
/// The store is replaced wholesale; there is no per-record insert or delete.
/// On every replacement each object record is stamped with a row id equal to
/// its position in the incoming sequence.
///
/// # Examples
///
/// ```
/// use gridsource::{Record, RecordStore};
///
/// let mut store = RecordStore::new();
/// store.set_data(vec![
///     Record::object([("name", "Alice")]),
///     Record::object([("name", "Bob")]),
/// ]);
///
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.records()[1].row_id(), Some(1));
/// ```

use crate::error::{DataSourceError, Result};
use crate::record::Record;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Rc<Record>>,
}

impl RecordStore {
    pub fn new() -> Self {
        RecordStore { records: Vec::new() }
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let mut store = RecordStore::new();
        store.set_data(records);
        store
    }

    /// Builds a store from a JSON array. Object elements become object
    /// records; any other element becomes a primitive record.
    ///
    /// ```
    /// use gridsource::RecordStore;
    ///
    /// let store = RecordStore::from_json(r#"[{"id": 1}, {"id": 2}]"#).unwrap();
    /// assert_eq!(store.len(), 2);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(RecordStore::from_records(parse_json_records(json)?))
    }

    /// Replaces the stored sequence and stamps row ids.
    pub fn set_data(&mut self, records: Vec<Record>) {
        self.records = records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                record.set_row_id(index);
                Rc::new(record)
            })
            .collect();
    }

    pub fn records(&self) -> &[Rc<Record>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by the row id stamped at ingestion.
    pub fn get(&self, row_id: usize) -> Option<&Rc<Record>> {
        self.records
            .get(row_id)
            .filter(|record| record.row_id() == Some(row_id))
    }

    /// True when the collection holds primitives rather than objects.
    pub fn is_primitive(&self) -> bool {
        self.records.first().map_or(false, |r| r.is_primitive())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}

/// Parses a JSON array into unstamped records.
pub fn parse_json_records(json: &str) -> Result<Vec<Record>> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    match parsed {
        serde_json::Value::Array(items) => Ok(items.iter().map(Record::from_json_value).collect()),
        serde_json::Value::Object(_) => Err(DataSourceError::NotAnArray("object")),
        serde_json::Value::String(_) => Err(DataSourceError::NotAnArray("string")),
        serde_json::Value::Number(_) => Err(DataSourceError::NotAnArray("number")),
        serde_json::Value::Bool(_) => Err(DataSourceError::NotAnArray("boolean")),
        serde_json::Value::Null => Err(DataSourceError::NotAnArray("null")),
    }
}
