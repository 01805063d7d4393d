/// Free-text search over records.
///
/// A record matches when one of its string-valued fields contains the search
/// term. Non-string fields never match. For primitive collections the record's
/// own string value is searched.

use crate::error::{DataSourceError, Result};
use crate::record::Record;
use crate::value::Value;
use std::rc::Rc;

fn contains_term(value: &Value, term: &str, case_sensitive: bool) -> bool {
    match value.as_str() {
        Some(text) if case_sensitive => text.contains(term),
        Some(text) => text.to_lowercase().contains(term),
        None => false,
    }
}

fn any_field_contains(record: &Record, term: &str, case_sensitive: bool) -> bool {
    match record {
        Record::Primitive(value) => contains_term(value, term, case_sensitive),
        Record::Object { fields, .. } => fields
            .values()
            .any(|value| contains_term(value, term, case_sensitive)),
    }
}

fn named_field_contains<S: AsRef<str>>(
    record: &Record,
    fields: Option<&[S]>,
    term: &str,
    case_sensitive: bool,
) -> bool {
    match (record, fields) {
        (Record::Primitive(value), _) => contains_term(value, term, case_sensitive),
        (Record::Object { .. }, Some(fields)) => fields
            .iter()
            .any(|field| contains_term(record.field_value(field.as_ref()), term, case_sensitive)),
        (Record::Object { .. }, None) => false,
    }
}

fn normalize_term(term: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        term.to_string()
    } else {
        term.to_lowercase()
    }
}

/// Keeps records where any string field contains `term`.
pub fn search_records(records: &[Rc<Record>], term: &str, case_sensitive: bool) -> Vec<Rc<Record>> {
    let term = normalize_term(term, case_sensitive);

    records
        .iter()
        .filter(|record| any_field_contains(record, &term, case_sensitive))
        .cloned()
        .collect()
}

/// Keeps records where one of the named string fields contains `term`.
///
/// Without `fields`, only primitive collections can be searched; object
/// records produce `DataSourceError::MissingSearchFields`.
pub fn search_records_by_field<S: AsRef<str>>(
    records: &[Rc<Record>],
    term: &str,
    fields: Option<&[S]>,
    case_sensitive: bool,
) -> Result<Vec<Rc<Record>>> {
    if fields.is_none() && records.iter().any(|r| r.is_object()) {
        return Err(DataSourceError::MissingSearchFields);
    }

    let term = normalize_term(term, case_sensitive);

    Ok(records
        .iter()
        .filter(|record| named_field_contains(record, fields, &term, case_sensitive))
        .cloned()
        .collect())
}
