/// Sort engine: multi-key ordering of records.
///
/// A sort specification is an ordered list of keys. The first key is primary
/// and each later key only breaks ties left by the keys before it. A key may
/// carry a *primer*, a transform applied to both operands before they are
/// compared (for example parsing a date string into a day number).
///
/// Sorting is stable, so repeated sorts of the same input produce identical
/// output.

use crate::record::Record;
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Value transform applied before comparison.
pub type Primer = Rc<dyn Fn(&Value) -> Value>;

/// A single sort key: field, direction and optional primer.
#[derive(Clone)]
pub struct SortKey {
    pub field: String,
    /// Descending when true.
    pub reverse: bool,
    pub primer: Option<Primer>,
}

impl SortKey {
    pub fn new(field: impl Into<String>, reverse: bool) -> Self {
        SortKey {
            field: field.into(),
            reverse,
            primer: None,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        SortKey::new(field, false)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        SortKey::new(field, true)
    }

    pub fn with_primer<F>(mut self, primer: F) -> Self
    where
        F: Fn(&Value) -> Value + 'static,
    {
        self.primer = Some(Rc::new(primer));
        self
    }

    /// Compares one field of two records under this key.
    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let left = a.subject(&self.field);
        let right = b.subject(&self.field);

        let ordering = match &self.primer {
            Some(primer) => primer(left).sort_cmp(&primer(right)),
            None => left.sort_cmp(right),
        };

        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl fmt::Debug for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("field", &self.field)
            .field("reverse", &self.reverse)
            .field("primer", &self.primer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// A bare field name sorts ascending with no primer.
impl From<&str> for SortKey {
    fn from(field: &str) -> Self {
        SortKey::ascending(field)
    }
}

impl From<String> for SortKey {
    fn from(field: String) -> Self {
        SortKey::ascending(field)
    }
}

/// The active sort keys, at most one per field.
#[derive(Debug, Clone, Default)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new() -> Self {
        SortSpec { keys: Vec::new() }
    }

    /// Builds a spec from keys in priority order. A repeated field updates
    /// the direction of its first occurrence.
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = SortKey>,
    {
        let mut spec = SortSpec::new();
        for key in keys {
            spec.add(key);
        }
        spec
    }

    /// Appends `key`, or flips the direction of the existing key for the
    /// same field in place.
    pub fn add(&mut self, key: SortKey) {
        match self.keys.iter_mut().find(|k| k.field == key.field) {
            Some(existing) => existing.reverse = key.reverse,
            None => self.keys.push(key),
        }
    }

    /// Returns false when no key exists for `field`.
    pub fn remove(&mut self, field: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k.field != field);
        self.keys.len() != before
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn contains(&self, field: &str) -> bool {
        self.keys.iter().any(|k| k.field == field)
    }

    pub fn get(&self, field: &str) -> Option<&SortKey> {
        self.keys.iter().find(|k| k.field == field)
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Lexicographic comparison over `keys`; equal on every key is `Equal`.
pub fn compare_records(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let cmp = key.compare(a, b);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}

/// Sorts `records` in place by `keys`.
pub fn sort_records(records: &mut [Rc<Record>], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare_records(a, b, keys));
}

/// Ready-made primers for typed sorting of string columns.
pub mod primers {
    use crate::value::Value;

    /// Coerces to a number; text that is not numeric sorts as NaN.
    pub fn numeric(value: &Value) -> Value {
        match value {
            Value::Null => Value::Null,
            other => Value::Float(other.to_number()),
        }
    }

    pub fn lowercase(value: &Value) -> Value {
        value.to_lowercase()
    }

    /// Parses `YYYY-MM-DD` (optionally followed by a time part) into days
    /// since the Unix epoch. Unparseable values become null.
    pub fn date(value: &Value) -> Value {
        value
            .as_str()
            .and_then(|s| parse_date(s.get(..10).unwrap_or(s)))
            .map(|days| Value::Int(days as i64))
            .unwrap_or(Value::Null)
    }

    fn parse_date(s: &str) -> Option<i32> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return None;
        }
        let year: i32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let day: u32 = parts[2].parse().ok()?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }

        Some(days_from_ymd(year, month, day))
    }

    /// Days since 1970-01-01 (Howard Hinnant's civil calendar algorithm).
    fn days_from_ymd(year: i32, month: u32, day: u32) -> i32 {
        let y = if month <= 2 { year - 1 } else { year };
        let era = if y >= 0 { y / 400 } else { (y - 399) / 400 };
        let yoe = (y - era * 400) as u32;
        let doy = (153 * (if month > 2 { month - 3 } else { month + 9 }) + 2) / 5 + day - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        (era * 146097 + doe as i32) - 719468
    }
}
