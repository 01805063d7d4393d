/// Field values stored in records.
///
/// A `Value` is dynamically typed, like the cells a grid displays. Two sets of
/// comparison rules apply:
///
/// - Filter predicates use *loose* rules (`loose_eq`, `loose_lt`, ...): strings
///   and numbers coerce to numbers when compared with each other, booleans
///   coerce to 0/1 and null only equals null. An incomparable pair (for
///   example `"abc" < 3`) is simply false.
/// - Sorting uses `sort_cmp`, a total order, because slice sorting needs one.
///   Numbers compare numerically across integer and float, strings compare
///   lexically, and values of different kinds are ranked
///   null < bool < number < string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric coercion used by loose comparisons.
    ///
    /// Null is 0, booleans are 0/1, blank strings are 0 and strings that are
    /// not numbers are NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Int(v) => *v as f64,
            Value::Float(v) => *v,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Null => 0.0,
            Value::String(s) => parse_number(s),
        }
    }

    /// Lower-cases string values; other kinds are returned unchanged.
    pub fn to_lowercase(&self) -> Value {
        match self {
            Value::String(s) => Value::String(s.to_lowercase()),
            other => other.clone(),
        }
    }

    /// Loose equality: `1 == "1"`, `true == 1`, `null == null`.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(_), _) => Value::Float(self.to_number()).loose_eq(other),
            (_, Value::Bool(_)) => self.loose_eq(&Value::Float(other.to_number())),
            _ => self.to_number() == other.to_number(),
        }
    }

    pub fn loose_ne(&self, other: &Value) -> bool {
        !self.loose_eq(other)
    }

    pub fn loose_lt(&self, other: &Value) -> bool {
        self.relational(other).unwrap_or(false)
    }

    pub fn loose_gt(&self, other: &Value) -> bool {
        other.relational(self).unwrap_or(false)
    }

    pub fn loose_le(&self, other: &Value) -> bool {
        other.relational(self).map(|gt| !gt).unwrap_or(false)
    }

    pub fn loose_ge(&self, other: &Value) -> bool {
        self.relational(other).map(|lt| !lt).unwrap_or(false)
    }

    /// `Some(self < other)`, or `None` when the pair is incomparable (NaN).
    fn relational(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a < b),
            (Value::Int(a), Value::Int(b)) => Some(a < b),
            _ => {
                let a = self.to_number();
                let b = other.to_number();
                if a.is_nan() || b.is_nan() {
                    None
                } else {
                    Some(a < b)
                }
            }
        }
    }

    /// Total order used by the sort engine.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b)),
            (Value::Int(a), Value::Float(b)) => cmp_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
        }
    }
}

/// Exact integer/float ordering. Widening the integer to `f64` would round
/// values above 2^53 and break transitivity.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63, the first float above every i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() {
        return (i as f64).total_cmp(&f);
    }
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        ordering => ordering,
    }
}

fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust accepts "inf"/"nan" spellings that are not numbers in a grid cell.
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Normalised float bits: both zeros hash alike and every NaN is one key.
fn float_key(f: f64) -> u64 {
    if f == 0.0 {
        0.0f64.to_bits()
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_key(*a) == float_key(*b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind_rank().hash(state);
        match self {
            Value::Int(v) => v.hash(state),
            Value::Float(v) => float_key(*v).hash(state),
            Value::String(v) => v.hash(state),
            Value::Bool(v) => v.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) if v.is_infinite() => {
                write!(f, "{}", if *v > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Float(v) if v.is_nan() => write!(f, "NaN"),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Null => write!(f, "null"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Value::Float(_) | Value::Null => serializer.serialize_unit(),
            Value::String(v) => serializer.serialize_str(v),
            Value::Bool(v) => serializer.serialize_bool(*v),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from(&json))
    }
}

impl From<&serde_json::Value> for Value {
    /// Nested arrays and objects are kept as their JSON text.
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            nested => Value::String(nested.to_string()),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_eq_coerces_numbers_and_strings() {
        assert!(Value::from(1).loose_eq(&Value::from("1")));
        assert!(Value::from("2.5").loose_eq(&Value::from(2.5)));
        assert!(Value::from(true).loose_eq(&Value::from(1)));
        assert!(Value::from(false).loose_eq(&Value::from("0")));
        assert!(!Value::from("a").loose_eq(&Value::from(0)));
    }

    #[test]
    fn test_null_only_equals_null() {
        assert!(Value::Null.loose_eq(&Value::Null));
        assert!(!Value::Null.loose_eq(&Value::from(0)));
        assert!(!Value::from("").loose_eq(&Value::Null));
        assert!(Value::from(0).loose_ne(&Value::Null));
    }

    #[test]
    fn test_relational_comparisons() {
        assert!(Value::from(2).loose_lt(&Value::from(3)));
        assert!(Value::from("10").loose_gt(&Value::from(9)));
        // Two strings compare lexically, not numerically
        assert!(Value::from("10").loose_lt(&Value::from("9")));
        assert!(Value::from(3).loose_ge(&Value::from(3.0)));
        assert!(Value::from(3).loose_le(&Value::from("3")));
    }

    #[test]
    fn test_incomparable_pairs_are_false() {
        let word = Value::from("abc");
        let three = Value::from(3);
        assert!(!word.loose_lt(&three));
        assert!(!word.loose_gt(&three));
        assert!(!word.loose_le(&three));
        assert!(!word.loose_ge(&three));
    }

    #[test]
    fn test_sort_cmp_int_float_exact() {
        let below = Value::Int(i64::MAX - 1);
        let top = Value::Float(i64::MAX as f64);
        let max = Value::Int(i64::MAX);

        assert_eq!(below.sort_cmp(&top), Ordering::Less);
        assert_eq!(max.sort_cmp(&top), Ordering::Less);
        assert_eq!(top.sort_cmp(&max), Ordering::Greater);
        assert_eq!(below.sort_cmp(&max), Ordering::Less);

        assert_eq!(Value::Int(1).sort_cmp(&Value::Float(1.0)), Ordering::Equal);
        assert_eq!(Value::Int(0).sort_cmp(&Value::Float(-0.0)), Ordering::Equal);
        assert_eq!(Value::Int(1).sort_cmp(&Value::Float(1.5)), Ordering::Less);
        assert_eq!(Value::Int(-1).sort_cmp(&Value::Float(-1.5)), Ordering::Greater);
        assert_eq!(Value::Float(f64::NEG_INFINITY).sort_cmp(&Value::Int(i64::MIN)), Ordering::Less);
    }

    #[test]
    fn test_sort_cmp_is_total() {
        let mut values = vec![
            Value::from("b"),
            Value::from(2.5),
            Value::Null,
            Value::from(1),
            Value::from(true),
            Value::from("a"),
            Value::Float(f64::NAN),
        ];
        values.sort_by(|a, b| a.sort_cmp(b));

        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Bool(true));
        assert_eq!(values[2], Value::Int(1));
        assert_eq!(values[3], Value::Float(2.5));
        assert!(values[4].as_f64().unwrap().is_nan());
        assert_eq!(values[5], Value::from("a"));
        assert_eq!(values[6], Value::from("b"));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::from(" 42 ").to_number(), 42.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::from("1e3").to_number(), 1000.0);
        assert!(Value::from("inf").to_number().is_nan());
        assert_eq!(Value::from("-Infinity").to_number(), f64::NEG_INFINITY);
        assert_eq!(Value::Null.to_number(), 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(3.0).to_string(), "3");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "Infinity");
    }

    #[test]
    fn test_hash_key_equality() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Value::Float(0.0));
        set.insert(Value::Float(-0.0));
        set.insert(Value::Float(f64::NAN));
        set.insert(Value::Float(f64::NAN));
        set.insert(Value::Int(0));
        assert_eq!(set.len(), 3);
    }
}
