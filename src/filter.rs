/// Filter engine: narrows records by clause chains bound to a field.
///
/// A `Filter` binds one or two clauses to a field. Each clause compares the
/// record's field value against the clause value with a `ComparisonOp`. The
/// logical connector stored on a clause governs how the *next* clause's result
/// combines with the running result:
///
/// ```text
/// [ {>= 2, and}, {< 5} ]   =>   (v >= 2) && (v < 5)
/// [ {= "a", or}, {= "b"} ] =>   (v == "a") || (v == "b")
/// [ {= "a"},     {= "b"} ] =>   (v == "b")          (no connector: result replaced)
/// ```
///
/// Several filters on different fields compose as an implicit AND; see
/// `FilterSet` and `apply_filter_set`.

use crate::error::DataSourceError;
use crate::record::Record;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Comparison operators usable in a filter clause.
///
/// `NotEqual` is the negation of `Equal`. String operators (`StartsWith`,
/// `EndsWith`, `Contains`) compare the display text of both operands and never
/// match a null field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[serde(rename = "=", alias = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "startsWith")]
    StartsWith,
    #[serde(rename = "endsWith")]
    EndsWith,
    #[serde(rename = "contains")]
    Contains,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 9] = [
        ComparisonOp::Equal,
        ComparisonOp::NotEqual,
        ComparisonOp::GreaterThan,
        ComparisonOp::GreaterOrEqual,
        ComparisonOp::LessThan,
        ComparisonOp::LessOrEqual,
        ComparisonOp::StartsWith,
        ComparisonOp::EndsWith,
        ComparisonOp::Contains,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterOrEqual => ">=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::StartsWith => "startsWith",
            ComparisonOp::EndsWith => "endsWith",
            ComparisonOp::Contains => "contains",
        }
    }

    /// Applies the operator to `(field_value, filter_value)`.
    pub fn evaluate(&self, field_value: &Value, filter_value: &Value) -> bool {
        match self {
            ComparisonOp::Equal => field_value.loose_eq(filter_value),
            ComparisonOp::NotEqual => field_value.loose_ne(filter_value),
            ComparisonOp::GreaterThan => field_value.loose_gt(filter_value),
            ComparisonOp::GreaterOrEqual => field_value.loose_ge(filter_value),
            ComparisonOp::LessThan => field_value.loose_lt(filter_value),
            ComparisonOp::LessOrEqual => field_value.loose_le(filter_value),
            ComparisonOp::StartsWith => {
                text_match(field_value, filter_value, |f, v| f.starts_with(v))
            }
            ComparisonOp::EndsWith => text_match(field_value, filter_value, |f, v| f.ends_with(v)),
            ComparisonOp::Contains => text_match(field_value, filter_value, |f, v| f.contains(v)),
        }
    }
}

fn text_match(field_value: &Value, filter_value: &Value, test: fn(&str, &str) -> bool) -> bool {
    if field_value.is_null() {
        return false;
    }
    test(&field_value.to_string(), &filter_value.to_string())
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOp {
    type Err = DataSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        match symbol {
            "==" => return Ok(ComparisonOp::Equal),
            "<>" => return Ok(ComparisonOp::NotEqual),
            _ => {}
        }
        ComparisonOp::ALL
            .iter()
            .find(|op| op.symbol().eq_ignore_ascii_case(symbol))
            .copied()
            .ok_or_else(|| DataSourceError::UnknownOperator(s.to_string()))
    }
}

/// How a clause combines with the clause that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalConnector {
    And,
    Or,
}

impl LogicalConnector {
    pub fn combine(&self, accumulated: bool, next: bool) -> bool {
        match self {
            LogicalConnector::And => accumulated && next,
            LogicalConnector::Or => accumulated || next,
        }
    }
}

impl FromStr for LogicalConnector {
    type Err = DataSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "and" | "&&" => Ok(LogicalConnector::And),
            "or" | "||" => Ok(LogicalConnector::Or),
            _ => Err(DataSourceError::UnknownConnector(s.to_string())),
        }
    }
}

/// One comparison test within a filter.
///
/// Deserializes from the flat `{"value", "symbol", "logicalConnector"}` shape
/// or with the operator nested as `{"value", "filterClause": {"symbol"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ClauseFields")]
pub struct FilterClause {
    pub value: Value,
    #[serde(rename = "symbol")]
    pub op: ComparisonOp,
    #[serde(rename = "logicalConnector", default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<LogicalConnector>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClauseFields {
    value: Value,
    #[serde(default)]
    symbol: Option<ComparisonOp>,
    #[serde(default)]
    logical_connector: Option<LogicalConnector>,
    #[serde(default)]
    filter_clause: Option<NestedClause>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NestedClause {
    #[serde(default)]
    symbol: Option<ComparisonOp>,
    #[serde(default)]
    logical_connector: Option<LogicalConnector>,
}

impl TryFrom<ClauseFields> for FilterClause {
    type Error = DataSourceError;

    fn try_from(fields: ClauseFields) -> Result<Self, Self::Error> {
        let (nested_op, nested_connector) = match fields.filter_clause {
            Some(nested) => (nested.symbol, nested.logical_connector),
            None => (None, None),
        };
        let op = nested_op
            .or(fields.symbol)
            .ok_or(DataSourceError::MissingOperator)?;

        Ok(FilterClause {
            value: fields.value,
            op,
            connector: nested_connector.or(fields.logical_connector),
        })
    }
}

impl FilterClause {
    pub fn new(op: ComparisonOp, value: impl Into<Value>) -> Self {
        FilterClause {
            value: value.into(),
            op,
            connector: None,
        }
    }

    /// Combine this clause with the next one using AND.
    pub fn and(mut self) -> Self {
        self.connector = Some(LogicalConnector::And);
        self
    }

    /// Combine this clause with the next one using OR.
    pub fn or(mut self) -> Self {
        self.connector = Some(LogicalConnector::Or);
        self
    }
}

/// A clause chain bound to a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub clauses: Vec<FilterClause>,
}

impl Filter {
    pub fn new(field: impl Into<String>, clauses: Vec<FilterClause>) -> Self {
        Filter {
            field: field.into(),
            clauses,
        }
    }

    pub fn matches(&self, record: &Record, case_sensitive: bool) -> bool {
        record_matches(record, &self.clauses, &self.field, case_sensitive)
    }
}

/// Registered filters keyed by field, in registration order.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: IndexMap<String, Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        FilterSet {
            filters: IndexMap::new(),
        }
    }

    /// Registers `filter`, replacing (in place) any filter on the same field.
    pub fn insert(&mut self, filter: Filter) {
        self.filters.insert(filter.field.clone(), filter);
    }

    /// Returns the removed filter, if one was registered for `field`.
    pub fn remove(&mut self, field: &str) -> Option<Filter> {
        self.filters.shift_remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&Filter> {
        self.filters.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.filters.contains_key(field)
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.values()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Evaluates a clause chain against one record. An empty chain matches.
pub fn record_matches(
    record: &Record,
    clauses: &[FilterClause],
    field: &str,
    case_sensitive: bool,
) -> bool {
    if clauses.is_empty() {
        return true;
    }

    let raw = record.subject(field);
    let lowered;
    let field_value = if !case_sensitive && raw.is_string() {
        lowered = raw.to_lowercase();
        &lowered
    } else {
        raw
    };

    let mut result = false;
    let mut previous: Option<&FilterClause> = None;

    for clause in clauses {
        let matched = if !case_sensitive && clause.value.is_string() {
            clause.op.evaluate(field_value, &clause.value.to_lowercase())
        } else {
            clause.op.evaluate(field_value, &clause.value)
        };

        result = match previous.and_then(|p| p.connector) {
            Some(connector) => connector.combine(result, matched),
            None => matched,
        };
        previous = Some(clause);
    }

    result
}

/// Keeps the records whose `field` satisfies the clause chain, preserving
/// input order.
pub fn filter_records(
    records: &[Rc<Record>],
    clauses: &[FilterClause],
    field: &str,
    case_sensitive: bool,
) -> Vec<Rc<Record>> {
    records
        .iter()
        .filter(|record| record_matches(record, clauses, field, case_sensitive))
        .cloned()
        .collect()
}

/// Narrows `records` through every filter in `filters`, in registration order.
pub fn apply_filter_set(
    records: &[Rc<Record>],
    filters: &FilterSet,
    case_sensitive: bool,
) -> Vec<Rc<Record>> {
    let mut current = records.to_vec();
    for filter in filters.iter() {
        current = filter_records(&current, &filter.clauses, &filter.field, case_sensitive);
        log::trace!("filter on '{}' kept {} records", filter.field, current.len());
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Vec<Rc<Record>> {
        [("Alice", 30, "Sales"), ("bob", 25, "Ops"), ("Carol", 41, "Sales"), ("Dave", 35, "Ops")]
            .iter()
            .map(|(name, age, dept)| {
                Rc::new(Record::object([
                    ("name", Value::from(*name)),
                    ("age", Value::from(*age)),
                    ("dept", Value::from(*dept)),
                ]))
            })
            .collect()
    }

    fn names(records: &[Rc<Record>]) -> Vec<String> {
        records.iter().map(|r| r.field_value("name").to_string()).collect()
    }

    #[test]
    fn test_operators() {
        let five = Value::from(5);
        assert!(ComparisonOp::Equal.evaluate(&five, &Value::from("5")));
        assert!(ComparisonOp::NotEqual.evaluate(&five, &Value::from(6)));
        assert!(!ComparisonOp::NotEqual.evaluate(&five, &Value::from(5)));
        assert!(ComparisonOp::GreaterThan.evaluate(&five, &Value::from(4)));
        assert!(ComparisonOp::GreaterOrEqual.evaluate(&five, &Value::from(5)));
        assert!(ComparisonOp::LessThan.evaluate(&five, &Value::from(5.5)));
        assert!(ComparisonOp::LessOrEqual.evaluate(&five, &Value::from(5)));

        let text = Value::from("grid view");
        assert!(ComparisonOp::StartsWith.evaluate(&text, &Value::from("grid")));
        assert!(ComparisonOp::EndsWith.evaluate(&text, &Value::from("view")));
        assert!(ComparisonOp::Contains.evaluate(&text, &Value::from("d v")));
        assert!(ComparisonOp::Contains.evaluate(&Value::from(1234), &Value::from(23)));
        assert!(!ComparisonOp::Contains.evaluate(&Value::Null, &Value::from("null")));
    }

    #[test]
    fn test_not_equal_is_true_inequality() {
        // "abc" starts with "a" but is not equal to it
        assert!(ComparisonOp::NotEqual.evaluate(&Value::from("abc"), &Value::from("a")));
        assert!(!ComparisonOp::NotEqual.evaluate(&Value::from("abc"), &Value::from("abc")));
    }

    #[test]
    fn test_parse_operator() {
        assert_eq!(">=".parse::<ComparisonOp>().unwrap(), ComparisonOp::GreaterOrEqual);
        assert_eq!("==".parse::<ComparisonOp>().unwrap(), ComparisonOp::Equal);
        assert_eq!("StartsWith".parse::<ComparisonOp>().unwrap(), ComparisonOp::StartsWith);
        assert!(matches!(
            "~".parse::<ComparisonOp>(),
            Err(DataSourceError::UnknownOperator(_))
        ));
        assert_eq!("OR".parse::<LogicalConnector>().unwrap(), LogicalConnector::Or);
        assert!("xor".parse::<LogicalConnector>().is_err());
    }

    #[test]
    fn test_single_clause_filter() {
        let result = filter_records(
            &people(),
            &[FilterClause::new(ComparisonOp::GreaterOrEqual, 35)],
            "age",
            false,
        );
        assert_eq!(names(&result), vec!["Carol", "Dave"]);
    }

    #[test]
    fn test_and_connector() {
        let clauses = vec![
            FilterClause::new(ComparisonOp::GreaterThan, 26).and(),
            FilterClause::new(ComparisonOp::LessThan, 40),
        ];
        let result = filter_records(&people(), &clauses, "age", false);
        assert_eq!(names(&result), vec!["Alice", "Dave"]);
    }

    #[test]
    fn test_or_connector() {
        let clauses = vec![
            FilterClause::new(ComparisonOp::Equal, "alice").or(),
            FilterClause::new(ComparisonOp::Equal, "dave"),
        ];
        let result = filter_records(&people(), &clauses, "name", false);
        assert_eq!(names(&result), vec!["Alice", "Dave"]);
    }

    #[test]
    fn test_missing_connector_replaces_result() {
        let clauses = vec![
            FilterClause::new(ComparisonOp::Equal, "Alice"),
            FilterClause::new(ComparisonOp::Equal, "Carol"),
        ];
        let result = filter_records(&people(), &clauses, "name", false);
        assert_eq!(names(&result), vec!["Carol"]);
    }

    #[test]
    fn test_case_sensitivity() {
        let clauses = [FilterClause::new(ComparisonOp::StartsWith, "B")];
        assert_eq!(names(&filter_records(&people(), &clauses, "name", false)), vec!["bob"]);
        assert!(filter_records(&people(), &clauses, "name", true).is_empty());
    }

    #[test]
    fn test_empty_clause_chain_keeps_everything() {
        assert_eq!(filter_records(&people(), &[], "name", false).len(), 4);
    }

    #[test]
    fn test_primitive_records_filter_on_themselves() {
        let words: Vec<Rc<Record>> = ["apple", "banana", "avocado"]
            .iter()
            .map(|w| Rc::new(Record::primitive(*w)))
            .collect();
        let result = filter_records(
            &words,
            &[FilterClause::new(ComparisonOp::StartsWith, "a")],
            "",
            false,
        );
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_filter_set_composes_with_and() {
        let mut set = FilterSet::new();
        set.insert(Filter::new("dept", vec![FilterClause::new(ComparisonOp::Equal, "sales")]));
        set.insert(Filter::new("age", vec![FilterClause::new(ComparisonOp::GreaterThan, 35)]));

        let result = apply_filter_set(&people(), &set, false);
        assert_eq!(names(&result), vec!["Carol"]);

        // Replacing a filter keeps its registration slot
        set.insert(Filter::new("dept", vec![FilterClause::new(ComparisonOp::Equal, "ops")]));
        assert_eq!(set.iter().next().map(|f| f.field.as_str()), Some("dept"));
        assert_eq!(names(&apply_filter_set(&people(), &set, false)), Vec::<String>::new());

        assert!(set.remove("age").is_some());
        assert!(set.remove("age").is_none());
        assert_eq!(names(&apply_filter_set(&people(), &set, false)), vec!["bob", "Dave"]);
    }

    #[test]
    fn test_clause_deserializes_from_json() {
        let clauses: Vec<FilterClause> = serde_json::from_str(
            r#"[{"value": 2, "symbol": ">=", "logicalConnector": "and"}, {"value": 9, "symbol": "<"}]"#,
        )
        .unwrap();
        assert_eq!(clauses[0].op, ComparisonOp::GreaterOrEqual);
        assert_eq!(clauses[0].connector, Some(LogicalConnector::And));
        assert_eq!(clauses[1].value, Value::Int(9));
        assert_eq!(clauses[1].connector, None);
    }

    #[test]
    fn test_clause_deserializes_nested_shape() {
        let clauses: Vec<FilterClause> = serde_json::from_str(
            r#"[
                {"value": 2, "filterClause": {"symbol": ">=", "logicalConnector": "or"}},
                {"value": 7, "filterClause": {"symbol": "="}, "logicalConnector": "and"}
            ]"#,
        )
        .unwrap();
        assert_eq!(clauses[0], FilterClause::new(ComparisonOp::GreaterOrEqual, 2).or());
        assert_eq!(clauses[1], FilterClause::new(ComparisonOp::Equal, 7).and());

        let missing = serde_json::from_str::<FilterClause>(r#"{"value": 2, "filterClause": {}}"#);
        assert!(missing.is_err());
    }
}
