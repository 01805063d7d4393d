/// Grouping engine: hierarchical grouping of records by one or more fields.
///
/// Records are first sorted ascending by the grouping fields so equal keys
/// form contiguous runs (the sort is stable, so any earlier user ordering
/// survives inside each group), then nested level by level with
/// `crate::nest::Nest`. The result is a tree of `GroupNode`s whose leaves are
/// the records themselves, or a rollup value when one is installed.

use crate::nest::{Nest, NestEntry, NestValues};
use crate::record::Record;
use crate::sort::{sort_records, SortKey};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A grouping field and its nesting depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupingKey {
    pub field: String,
    pub level: usize,
}

/// A grouping tree node keyed by a field value.
pub type GroupNode = NestEntry<Value, Rc<Record>, Value>;

/// Children of a `GroupNode`.
pub type GroupValues = NestValues<Value, Rc<Record>, Value>;

/// Summary computed over each innermost group in place of its records.
pub type GroupRollup = Rc<dyn Fn(&[Rc<Record>]) -> Value>;

/// The ordered grouping fields. A field appears at most once and each
/// key's level is its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingSpec {
    keys: Vec<GroupingKey>,
}

impl GroupingSpec {
    pub fn new() -> Self {
        GroupingSpec { keys: Vec::new() }
    }

    /// Appends `field` as the next level. Returns false if already grouped.
    pub fn add(&mut self, field: impl Into<String>) -> bool {
        let field = field.into();
        if self.contains(&field) {
            return false;
        }
        let level = self.keys.len();
        self.keys.push(GroupingKey { field, level });
        true
    }

    /// Removes `field` and renumbers the levels below it.
    pub fn remove(&mut self, field: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k.field != field);
        for (level, key) in self.keys.iter_mut().enumerate() {
            key.level = level;
        }
        self.keys.len() != before
    }

    pub fn contains(&self, field: &str) -> bool {
        self.keys.iter().any(|k| k.field == field)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn keys(&self) -> &[GroupingKey] {
        &self.keys
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.field.as_str())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Bucket key for a field value. Integral floats collapse onto the matching
/// integer so values that sort as equal land in one group.
fn group_key(value: &Value) -> Value {
    // 2^63, the first float above every i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    match value {
        Value::Float(f) if f.fract() == 0.0 && *f >= -LIMIT && *f < LIMIT => Value::Int(*f as i64),
        other => other.clone(),
    }
}

/// Groups `records` by every field in `spec`, outermost first.
///
/// An empty spec yields an empty tree; callers decide what an ungrouped
/// view looks like.
pub fn group_records(
    records: &[Rc<Record>],
    spec: &GroupingSpec,
    rollup: Option<&GroupRollup>,
) -> Vec<GroupNode> {
    if spec.is_empty() {
        return Vec::new();
    }

    let sort_keys: Vec<SortKey> = spec.fields().map(SortKey::ascending).collect();
    let mut sorted = records.to_vec();
    sort_records(&mut sorted, &sort_keys);

    let mut nest: Nest<Rc<Record>, Value, Value> = Nest::new();
    for field in spec.fields() {
        let field = field.to_string();
        nest = nest.key(move |record: &Rc<Record>| group_key(record.subject(&field)));
    }
    if let Some(rollup) = rollup {
        let rollup = Rc::clone(rollup);
        nest = nest.rollup(move |bucket: &[Rc<Record>]| rollup(bucket));
    }

    log::debug!(
        "grouping {} records by {} field(s)",
        sorted.len(),
        spec.len()
    );

    match nest.entries(&sorted) {
        NestValues::Groups(groups) => groups,
        NestValues::Items(_) | NestValues::Rollup(_) => Vec::new(),
    }
}

/// Leaf records of a grouping tree in tree order.
pub fn group_leaves(nodes: &[GroupNode]) -> Vec<Rc<Record>> {
    nodes
        .iter()
        .flat_map(|node| node.leaves().into_iter().cloned())
        .collect()
}
