/// Generic multi-key nesting.
///
/// `Nest` turns a flat slice into a tree: the first key function buckets the
/// items, each bucket is bucketed again by the second key function, and so on.
/// Buckets are kept in `IndexMap`s, so sibling order is the order in which
/// each key was first encountered. The tree can be read back as nested maps
/// (`map`) or as a list of `{ key, level, values }` entries (`entries`).
///
/// ```
/// use gridsource::nest::{Nest, NestValues};
///
/// let words = ["apple", "avocado", "banana", "blueberry", "cherry"];
/// let nest: Nest<&str, char> = Nest::new().key(|w: &&str| w.chars().next().unwrap_or(' '));
///
/// match nest.entries(&words) {
///     NestValues::Groups(groups) => {
///         assert_eq!(groups.len(), 3);
///         assert_eq!(groups[0].key, 'a');
///         assert_eq!(groups[0].values.len(), 2);
///     }
///     _ => unreachable!(),
/// }
/// ```

use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::hash::Hash;

type KeyFn<T, K> = Box<dyn Fn(&T) -> K>;
type KeyOrder<K> = Box<dyn Fn(&K, &K) -> Ordering>;
type ValueOrder<T> = Box<dyn Fn(&T, &T) -> Ordering>;
type RollupFn<T, R> = Box<dyn Fn(&[T]) -> R>;

/// Builder for a nesting operation.
pub struct Nest<T, K, R = ()> {
    keys: Vec<KeyFn<T, K>>,
    key_orders: Vec<Option<KeyOrder<K>>>,
    value_order: Option<ValueOrder<T>>,
    rollup: Option<RollupFn<T, R>>,
}

/// Nested ordered maps produced by `Nest::map`.
#[derive(Debug, Clone, PartialEq)]
pub enum NestMap<K: Hash + Eq, T, R> {
    Branch(IndexMap<K, NestMap<K, T, R>>),
    Leaf(Vec<T>),
    Rollup(R),
}

/// One node of the entry tree produced by `Nest::entries`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestEntry<K, T, R> {
    pub key: K,
    /// Depth of this node, 0 for the outermost key.
    pub level: usize,
    pub values: NestValues<K, T, R>,
}

/// Children of an entry: deeper groups, the leaf items, or a rollup of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NestValues<K, T, R> {
    Groups(Vec<NestEntry<K, T, R>>),
    Items(Vec<T>),
    Rollup(R),
}

impl<K, T, R> NestValues<K, T, R> {
    /// Number of direct children; a rollup counts as one.
    pub fn len(&self) -> usize {
        match self {
            NestValues::Groups(groups) => groups.len(),
            NestValues::Items(items) => items.len(),
            NestValues::Rollup(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn groups(&self) -> Option<&[NestEntry<K, T, R>]> {
        match self {
            NestValues::Groups(groups) => Some(groups),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[T]> {
        match self {
            NestValues::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn rollup(&self) -> Option<&R> {
        match self {
            NestValues::Rollup(value) => Some(value),
            _ => None,
        }
    }
}

impl<K, T, R> NestEntry<K, T, R> {
    /// All leaf items beneath this node, in tree order.
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::new();
        collect_leaves(&self.values, &mut out);
        out
    }
}

fn collect_leaves<'a, K, T, R>(values: &'a NestValues<K, T, R>, out: &mut Vec<&'a T>) {
    match values {
        NestValues::Groups(groups) => {
            for group in groups {
                collect_leaves(&group.values, out);
            }
        }
        NestValues::Items(items) => out.extend(items.iter()),
        NestValues::Rollup(_) => {}
    }
}

impl<T, K, R> Default for Nest<T, K, R> {
    fn default() -> Self {
        Nest {
            keys: Vec::new(),
            key_orders: Vec::new(),
            value_order: None,
            rollup: None,
        }
    }
}

impl<T, K, R> Nest<T, K, R>
where
    T: Clone,
    K: Hash + Eq,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a nesting level keyed by `key`.
    pub fn key<F>(mut self, key: F) -> Self
    where
        F: Fn(&T) -> K + 'static,
    {
        self.keys.push(Box::new(key));
        self.key_orders.push(None);
        self
    }

    /// Orders the entries of the most recently added level by key. Without a
    /// key order, entries keep first-encounter order.
    pub fn sort_keys<F>(mut self, order: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + 'static,
    {
        if let Some(slot) = self.key_orders.last_mut() {
            *slot = Some(Box::new(order));
        }
        self
    }

    /// Orders the items inside each leaf bucket.
    pub fn sort_values<F>(mut self, order: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        self.value_order = Some(Box::new(order));
        self
    }

    /// Replaces each leaf bucket with `rollup(bucket)`.
    pub fn rollup<F>(mut self, rollup: F) -> Self
    where
        F: Fn(&[T]) -> R + 'static,
    {
        self.rollup = Some(Box::new(rollup));
        self
    }

    pub fn depth(&self) -> usize {
        self.keys.len()
    }

    /// Nests `items` into ordered maps.
    pub fn map(&self, items: &[T]) -> NestMap<K, T, R> {
        self.build(items.to_vec(), 0)
    }

    /// Nests `items` into entries. With no keys the (sorted or rolled up)
    /// items are returned as they are.
    pub fn entries(&self, items: &[T]) -> NestValues<K, T, R> {
        let map = self.map(items);
        self.to_entries(map, 0)
    }

    fn build(&self, items: Vec<T>, depth: usize) -> NestMap<K, T, R> {
        let Some(key) = self.keys.get(depth) else {
            let mut items = items;
            if let Some(order) = &self.value_order {
                items.sort_by(|a, b| order(a, b));
            }
            return match &self.rollup {
                Some(rollup) => NestMap::Rollup(rollup(&items)),
                None => NestMap::Leaf(items),
            };
        };

        let mut buckets: IndexMap<K, Vec<T>> = IndexMap::new();
        for item in items {
            buckets.entry(key(&item)).or_default().push(item);
        }

        NestMap::Branch(
            buckets
                .into_iter()
                .map(|(k, bucket)| (k, self.build(bucket, depth + 1)))
                .collect(),
        )
    }

    fn to_entries(&self, map: NestMap<K, T, R>, depth: usize) -> NestValues<K, T, R> {
        match map {
            NestMap::Leaf(items) => NestValues::Items(items),
            NestMap::Rollup(value) => NestValues::Rollup(value),
            NestMap::Branch(children) => {
                let mut entries: Vec<NestEntry<K, T, R>> = children
                    .into_iter()
                    .map(|(key, child)| NestEntry {
                        key,
                        level: depth,
                        values: self.to_entries(child, depth + 1),
                    })
                    .collect();

                if let Some(Some(order)) = self.key_orders.get(depth) {
                    entries.sort_by(|a, b| order(&a.key, &b.key));
                }
                NestValues::Groups(entries)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Sale {
        region: &'static str,
        product: &'static str,
        units: u32,
    }

    fn sales() -> Vec<Sale> {
        vec![
            Sale { region: "west", product: "b", units: 3 },
            Sale { region: "east", product: "a", units: 5 },
            Sale { region: "west", product: "a", units: 1 },
            Sale { region: "east", product: "a", units: 2 },
            Sale { region: "west", product: "b", units: 4 },
        ]
    }

    #[test]
    fn test_single_key_preserves_first_encounter_order() {
        let nest: Nest<Sale, &str> = Nest::new().key(|s: &Sale| s.region);
        let groups = match nest.entries(&sales()) {
            NestValues::Groups(groups) => groups,
            other => panic!("expected groups, got {:?}", other),
        };

        let keys: Vec<&str> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec!["west", "east"]);
        assert_eq!(groups[0].level, 0);
        assert_eq!(groups[0].values.len(), 3);
        assert_eq!(groups[1].values.len(), 2);
    }

    #[test]
    fn test_two_levels() {
        let nest: Nest<Sale, &str> = Nest::new()
            .key(|s: &Sale| s.region)
            .key(|s: &Sale| s.product);
        let values = nest.entries(&sales());
        let west = &values.groups().unwrap()[0];

        let products = west.values.groups().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].key, "b");
        assert_eq!(products[0].level, 1);
        assert_eq!(products[0].values.items().unwrap().len(), 2);
        assert_eq!(west.leaves().len(), 3);
    }

    #[test]
    fn test_sort_keys_and_values() {
        let nest: Nest<Sale, &str> = Nest::new()
            .key(|s: &Sale| s.region)
            .sort_keys(|a, b| a.cmp(b))
            .sort_values(|a, b| b.units.cmp(&a.units));
        let values = nest.entries(&sales());
        let groups = values.groups().unwrap();

        assert_eq!(groups[0].key, "east");
        let units: Vec<u32> = groups[1].values.items().unwrap().iter().map(|s| s.units).collect();
        assert_eq!(units, vec![4, 3, 1]);
    }

    #[test]
    fn test_rollup() {
        let nest: Nest<Sale, &str, u32> = Nest::new()
            .key(|s: &Sale| s.region)
            .rollup(|bucket: &[Sale]| bucket.iter().map(|s| s.units).sum());
        let values = nest.entries(&sales());
        let totals: Vec<(&str, u32)> = values
            .groups()
            .unwrap()
            .iter()
            .map(|g| (g.key, *g.values.rollup().unwrap()))
            .collect();
        assert_eq!(totals, vec![("west", 8), ("east", 7)]);
    }

    #[test]
    fn test_map_and_no_keys() {
        let nest: Nest<Sale, &str> = Nest::new().key(|s: &Sale| s.product);
        match nest.map(&sales()) {
            NestMap::Branch(map) => {
                assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["b", "a"]);
                assert!(matches!(map.get("a"), Some(NestMap::Leaf(items)) if items.len() == 3));
            }
            other => panic!("expected branch, got {:?}", other),
        }

        let flat: Nest<Sale, &str> = Nest::new();
        assert_eq!(flat.entries(&sales()).items().map(|i| i.len()), Some(5));
    }

    #[test]
    fn test_empty_input() {
        let nest: Nest<Sale, &str> = Nest::new().key(|s: &Sale| s.region);
        assert!(nest.entries(&[]).is_empty());
    }
}
