/// The data source: record store, sort/filter/group configuration and the
/// current view a grid renders from.
///
/// Every configuration change re-derives the current view from scratch with
/// [`derive_view`]: the store is narrowed by each registered filter in
/// registration order, then ordered by the active sort keys. Grouping is not
/// part of the current view; it is applied lazily when a range or page is
/// requested, over just that window.
///
/// # Examples
///
/// ```
/// use gridsource::{ComparisonOp, DataSource, FilterClause, Record, SortKey, ViewSlice};
///
/// let mut source = DataSource::new(vec![
///     Record::object([("id", 3), ("score", 70)]),
///     Record::object([("id", 1), ("score", 95)]),
///     Record::object([("id", 2), ("score", 88)]),
/// ]);
///
/// source.add_sort_key(SortKey::descending("score"), true);
/// source.add_filter("score", vec![FilterClause::new(ComparisonOp::GreaterThan, 80)], true);
///
/// match source.range(0, 9) {
///     ViewSlice::Flat(rows) => {
///         let ids: Vec<String> = rows.iter().map(|r| r.field_value("id").to_string()).collect();
///         assert_eq!(ids, vec!["1", "2"]);
///     }
///     ViewSlice::Grouped(_) => unreachable!(),
/// }
/// ```

use crate::config::{DataSourceConfig, DataSourceHooks};
use crate::error::Result;
use crate::filter::{apply_filter_set, filter_records, Filter, FilterClause, FilterSet};
use crate::group::{group_leaves, group_records, GroupNode, GroupRollup, GroupingKey, GroupingSpec};
use crate::record::Record;
use crate::search::{search_records, search_records_by_field};
use crate::sort::{sort_records, SortKey, SortSpec};
use crate::store::{parse_json_records, RecordStore};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// A window of the current view: flat rows, or a grouping tree built from
/// those rows when grouping is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewSlice {
    Flat(Vec<Rc<Record>>),
    Grouped(Vec<GroupNode>),
}

impl ViewSlice {
    pub fn is_grouped(&self) -> bool {
        matches!(self, ViewSlice::Grouped(_))
    }

    /// The records in the slice, in display order.
    pub fn records(&self) -> Vec<Rc<Record>> {
        match self {
            ViewSlice::Flat(records) => records.clone(),
            ViewSlice::Grouped(nodes) => group_leaves(nodes),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Filtered and sorted projection of `records`.
pub fn derive_view(
    records: &[Rc<Record>],
    sorting: &SortSpec,
    filters: &FilterSet,
    case_sensitive: bool,
) -> Vec<Rc<Record>> {
    let mut view = if filters.is_empty() {
        records.to_vec()
    } else {
        apply_filter_set(records, filters, case_sensitive)
    };
    sort_records(&mut view, sorting.keys());
    view
}

pub struct DataSource {
    store: RecordStore,
    current_view: Vec<Rc<Record>>,
    sorting: SortSpec,
    filters: FilterSet,
    grouping: GroupingSpec,
    group_rollup: Option<GroupRollup>,
    config: DataSourceConfig,
    hooks: DataSourceHooks,
}

impl DataSource {
    /// Creates a data source with the default configuration and no hooks.
    pub fn new(records: Vec<Record>) -> Self {
        let store = RecordStore::from_records(records);
        let current_view = store.records().to_vec();
        DataSource {
            store,
            current_view,
            sorting: SortSpec::new(),
            filters: FilterSet::new(),
            grouping: GroupingSpec::new(),
            group_rollup: None,
            config: DataSourceConfig::default(),
            hooks: DataSourceHooks::default(),
        }
    }

    /// Creates a data source with explicit configuration and hooks. Fails if
    /// the configuration does not validate.
    pub fn with_config(
        records: Vec<Record>,
        config: DataSourceConfig,
        hooks: DataSourceHooks,
    ) -> Result<Self> {
        config.validate()?;
        let mut source = DataSource::new(records);
        source.config = config;
        source.hooks = hooks;
        Ok(source)
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    // ========================================================================
    // Record store
    // ========================================================================

    /// Replaces the records, stamps fresh row ids and resets the current view
    /// to the new records. Sort keys and filters stay registered but are not
    /// re-applied; call `apply_filters` (or `sort`) to re-derive the view.
    pub fn set_data(&mut self, records: Vec<Record>) {
        self.store.set_data(records);
        self.current_view = self.store.records().to_vec();
        log::debug!("data replaced: {} records", self.store.len());
        self.hooks.changed();
    }

    /// `set_data` from a JSON array of records.
    pub fn set_data_json(&mut self, json: &str) -> Result<()> {
        let records = parse_json_records(json)?;
        self.set_data(records);
        Ok(())
    }

    /// Every stored record in ingestion order.
    pub fn data(&self) -> &[Rc<Record>] {
        self.store.records()
    }

    pub fn record_by_row_id(&self, row_id: usize) -> Option<&Rc<Record>> {
        self.store.get(row_id)
    }

    pub fn current_view(&self) -> &[Rc<Record>] {
        &self.current_view
    }

    /// Number of records in the current view.
    pub fn len(&self) -> usize {
        self.current_view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current_view.is_empty()
    }

    /// The store run through the registered filters and sort keys.
    fn pipeline_view(&self) -> Vec<Rc<Record>> {
        derive_view(
            self.store.records(),
            &self.sorting,
            &self.filters,
            self.config.case_sensitive,
        )
    }

    fn refresh_view(&mut self) -> &[Rc<Record>] {
        self.current_view = self.pipeline_view();
        log::debug!(
            "view recomputed: {} of {} records ({} sort keys, {} filters)",
            self.current_view.len(),
            self.store.len(),
            self.sorting.len(),
            self.filters.len()
        );
        &self.current_view
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    pub fn sort_keys(&self) -> &[SortKey] {
        self.sorting.keys()
    }

    /// Adds a sort key, or updates the direction of the key already present
    /// for the same field. With `apply_now`, re-derives the current view.
    pub fn add_sort_key(&mut self, key: SortKey, apply_now: bool) -> &[Rc<Record>] {
        self.sorting.add(key);
        self.hooks.sorted(self.sorting.keys());
        if apply_now {
            self.refresh_view()
        } else {
            &self.current_view
        }
    }

    /// Removes the sort key for `field`; a no-op if there is none.
    pub fn remove_sort_key(&mut self, field: &str) -> &[Rc<Record>] {
        if !self.sorting.remove(field) {
            return &self.current_view;
        }
        self.hooks.sorted(self.sorting.keys());
        self.refresh_view()
    }

    /// Drops every sort key. Registered filters still apply.
    pub fn clear_sort(&mut self) -> &[Rc<Record>] {
        self.sorting.clear();
        self.hooks.sorted(self.sorting.keys());
        self.refresh_view()
    }

    /// Sorts `data` (default: the current view) and makes the result the
    /// current view. Passing `keys` replaces the sort keys first; bare field
    /// names convert to ascending keys via `From<&str>`.
    pub fn sort(
        &mut self,
        keys: Option<Vec<SortKey>>,
        data: Option<Vec<Rc<Record>>>,
    ) -> &[Rc<Record>] {
        if let Some(keys) = keys {
            self.sorting = SortSpec::from_keys(keys);
            self.hooks.sorted(self.sorting.keys());
        }
        let mut data = data.unwrap_or_else(|| self.current_view.clone());
        sort_records(&mut data, self.sorting.keys());
        self.current_view = data;
        &self.current_view
    }

    // ========================================================================
    // Filtering and search
    // ========================================================================

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Registers (or replaces) the filter for `field`. With `apply_now`,
    /// re-derives the current view through every registered filter.
    pub fn add_filter(
        &mut self,
        field: &str,
        clauses: Vec<FilterClause>,
        apply_now: bool,
    ) -> &[Rc<Record>] {
        self.filters.insert(Filter::new(field, clauses));
        if apply_now {
            self.refresh_view()
        } else {
            &self.current_view
        }
    }

    /// Drops the filter for `field`; a no-op if there is none.
    pub fn remove_filter(&mut self, field: &str) -> &[Rc<Record>] {
        if self.filters.remove(field).is_none() {
            return &self.current_view;
        }
        self.refresh_view()
    }

    /// Re-derives the current view from the store through every registered
    /// filter, then the sort keys.
    pub fn apply_filters(&mut self) -> &[Rc<Record>] {
        self.refresh_view()
    }

    /// Drops every filter. The sort keys still apply.
    pub fn clear_filters(&mut self) -> &[Rc<Record>] {
        self.filters.clear();
        self.refresh_view()
    }

    /// One-off filter that is not registered. `data` defaults to the store
    /// run through the registered filters and sort keys, so repeated calls do
    /// not compound.
    pub fn filter(
        &mut self,
        clauses: &[FilterClause],
        field: &str,
        data: Option<Vec<Rc<Record>>>,
        case_sensitive: bool,
    ) -> &[Rc<Record>] {
        let base = data.unwrap_or_else(|| self.pipeline_view());
        self.current_view = filter_records(&base, clauses, field, case_sensitive);
        &self.current_view
    }

    /// Keeps records with any string field containing `term`. `data`
    /// defaults as for `filter`.
    pub fn search(
        &mut self,
        term: &str,
        data: Option<Vec<Rc<Record>>>,
        case_sensitive: bool,
    ) -> &[Rc<Record>] {
        let base = data.unwrap_or_else(|| self.pipeline_view());
        self.current_view = search_records(&base, term, case_sensitive);
        log::debug!("search '{}' matched {} records", term, self.current_view.len());
        &self.current_view
    }

    /// Like `search`, restricted to `fields`. Object records require
    /// `fields`; on error the current view is left untouched.
    pub fn search_by_field<S: AsRef<str>>(
        &mut self,
        term: &str,
        fields: Option<&[S]>,
        data: Option<Vec<Rc<Record>>>,
        case_sensitive: bool,
    ) -> Result<&[Rc<Record>]> {
        let base = data.unwrap_or_else(|| self.pipeline_view());
        self.current_view = search_records_by_field(&base, term, fields, case_sensitive)?;
        Ok(&self.current_view)
    }

    // ========================================================================
    // Grouping
    // ========================================================================

    pub fn grouping(&self) -> &[GroupingKey] {
        self.grouping.keys()
    }

    pub fn grouping_exists(&self, field: &str) -> bool {
        self.grouping.contains(field)
    }

    /// Adds `field` as the next grouping level unless it is already grouped.
    /// With `group_now`, returns `group_data(data)`.
    pub fn group_by_field(
        &mut self,
        field: &str,
        data: Option<Vec<Rc<Record>>>,
        group_now: bool,
    ) -> Option<ViewSlice> {
        if self.grouping.add(field) {
            self.hooks.grouped(self.grouping.keys());
        }
        if group_now {
            Some(self.group_data(data))
        } else {
            None
        }
    }

    /// Removes the grouping on `field` and regroups the current view.
    pub fn remove_grouping(&mut self, field: &str) -> ViewSlice {
        if self.grouping.remove(field) {
            self.hooks.grouped(self.grouping.keys());
        }
        self.group_data(None)
    }

    pub fn clear_grouping(&mut self) -> ViewSlice {
        if !self.grouping.is_empty() {
            self.grouping.clear();
            self.hooks.grouped(self.grouping.keys());
        }
        self.group_data(None)
    }

    /// Installs (or with `None`, removes) a summary computed over each
    /// innermost group in place of its records.
    pub fn set_group_rollup(&mut self, rollup: Option<GroupRollup>) {
        self.group_rollup = rollup;
    }

    /// Groups `data` (default: the current view) by the grouping fields.
    /// Without grouping fields the data comes back flat. The current view is
    /// not modified.
    pub fn group_data(&self, data: Option<Vec<Rc<Record>>>) -> ViewSlice {
        let data = data.unwrap_or_else(|| self.current_view.clone());
        self.compose(data)
    }

    fn compose(&self, window: Vec<Rc<Record>>) -> ViewSlice {
        if self.grouping.is_empty() {
            ViewSlice::Flat(window)
        } else {
            ViewSlice::Grouped(group_records(
                &window,
                &self.grouping,
                self.group_rollup.as_ref(),
            ))
        }
    }

    // ========================================================================
    // Ranges and pages
    // ========================================================================

    /// Rows `start..=stop` of the current view. `stop` is clamped to the last
    /// row; a start past the end (or after `stop`) gives an empty slice. With
    /// grouping active, only the windowed rows are grouped, so a group split
    /// across two windows shows a header in each.
    pub fn range(&self, start: usize, stop: usize) -> ViewSlice {
        let len = self.current_view.len();
        let window = if start >= len || start > stop {
            Vec::new()
        } else {
            let stop = stop.min(len - 1);
            self.current_view[start..=stop].to_vec()
        };
        self.compose(window)
    }

    /// Number of pages at the configured page size.
    pub fn page_count(&self) -> usize {
        self.current_view.len().div_ceil(self.config.page_size)
    }

    /// Zero-based page `index` at the configured page size.
    pub fn page(&self, index: usize) -> ViewSlice {
        let size = self.config.page_size;
        let start = index.saturating_mul(size);
        let stop = start.saturating_add(size - 1);
        self.range(start, stop)
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("records", &self.store.len())
            .field("view", &self.current_view.len())
            .field("sorting", &self.sorting)
            .field("filters", &self.filters)
            .field("grouping", &self.grouping)
            .field("group_rollup", &self.group_rollup.is_some())
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::new(Vec::new())
    }
}
