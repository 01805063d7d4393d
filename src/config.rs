/// Data source configuration.
///
/// `DataSourceConfig` carries the serialisable settings and can be loaded
/// from JSON; every field has a default. `DataSourceHooks` carries the
/// callbacks a grid registers to hear about data and configuration changes.

use crate::error::{DataSourceError, Result};
use crate::group::GroupingKey;
use crate::sort::SortKey;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataSourceConfig {
    /// Compare strings case-sensitively in filters and searches. Default: false.
    pub case_sensitive: bool,
    /// Records per page for `DataSource::page`. Default: 25. Must be non-zero.
    pub page_size: usize,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        DataSourceConfig {
            case_sensitive: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DataSourceConfig {
    /// Parses a configuration object; missing fields take their defaults.
    ///
    /// ```
    /// use gridsource::DataSourceConfig;
    ///
    /// let config = DataSourceConfig::from_json(r#"{"pageSize": 50}"#).unwrap();
    /// assert_eq!(config.page_size, 50);
    /// assert!(!config.case_sensitive);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DataSourceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(DataSourceError::InvalidConfig(
                "page size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Callbacks fired by the data source.
///
/// `on_change` fires after the record store is replaced, `on_sort` after the
/// sort keys change and `on_group` after the grouping fields change.
#[derive(Default)]
pub struct DataSourceHooks {
    pub on_change: Option<Box<dyn FnMut()>>,
    pub on_sort: Option<Box<dyn FnMut(&[SortKey])>>,
    pub on_group: Option<Box<dyn FnMut(&[GroupingKey])>>,
}

impl DataSourceHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_change<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn on_sort<F: FnMut(&[SortKey]) + 'static>(mut self, callback: F) -> Self {
        self.on_sort = Some(Box::new(callback));
        self
    }

    pub fn on_group<F: FnMut(&[GroupingKey]) + 'static>(mut self, callback: F) -> Self {
        self.on_group = Some(Box::new(callback));
        self
    }

    pub(crate) fn changed(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback();
        }
    }

    pub(crate) fn sorted(&mut self, keys: &[SortKey]) {
        if let Some(callback) = self.on_sort.as_mut() {
            callback(keys);
        }
    }

    pub(crate) fn grouped(&mut self, keys: &[GroupingKey]) {
        if let Some(callback) = self.on_group.as_mut() {
            callback(keys);
        }
    }
}

impl fmt::Debug for DataSourceHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSourceHooks")
            .field("on_change", &self.on_change.is_some())
            .field("on_sort", &self.on_sort.is_some())
            .field("on_group", &self.on_group.is_some())
            .finish()
    }
}
