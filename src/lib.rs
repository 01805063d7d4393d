/// GridSource - Client-side data engine for data grids
///
/// Holds a collection of records and derives the view a grid renders from it:
/// multi-key sorting, per-field filter chains, free-text search, hierarchical
/// grouping and windowed (paged) access to the result.

pub mod error;
pub mod value;
pub mod record;
pub mod store;
pub mod sort;
pub mod filter;
pub mod search;
pub mod nest;
pub mod group;
pub mod config;
pub mod source;

pub use error::{DataSourceError, Result};
pub use value::Value;
pub use record::{Record, ROW_ID_FIELD};
pub use store::RecordStore;
pub use sort::{primers, Primer, SortKey, SortSpec};
pub use filter::{ComparisonOp, Filter, FilterClause, FilterSet, LogicalConnector};
pub use search::{search_records, search_records_by_field};
pub use nest::{Nest, NestEntry, NestMap, NestValues};
pub use group::{GroupNode, GroupRollup, GroupValues, GroupingKey, GroupingSpec};
pub use config::{DataSourceConfig, DataSourceHooks, DEFAULT_PAGE_SIZE};
pub use source::{derive_view, DataSource, ViewSlice};
