//! Row expansion state for tree tables.
//!
//! This crate is split into two layers:
//! - row helpers ([`TableRow`], [`flatten_rows`]) that turn nested rows into
//!   the flattened sequence a table renders;
//! - the [`ExpansionStateManager`], which owns (or mirrors, when the host
//!   controls it) the ordered set of expanded row keys.
//!
//! Expanded keys are always reported in flattened-row order, never in the
//! order rows were toggled, and keys of rows that disappeared from the data
//! are dropped on the next toggle.
//!
//! # Quick Example
//!
//! ```
//! use otty_ui_expand::{
//!     ExpandOptions, ExpansionStateManager, FlattenedRow, RowKey,
//!     flatten_rows,
//! };
//! use serde_json::{Value, json};
//!
//! fn row_key(row: &FlattenedRow<'_, Value>, _index: usize) -> RowKey {
//!     RowKey::from(row.origin()["id"].as_i64().unwrap_or_default())
//! }
//!
//! let rows = vec![
//!     json!({"id": 1, "children": [{"id": 2}]}),
//!     json!({"id": 3}),
//! ];
//! let flat = flatten_rows(&rows, "children");
//!
//! let options = ExpandOptions::new().with_default_expand_all_rows(true);
//! let mut manager: ExpansionStateManager<'_, Value> =
//!     ExpansionStateManager::new(options, &flat, row_key);
//! assert_eq!(manager.expanded_row_keys(), [RowKey::from(1)].as_slice());
//!
//! manager.toggle(&flat, &RowKey::from(3));
//! manager.toggle(&flat, &RowKey::from(2));
//! assert_eq!(
//!     manager.expanded_row_keys(),
//!     [RowKey::from(1), RowKey::from(2), RowKey::from(3)].as_slice()
//! );
//! ```

mod errors;
mod key;
mod manager;
mod options;
mod row;
mod settings;

pub use errors::ExpandError;
pub use key::{ExpandedKeys, RowKey};
pub use manager::{
    ExpandChange, ExpansionStateManager, compute_default_expanded_keys,
};
pub use options::ExpandOptions;
pub use row::{
    DEFAULT_CHILDREN_COLUMN, FlattenedRow, TableRow, flatten_rows,
    has_children,
};
pub use settings::ExpandSettings;
