use std::fmt;
use std::mem;

use log::{debug, trace, warn};

use crate::key::{ExpandedKeys, RowKey};
use crate::options::ExpandOptions;
use crate::row::{FlattenedRow, TableRow, has_children};

type RowKeyFn<'a, T> = dyn Fn(&FlattenedRow<'_, T>, usize) -> RowKey + 'a;

/// Who owns the effective expanded set.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExpansionState {
    /// The manager owns the set and persists every toggle.
    Uncontrolled(ExpandedKeys),
    /// The host owns the effective set. Toggles still land in `mirror`, which
    /// becomes the internal set once the host releases control.
    Controlled {
        host: ExpandedKeys,
        mirror: ExpandedKeys,
    },
}

impl ExpansionState {
    fn keys(&self) -> &ExpandedKeys {
        match self {
            Self::Uncontrolled(keys) | Self::Controlled { host: keys, .. } => {
                keys
            },
        }
    }

    fn internal_mut(&mut self) -> &mut ExpandedKeys {
        match self {
            Self::Uncontrolled(keys)
            | Self::Controlled { mirror: keys, .. } => keys,
        }
    }
}

/// Result of a single toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandChange {
    /// The toggled key.
    pub key: RowKey,
    /// `true` when the key was expanded, `false` when collapsed.
    pub expanded: bool,
    /// Proposed expanded set in flattened order. This is the new effective
    /// set unless the manager is controlled.
    pub keys: ExpandedKeys,
}

/// Tracks which rows of a flattened table are expanded.
///
/// The manager does not own the rows: the host passes its current flattened
/// rows to [`new`](Self::new) and to every [`toggle`](Self::toggle). Defaults
/// are computed once, in `new`; later toggles only reorder and prune keys
/// against the rows they receive.
///
/// Toggles take `&mut self`, so notification callbacks cannot toggle the same
/// manager again. A host that wants to react to a change with another toggle
/// does so after `toggle` returns.
pub struct ExpansionStateManager<'a, T, C = ()> {
    options: ExpandOptions<'a, T, C>,
    row_key: Box<RowKeyFn<'a, T>>,
    state: ExpansionState,
}

impl<'a, T, C> ExpansionStateManager<'a, T, C>
where
    T: TableRow,
{
    /// Create a manager and compute its default expanded keys from `rows`.
    pub fn new(
        options: ExpandOptions<'a, T, C>,
        rows: &[FlattenedRow<'_, T>],
        row_key: impl Fn(&FlattenedRow<'_, T>, usize) -> RowKey + 'a,
    ) -> Self {
        let defaults: ExpandedKeys =
            compute_default_expanded_keys(&options, rows, &row_key).into();
        let state = if options.expanded_row_keys.is_some() {
            ExpansionState::Controlled {
                host: defaults.clone(),
                mirror: defaults,
            }
        } else {
            ExpansionState::Uncontrolled(defaults)
        };

        Self {
            options,
            row_key: Box::new(row_key),
            state,
        }
    }

    /// Effective expanded keys: the host set when controlled, the internal
    /// set otherwise.
    pub fn expanded_row_keys(&self) -> &[RowKey] {
        self.state.keys().as_slice()
    }

    pub fn is_expanded(&self, key: &RowKey) -> bool {
        self.state.keys().contains(key)
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.state, ExpansionState::Controlled { .. })
    }

    pub fn options(&self) -> &ExpandOptions<'a, T, C> {
        &self.options
    }

    pub fn children_column_name(&self) -> &str {
        self.options.children_column_name()
    }

    /// Apply the host's expanded set.
    ///
    /// `Some` switches to (or refreshes) controlled mode. `None` hands the set
    /// back to the manager, which continues from the last set it computed,
    /// whether or not the host applied it.
    pub fn set_expanded_row_keys(&mut self, keys: Option<Vec<RowKey>>) {
        let released = ExpansionState::Uncontrolled(ExpandedKeys::new());
        let previous = mem::replace(&mut self.state, released);
        self.state = match (keys, previous) {
            (Some(keys), ExpansionState::Uncontrolled(mirror)) => {
                debug!("expanded row keys are now controlled by the host");
                ExpansionState::Controlled {
                    host: keys.into(),
                    mirror,
                }
            },
            (Some(keys), ExpansionState::Controlled { mirror, .. }) => {
                ExpansionState::Controlled {
                    host: keys.into(),
                    mirror,
                }
            },
            (None, ExpansionState::Controlled { mirror, .. }) => {
                debug!(
                    "expanded row keys released by the host with {} keys",
                    mirror.len()
                );
                ExpansionState::Uncontrolled(mirror)
            },
            (None, uncontrolled) => uncontrolled,
        };
    }

    /// Whether the row at `index` may be expanded.
    ///
    /// Same predicate as default-expand-all: `row_expandable` first, then the
    /// expanded row renderer, then the presence of children.
    pub fn is_row_expandable(
        &self,
        row: &FlattenedRow<'_, T>,
        index: usize,
    ) -> bool {
        is_eligible(&self.options, row, index)
    }

    /// Flip the expansion of `key` against the current `rows`.
    ///
    /// The proposed set keeps only keys present in `rows`, in their order.
    /// It always replaces the internal set, which is the effective set unless
    /// the manager is controlled, and is reported through `on_expand` then
    /// `on_expanded_rows_change`.
    ///
    /// Runs in time linear in `rows.len()`.
    pub fn toggle(
        &mut self,
        rows: &[FlattenedRow<'_, T>],
        key: &RowKey,
    ) -> ExpandChange {
        let (expanded, candidate) =
            ExpandedKeys::toggled(self.expanded_row_keys(), key);
        let ordered = rows
            .iter()
            .enumerate()
            .map(|(index, row)| (self.row_key)(row, index));
        let keys = ExpandedKeys::presented(ordered, candidate.iter());

        trace!(
            "row {key} {}, {} rows expanded",
            if expanded { "expanded" } else { "collapsed" },
            keys.len()
        );

        *self.state.internal_mut() = keys.clone();

        let row = self.find_row(rows, key);
        if row.is_none() {
            warn!(
                "toggled row {key} is not among {} flattened rows",
                rows.len()
            );
        }

        if let Some(on_expand) = self.options.on_expand.as_mut() {
            on_expand(row, expanded);
        }
        if let Some(on_change) = self.options.on_expanded_rows_change.as_mut()
        {
            on_change(keys.as_slice());
        }

        ExpandChange {
            key: key.clone(),
            expanded,
            keys,
        }
    }

    /// Original record of the first flattened row whose key is `key`.
    pub fn find_row<'r>(
        &self,
        rows: &[FlattenedRow<'r, T>],
        key: &RowKey,
    ) -> Option<&'r T> {
        rows.iter()
            .enumerate()
            .find(|(index, row)| (self.row_key)(*row, *index) == *key)
            .map(|(_, row)| row.origin())
    }
}

impl<T, C> fmt::Debug for ExpansionStateManager<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionStateManager")
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Expanded keys a manager starts with.
///
/// The first configured policy wins:
/// 1. host-controlled `expanded_row_keys`, as given;
/// 2. `default_expanded_row_keys`, as given (no presence or eligibility check);
/// 3. `default_expand_all_rows`: keys of every eligible row, in flattened
///    order;
/// 4. nothing.
pub fn compute_default_expanded_keys<T, C>(
    options: &ExpandOptions<'_, T, C>,
    rows: &[FlattenedRow<'_, T>],
    row_key: impl Fn(&FlattenedRow<'_, T>, usize) -> RowKey,
) -> Vec<RowKey>
where
    T: TableRow,
{
    if let Some(keys) = &options.expanded_row_keys {
        debug!("default expanded rows taken from host: {}", keys.len());
        return keys.clone();
    }

    if let Some(keys) = &options.default_expanded_row_keys {
        debug!("default expanded rows configured: {}", keys.len());
        return keys.clone();
    }

    if options.default_expand_all_rows {
        let keys: Vec<RowKey> = rows
            .iter()
            .enumerate()
            .filter(|(index, row)| is_eligible(options, row, *index))
            .map(|(index, row)| row_key(row, index))
            .collect();
        debug!(
            "default expanded rows from expand-all: {} of {}",
            keys.len(),
            rows.len()
        );
        return keys;
    }

    Vec::new()
}

// The renderer is invoked only to learn whether it has content for the row.
fn is_eligible<T, C>(
    options: &ExpandOptions<'_, T, C>,
    row: &FlattenedRow<'_, T>,
    index: usize,
) -> bool
where
    T: TableRow,
{
    let origin = row.origin();
    if let Some(predicate) = &options.row_expandable {
        return predicate(origin);
    }
    if let Some(render) = &options.expanded_row_render {
        return render(origin, index).is_some();
    }
    has_children(origin, &options.children_column_name)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use serde_json::{Value, json};

    use super::*;
    use crate::row::flatten_rows;

    fn json_key(row: &FlattenedRow<'_, Value>, _index: usize) -> RowKey {
        match &row.origin()["key"] {
            Value::String(value) => RowKey::from(value.as_str()),
            value => RowKey::from(value.as_i64().unwrap_or(-1)),
        }
    }

    fn keys(values: &[i64]) -> Vec<RowKey> {
        values.iter().copied().map(RowKey::from).collect()
    }

    fn sample_rows() -> Vec<Value> {
        vec![
            json!({"key": "A"}),
            json!({"key": "B", "children": [{"key": "C"}]}),
            json!({"key": "D", "children": []}),
        ]
    }

    #[test]
    fn no_policy_yields_empty_defaults() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let options: ExpandOptions<'_, Value> = ExpandOptions::new();
        let defaults = compute_default_expanded_keys(&options, &flat, json_key);
        assert!(defaults.is_empty());
    }

    #[test]
    fn expand_all_uses_children_when_no_predicate_is_set() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let options: ExpandOptions<'_, Value> =
            ExpandOptions::new().with_default_expand_all_rows(true);

        let defaults = compute_default_expanded_keys(&options, &flat, json_key);
        assert_eq!(defaults, vec![RowKey::from("B")]);
    }

    #[test]
    fn expand_all_honors_custom_children_column() {
        let rows = vec![
            json!({"key": 1, "items": [{"key": 2}]}),
            json!({"key": 3, "children": [{"key": 4}]}),
        ];
        let flat = flatten_rows(&rows, "items");
        let options: ExpandOptions<'_, Value> = ExpandOptions::new()
            .with_default_expand_all_rows(true)
            .with_children_column_name("items");

        let defaults = compute_default_expanded_keys(&options, &flat, json_key);
        assert_eq!(defaults, keys(&[1]));
    }

    #[test]
    fn row_expandable_overrides_renderer_and_children() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let rendered = Cell::new(0);
        let options: ExpandOptions<'_, Value, String> = ExpandOptions::new()
            .with_default_expand_all_rows(true)
            .with_row_expandable(|row: &Value| {
                row["key"] == "A" || row["key"] == "C"
            })
            .with_expanded_row_render(|_, _| {
                rendered.set(rendered.get() + 1);
                Some(String::from("detail"))
            });

        let defaults = compute_default_expanded_keys(&options, &flat, json_key);
        assert_eq!(defaults, vec![RowKey::from("A"), RowKey::from("C")]);
        assert_eq!(rendered.get(), 0);
    }

    #[test]
    fn renderer_decides_eligibility_with_row_index() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let seen = RefCell::new(Vec::new());
        let options: ExpandOptions<'_, Value, &str> = ExpandOptions::new()
            .with_default_expand_all_rows(true)
            .with_expanded_row_render(|_, index| {
                seen.borrow_mut().push(index);
                (index % 2 == 0).then_some("detail")
            });

        let defaults = compute_default_expanded_keys(&options, &flat, json_key);
        assert_eq!(defaults, vec![RowKey::from("A"), RowKey::from("C")]);
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn expand_all_keeps_zero_key() {
        let rows = vec![json!({"key": 0, "children": [{"key": 1}]})];
        let flat = flatten_rows(&rows, "children");
        let options: ExpandOptions<'_, Value> =
            ExpandOptions::new().with_default_expand_all_rows(true);

        let defaults = compute_default_expanded_keys(&options, &flat, json_key);
        assert_eq!(defaults, keys(&[0]));
    }

    #[test]
    fn configured_defaults_are_taken_unfiltered() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let options: ExpandOptions<'_, Value> = ExpandOptions::new()
            .with_default_expanded_row_keys(keys(&[99, 99]))
            .with_default_expand_all_rows(true);

        let defaults = compute_default_expanded_keys(&options, &flat, json_key);
        assert_eq!(defaults, keys(&[99, 99]));
    }

    #[test]
    fn controlled_keys_win_over_every_default_policy() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let options: ExpandOptions<'_, Value> = ExpandOptions::new()
            .with_expanded_row_keys(vec![RowKey::from("D"), RowKey::from("A")])
            .with_default_expanded_row_keys(keys(&[1]))
            .with_default_expand_all_rows(true);

        let defaults = compute_default_expanded_keys(&options, &flat, json_key);
        assert_eq!(defaults, vec![RowKey::from("D"), RowKey::from("A")]);

        let manager = ExpansionStateManager::new(options, &flat, json_key);
        assert!(manager.is_controlled());
        assert_eq!(
            manager.expanded_row_keys(),
            [RowKey::from("D"), RowKey::from("A")].as_slice()
        );
    }

    #[test]
    fn toggle_in_controlled_mode_only_proposes() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let proposed = RefCell::new(Vec::new());
        let options: ExpandOptions<'_, Value> = ExpandOptions::new()
            .with_expanded_row_keys(vec![RowKey::from("D")])
            .on_expanded_rows_change(|keys| {
                proposed.borrow_mut().push(keys.to_vec())
            });
        let mut manager = ExpansionStateManager::new(options, &flat, json_key);

        let change = manager.toggle(&flat, &RowKey::from("A"));
        assert!(change.expanded);
        assert_eq!(
            change.keys.as_slice(),
            [RowKey::from("A"), RowKey::from("D")].as_slice()
        );
        assert_eq!(manager.expanded_row_keys(), [RowKey::from("D")].as_slice());

        manager.set_expanded_row_keys(Some(change.keys.to_vec()));
        assert!(manager.is_expanded(&RowKey::from("A")));
        drop(manager);
        assert_eq!(
            *proposed.borrow(),
            vec![vec![RowKey::from("A"), RowKey::from("D")]]
        );
    }

    #[test]
    fn releasing_control_continues_from_last_proposed_keys() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let options: ExpandOptions<'_, Value> = ExpandOptions::new()
            .with_expanded_row_keys(vec![RowKey::from("D")]);
        let mut manager = ExpansionStateManager::new(options, &flat, json_key);
        assert!(manager.is_controlled());

        manager.toggle(&flat, &RowKey::from("A"));
        assert_eq!(manager.expanded_row_keys(), [RowKey::from("D")].as_slice());

        manager.set_expanded_row_keys(None);
        assert!(!manager.is_controlled());
        assert_eq!(
            manager.expanded_row_keys(),
            [RowKey::from("A"), RowKey::from("D")].as_slice()
        );

        manager.set_expanded_row_keys(None);
        assert_eq!(
            manager.expanded_row_keys(),
            [RowKey::from("A"), RowKey::from("D")].as_slice()
        );
    }

    #[test]
    fn taking_control_keeps_internal_keys_for_release() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let options: ExpandOptions<'_, Value> = ExpandOptions::new()
            .with_default_expanded_row_keys(vec![RowKey::from("A")]);
        let mut manager = ExpansionStateManager::new(options, &flat, json_key);
        assert!(!manager.is_controlled());

        manager.set_expanded_row_keys(Some(vec![RowKey::from("B")]));
        assert!(manager.is_controlled());
        assert_eq!(manager.expanded_row_keys(), [RowKey::from("B")].as_slice());

        manager.set_expanded_row_keys(Some(vec![RowKey::from("C")]));
        assert_eq!(manager.expanded_row_keys(), [RowKey::from("C")].as_slice());

        manager.set_expanded_row_keys(None);
        assert_eq!(manager.expanded_row_keys(), [RowKey::from("A")].as_slice());
    }

    #[test]
    fn controlled_manager_keeps_host_keys_in_options() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let options: ExpandOptions<'_, Value> = ExpandOptions::new()
            .with_expanded_row_keys(vec![RowKey::from("B")]);
        let manager = ExpansionStateManager::new(options, &flat, json_key);

        assert_eq!(
            manager.options().expanded_row_keys(),
            Some([RowKey::from("B")].as_slice())
        );
        assert!(format!("{manager:?}").contains("expanded_row_keys: Some"));
    }

    #[test]
    fn is_row_expandable_matches_default_policy() {
        let rows = sample_rows();
        let flat = flatten_rows(&rows, "children");
        let options: ExpandOptions<'_, Value> = ExpandOptions::new();
        let manager = ExpansionStateManager::new(options, &flat, json_key);

        let expandable: Vec<bool> = flat
            .iter()
            .enumerate()
            .map(|(index, row)| manager.is_row_expandable(row, index))
            .collect();
        assert_eq!(expandable, vec![false, true, false, false]);
    }

    #[test]
    fn find_row_returns_first_match() {
        let rows = vec![
            json!({"key": 1, "n": "first"}),
            json!({"key": 1, "n": "second"}),
        ];
        let flat = flatten_rows(&rows, "children");
        let manager: ExpansionStateManager<'_, Value> =
            ExpansionStateManager::new(ExpandOptions::new(), &flat, json_key);

        let row = manager.find_row(&flat, &RowKey::from(1));
        assert_eq!(row.map(|row| &row["n"]), Some(&json!("first")));
        assert!(manager.find_row(&flat, &RowKey::from(2)).is_none());
    }
}
