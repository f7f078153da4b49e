use std::fmt;

use crate::key::RowKey;
use crate::row::DEFAULT_CHILDREN_COLUMN;
use crate::settings::ExpandSettings;

type RowRender<'a, T, C> = dyn Fn(&T, usize) -> Option<C> + 'a;
type RowPredicate<'a, T> = dyn Fn(&T) -> bool + 'a;
type ExpandAction<'a, T> = dyn FnMut(Option<&T>, bool) + 'a;
type KeysAction<'a> = dyn FnMut(&[RowKey]) + 'a;

/// Configuration of an [`ExpansionStateManager`](crate::ExpansionStateManager).
///
/// `C` is the content type produced by the expanded row renderer. The manager
/// never inspects it; only whether a renderer yields content matters.
pub struct ExpandOptions<'a, T, C = ()> {
    pub(crate) default_expanded_row_keys: Option<Vec<RowKey>>,
    pub(crate) default_expand_all_rows: bool,
    pub(crate) expanded_row_render: Option<Box<RowRender<'a, T, C>>>,
    pub(crate) on_expand: Option<Box<ExpandAction<'a, T>>>,
    pub(crate) on_expanded_rows_change: Option<Box<KeysAction<'a>>>,
    pub(crate) children_column_name: String,
    pub(crate) row_expandable: Option<Box<RowPredicate<'a, T>>>,
    pub(crate) expanded_row_keys: Option<Vec<RowKey>>,
}

impl<T, C> Default for ExpandOptions<'_, T, C> {
    fn default() -> Self {
        Self {
            default_expanded_row_keys: None,
            default_expand_all_rows: false,
            expanded_row_render: None,
            on_expand: None,
            on_expanded_rows_change: None,
            children_column_name: String::from(DEFAULT_CHILDREN_COLUMN),
            row_expandable: None,
            expanded_row_keys: None,
        }
    }
}

impl<'a, T, C> ExpandOptions<'a, T, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from loaded settings, without callbacks.
    pub fn from_settings(settings: ExpandSettings) -> Self {
        Self {
            default_expanded_row_keys: settings.default_expanded_row_keys,
            default_expand_all_rows: settings.default_expand_all_rows,
            children_column_name: settings.children_column_name,
            expanded_row_keys: settings.expanded_row_keys,
            ..Self::default()
        }
    }

    /// Initial expanded set. Ignored when the keys are controlled.
    pub fn with_default_expanded_row_keys(
        mut self,
        keys: impl IntoIterator<Item = RowKey>,
    ) -> Self {
        self.default_expanded_row_keys = Some(keys.into_iter().collect());
        self
    }

    /// Expand every eligible row at construction.
    pub fn with_default_expand_all_rows(mut self, expand_all: bool) -> Self {
        self.default_expand_all_rows = expand_all;
        self
    }

    /// Renderer of the expanded detail for a row.
    ///
    /// When no [`row_expandable`](Self::with_row_expandable) predicate is set,
    /// default-expand-all calls this renderer to decide eligibility.
    pub fn with_expanded_row_render(
        mut self,
        render: impl Fn(&T, usize) -> Option<C> + 'a,
    ) -> Self {
        self.expanded_row_render = Some(Box::new(render));
        self
    }

    /// Called once per toggle with the toggled row and its new state.
    pub fn on_expand(
        mut self,
        on_expand: impl FnMut(Option<&T>, bool) + 'a,
    ) -> Self {
        self.on_expand = Some(Box::new(on_expand));
        self
    }

    /// Called once per toggle, after `on_expand`, with the proposed set.
    pub fn on_expanded_rows_change(
        mut self,
        on_change: impl FnMut(&[RowKey]) + 'a,
    ) -> Self {
        self.on_expanded_rows_change = Some(Box::new(on_change));
        self
    }

    pub fn with_children_column_name(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.children_column_name = name.into();
        self
    }

    /// Eligibility predicate; takes precedence over the renderer and the
    /// children check.
    pub fn with_row_expandable(
        mut self,
        predicate: impl Fn(&T) -> bool + 'a,
    ) -> Self {
        self.row_expandable = Some(Box::new(predicate));
        self
    }

    /// Hand ownership of the expanded set to the host.
    pub fn with_expanded_row_keys(
        mut self,
        keys: impl IntoIterator<Item = RowKey>,
    ) -> Self {
        self.expanded_row_keys = Some(keys.into_iter().collect());
        self
    }

    pub fn children_column_name(&self) -> &str {
        &self.children_column_name
    }

    pub fn default_expand_all_rows(&self) -> bool {
        self.default_expand_all_rows
    }

    pub fn default_expanded_row_keys(&self) -> Option<&[RowKey]> {
        self.default_expanded_row_keys.as_deref()
    }

    /// Host-controlled keys the manager was built with.
    pub fn expanded_row_keys(&self) -> Option<&[RowKey]> {
        self.expanded_row_keys.as_deref()
    }
}

impl<T, C> fmt::Debug for ExpandOptions<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpandOptions")
            .field(
                "default_expanded_row_keys",
                &self.default_expanded_row_keys,
            )
            .field("default_expand_all_rows", &self.default_expand_all_rows)
            .field(
                "expanded_row_render",
                &self.expanded_row_render.is_some(),
            )
            .field("on_expand", &self.on_expand.is_some())
            .field(
                "on_expanded_rows_change",
                &self.on_expanded_rows_change.is_some(),
            )
            .field("children_column_name", &self.children_column_name)
            .field("row_expandable", &self.row_expandable.is_some())
            .field("expanded_row_keys", &self.expanded_row_keys)
            .finish()
    }
}
