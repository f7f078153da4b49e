use serde_json::Value;

/// Default member holding nested rows.
pub const DEFAULT_CHILDREN_COLUMN: &str = "children";

/// Trait implemented by row types consumable by this crate.
pub trait TableRow {
    /// Nested rows stored under `column`, if the row has such a member.
    fn children(&self, column: &str) -> Option<&[Self]>
    where
        Self: Sized;
}

/// JSON records keep their nested rows in an array member.
impl TableRow for Value {
    fn children(&self, column: &str) -> Option<&[Self]> {
        self.get(column)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }
}

/// Whether `row` has at least one nested row under `column`.
pub fn has_children<T: TableRow>(row: &T, column: &str) -> bool {
    row.children(column)
        .is_some_and(|children| !children.is_empty())
}

/// A row as it appears in the flattened sequence.
#[derive(Debug)]
pub struct FlattenedRow<'a, T> {
    /// Zero-based tree depth (`0` for root-level rows).
    pub depth: usize,
    /// Flattened index of the parent row.
    pub parent: Option<usize>,
    row: &'a T,
}

impl<'a, T> FlattenedRow<'a, T> {
    pub fn new(row: &'a T, depth: usize, parent: Option<usize>) -> Self {
        Self { depth, parent, row }
    }

    /// The original record this entry wraps.
    pub fn origin(&self) -> &'a T {
        self.row
    }
}

impl<T> Clone for FlattenedRow<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FlattenedRow<'_, T> {}

/// Flatten nested rows into pre-order: every parent is followed immediately
/// by all of its descendants, and siblings keep their source order.
///
/// Children are included regardless of expansion state.
pub fn flatten_rows<'a, T: TableRow>(
    rows: &'a [T],
    column: &str,
) -> Vec<FlattenedRow<'a, T>> {
    let mut entries = Vec::new();
    for row in rows {
        push_row(row, 0, None, column, &mut entries);
    }
    entries
}

fn push_row<'a, T: TableRow>(
    row: &'a T,
    depth: usize,
    parent: Option<usize>,
    column: &str,
    entries: &mut Vec<FlattenedRow<'a, T>>,
) {
    let index = entries.len();
    entries.push(FlattenedRow::new(row, depth, parent));

    if let Some(children) = row.children(column) {
        for child in children {
            push_row(child, depth + 1, Some(index), column, entries);
        }
    }
}
