//! Validation of user-chosen dimensions and columns.

use crate::error::{MindError, Result};
use crate::table::EmbeddingTable;

/// Parse "1, 2, 3". Tokens that are not plain digit strings are ignored,
/// so "1, x, 3" selects dims 1 and 3. Order and repeats are kept.
pub fn parse_dimension_list(input: &str) -> Vec<usize> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|t| t.parse().ok())
        .collect()
}

/// A validated reference to one dimension column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub index: usize,
    pub name: String,
}

pub fn resolve_column(table: &EmbeddingTable, name: &str) -> Result<ColumnRef> {
    table
        .column_index(name)
        .map(|index| ColumnRef {
            index,
            name: name.to_string(),
        })
        .ok_or_else(|| {
            MindError::InvalidSelection(format!(
                "column {:?} is not one of the {} dimensions in the table",
                name,
                table.columns.len()
            ))
        })
}

/// Each dimension number `n` resolves to `Dim_n` on its own, so one bad
/// entry does not hide the others.
pub fn resolve_dimensions(table: &EmbeddingTable, dims: &[usize]) -> Vec<(usize, Result<ColumnRef>)> {
    dims.iter()
        .map(|&d| (d, resolve_column(table, &format!("Dim_{}", d))))
        .collect()
}

/// Multi-select: every name must exist. An empty selection is valid and
/// resolves to nothing.
pub fn resolve_columns<S: AsRef<str>>(table: &EmbeddingTable, names: &[S]) -> Result<Vec<ColumnRef>> {
    names.iter().map(|n| resolve_column(table, n.as_ref())).collect()
}

/// Split a comma-separated column list ("Dim_1, Dim_4").
pub fn parse_column_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
