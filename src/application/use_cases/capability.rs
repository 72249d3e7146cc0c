// ============================================================
// COLUMN CAPABILITY CHECKS
// ============================================================
// Gate computations on the columns a table actually carries

use crate::domain::table::Table;

/// Columns a computation needs before it may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requires {
    Nothing,
    All(&'static [&'static str]),
    AnyOf(&'static [&'static str]),
    AtLeast(usize, &'static [&'static str]),
}

impl Requires {
    pub fn is_satisfied_by(&self, table: &Table) -> bool {
        match self {
            Requires::Nothing => true,
            Requires::All(columns) => columns.iter().all(|c| table.has_column(c)),
            Requires::AnyOf(columns) => columns.iter().any(|c| table.has_column(c)),
            Requires::AtLeast(min, columns) => {
                columns.iter().filter(|c| table.has_column(c)).count() >= *min
            }
        }
    }

    /// Required columns present in the table, in declaration order
    pub fn present_in(&self, table: &Table) -> Vec<&'static str> {
        let columns: &[&'static str] = match self {
            Requires::Nothing => &[],
            Requires::All(c) | Requires::AnyOf(c) | Requires::AtLeast(_, c) => c,
        };
        columns
            .iter()
            .copied()
            .filter(|c| table.has_column(c))
            .collect()
    }
}

/// Run `compute` only when the table satisfies `requires`
pub fn gated<T>(
    table: &Table,
    requires: Requires,
    compute: impl FnOnce(&Table) -> Option<T>,
) -> Option<T> {
    if requires.is_satisfied_by(table) {
        compute(table)
    } else {
        None
    }
}
