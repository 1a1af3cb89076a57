use std::cmp::Ordering;

use tracing::trace;

use super::column::Accessor;
use super::row::Row;
use super::state::{ColumnSort, SortDirection};
use super::{EngineError, Table};

// Sorts every level of the tree by the given accessors in priority order.
// Ties fall back to the original data order.
pub(super) fn sort_rows<'a, T>(
    mut rows: Vec<Row<'a, T>>,
    sorts: &[(Accessor<T>, bool)],
) -> Vec<Row<'a, T>> {
    rows.sort_by(|a, b| {
        for (accessor, desc) in sorts {
            let ord = accessor(a.original).compare(&accessor(b.original));
            if ord != Ordering::Equal {
                return if *desc { ord.reverse() } else { ord };
            }
        }
        a.index.cmp(&b.index)
    });
    for row in rows.iter_mut() {
        if row.has_sub_rows() {
            let sub_rows = std::mem::take(&mut row.sub_rows);
            row.sub_rows = sort_rows(sub_rows, sorts);
        }
    }
    rows
}

impl<T: Sync> Table<T> {
    pub fn sorting(&self) -> &[ColumnSort] {
        &self.state.sorting
    }

    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.state
            .sorting
            .iter()
            .find(|s| s.id == column_id)
            .map(|s| s.direction())
    }

    /// Position of the column in a multi column sort, `None` if unsorted.
    pub fn sort_index(&self, column_id: &str) -> Option<usize> {
        self.state.sorting.iter().position(|s| s.id == column_id)
    }

    /// Cycles the column through unsorted -> ascending -> descending -> unsorted.
    ///
    /// Without `multi` the column replaces any other sorted column, with `multi` it is
    /// updated in place (or appended) and the other columns keep their order.
    pub fn toggle_sorting(&mut self, column_id: &str, multi: bool) -> Result<(), EngineError> {
        let column = self.column(column_id)?;
        if !self.options.enable_sorting || !column.can_sort() {
            trace!("Column {column_id} can not be sorted");
            return Ok(());
        }

        let next = match self.sort_direction(column_id) {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) if self.options.enable_sorting_removal => None,
            Some(SortDirection::Descending) => Some(SortDirection::Ascending),
        };

        if multi && self.options.enable_multi_sort {
            let position = self.sort_index(column_id);
            match (position, next) {
                (Some(idx), Some(direction)) => {
                    self.state.sorting[idx] = ColumnSort::new(column_id, direction)
                }
                (Some(idx), None) => {
                    self.state.sorting.remove(idx);
                }
                (None, Some(direction)) => {
                    self.state.sorting.push(ColumnSort::new(column_id, direction))
                }
                (None, None) => {}
            }
        } else {
            self.state.sorting = next
                .map(|direction| vec![ColumnSort::new(column_id, direction)])
                .unwrap_or_default();
        }
        trace!("Sorting is now {:?}", self.state.sorting);
        self.reset_page_index();
        Ok(())
    }

    pub fn clear_sorting(&mut self) {
        self.state.sorting.clear();
        self.reset_page_index();
    }

    pub(super) fn resolved_sorting(&self) -> Vec<(Accessor<T>, bool)> {
        self.state
            .sorting
            .iter()
            .filter_map(|sort| {
                let column = self.column(&sort.id).ok()?;
                if !column.can_sort() {
                    return None;
                }
                column.accessor.map(|accessor| (accessor, sort.desc))
            })
            .collect()
    }
}
