//! Headless table state.
//!
//! A `Table` owns the records, the column definitions and a `TableState`. Rows are
//! projected through a fixed pipeline of row models:
//!
//! core -> filtered -> sorted -> expanded -> paginated
//!
//! Each stage can be switched off through `TableOptions`. The presentation layer only
//! calls the operations on `Table` and renders what `headers()` and `row_model()` return.

mod column;
mod expanding;
mod filtering;
mod pagination;
mod row;
mod selection;
mod sorting;
mod state;
mod visibility;

use derive_setters::Setters;
use tracing::trace;

pub use column::{CellContext, CellValue, ColumnDef, Header};
pub use row::{Row, RowId, RowModel, SubRows};
pub use state::{PaginationState, SortDirection, TableState};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("unknown row '{0}'")]
    UnknownRow(RowId),
    #[error("invalid page size {0}")]
    InvalidPageSize(usize),
}

/// Which row models are active and how they behave.
#[derive(Setters)]
pub struct TableOptions<T> {
    pub enable_sorting: bool,
    pub enable_multi_sort: bool,
    pub enable_sorting_removal: bool,
    pub enable_filtering: bool,
    pub enable_pagination: bool,
    pub enable_expanding: bool,
    pub enable_row_selection: bool,
    pub enable_sub_row_selection: bool,
    pub auto_reset_page_index: bool,
    #[setters(strip_option)]
    pub get_sub_rows: Option<SubRows<T>>,
}

impl<T> Default for TableOptions<T> {
    fn default() -> Self {
        Self {
            enable_sorting: true,
            enable_multi_sort: true,
            enable_sorting_removal: true,
            enable_filtering: true,
            enable_pagination: true,
            enable_expanding: true,
            enable_row_selection: true,
            enable_sub_row_selection: true,
            auto_reset_page_index: true,
            get_sub_rows: None,
        }
    }
}

pub struct Table<T> {
    data: Vec<T>,
    columns: Vec<ColumnDef<T>>,
    options: TableOptions<T>,
    state: TableState,
}

impl<T: Sync> Table<T> {
    pub fn new(data: Vec<T>, columns: Vec<ColumnDef<T>>, options: TableOptions<T>) -> Self {
        Self {
            data,
            columns,
            options,
            state: TableState::default(),
        }
    }

    /// Replace the state, rejecting visibility entries for undeclared columns.
    pub fn with_state(mut self, state: TableState) -> Result<Self, EngineError> {
        if let Some(unknown) = state
            .column_visibility
            .keys()
            .find(|id| !self.columns.iter().any(|c| c.id == id.as_str()))
        {
            return Err(EngineError::UnknownColumn(unknown.clone()));
        }
        if state.pagination.page_size == 0 {
            return Err(EngineError::InvalidPageSize(0));
        }
        self.state = state;
        Ok(self)
    }

    #[cfg(test)]
    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn options(&self) -> &TableOptions<T> {
        &self.options
    }

    pub fn all_columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Result<&ColumnDef<T>, EngineError> {
        self.columns
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::UnknownColumn(id.to_string()))
    }

    pub fn headers(&self) -> Vec<Header> {
        self.visible_columns()
            .into_iter()
            .map(|column| Header {
                id: column.id,
                label: column.header,
                sort: self.sort_direction(column.id),
                sort_index: self.sort_index(column.id),
                can_sort: self.options.enable_sorting && column.can_sort(),
            })
            .collect()
    }

    // ------------------------------ Row models ------------------------------ //

    pub fn core_row_model(&self) -> RowModel<'_, T> {
        RowModel {
            rows: row::build_rows(&self.data, self.options.get_sub_rows, 0, None),
        }
    }

    pub fn filtered_row_model(&self) -> RowModel<'_, T> {
        let core = self.core_row_model();
        if !self.options.enable_filtering || self.state.global_filter.is_empty() {
            return core;
        }
        let needle = self.state.global_filter.to_lowercase();
        RowModel {
            rows: filtering::filter_rows(core.rows, &self.columns, &needle),
        }
    }

    pub fn sorted_row_model(&self) -> RowModel<'_, T> {
        let filtered = self.filtered_row_model();
        if !self.options.enable_sorting || self.state.sorting.is_empty() {
            return filtered;
        }
        let sorts = self.resolved_sorting();
        RowModel {
            rows: sorting::sort_rows(filtered.rows, &sorts),
        }
    }

    /// All rows that would be shown without pagination.
    pub fn pre_pagination_row_model(&self) -> RowModel<'_, T> {
        let sorted = self.sorted_row_model();
        if !self.options.enable_expanding {
            return sorted;
        }
        let mut rows = Vec::with_capacity(sorted.len());
        expanding::expand_rows(sorted.rows, &self.state.expanded, &mut rows);
        RowModel { rows }
    }

    /// The final projection, i.e. the rows of the current page.
    pub fn row_model(&self) -> RowModel<'_, T> {
        let all = self.pre_pagination_row_model();
        if !self.options.enable_pagination {
            return all;
        }
        let pagination = self.state.pagination;
        let rows = all
            .rows
            .into_iter()
            .skip(pagination.page_index * pagination.page_size)
            .take(pagination.page_size)
            .collect::<Vec<_>>();
        trace!(
            "Page {} (size {}) holds {} rows",
            pagination.page_index,
            pagination.page_size,
            rows.len()
        );
        RowModel { rows }
    }

    // -------------------------------- Cells --------------------------------- //

    pub fn render_cell(&self, row: &Row<'_, T>, column: &ColumnDef<T>) -> String {
        let ctx = CellContext {
            row,
            value: column.value(row.original),
            is_selected: self.is_row_selected(&row.id),
            is_some_selected: self.is_some_selected(row),
            is_expanded: self.is_row_expanded(&row.id),
            can_expand: self.can_expand(row),
        };
        (column.cell)(&ctx)
    }

    fn reset_page_index(&mut self) {
        if self.options.auto_reset_page_index {
            self.state.pagination.page_index = 0;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn row_model_without_state_returns_all_top_level_rows() {
        let table = table(vec![item("a", 1), item("b", 2), item("c", 3)]);
        let model = table.row_model();
        assert_eq!(model.len(), 3);
        assert_eq!(names(&model), vec!["a", "b", "c"]);
    }

    #[test]
    fn with_state_rejects_unknown_visibility_keys() {
        let mut state = TableState::default();
        state.column_visibility.insert("nope".into(), false);
        let result = table(vec![item("a", 1)]).with_state(state);
        assert!(matches!(result, Err(EngineError::UnknownColumn(id)) if id == "nope"));
    }

    #[test]
    fn headers_report_sortability() {
        let table = table(vec![item("a", 1)]);
        let headers = table.headers();
        assert_eq!(headers.len(), 3);
        assert!(!headers[0].can_sort);
        assert!(headers[1].can_sort);
        assert_eq!(headers[2].label, "Age");
    }

    #[test]
    fn render_cell_uses_column_rule() {
        let mut table = table(vec![item("a", 1)]);
        table.toggle_row_selected(&RowId::from("0")).unwrap();
        let model = table.row_model();
        let row = &model.rows[0];
        assert_eq!(table.render_cell(row, &table.all_columns()[0]), "[x]");
        assert_eq!(table.render_cell(row, &table.all_columns()[1]), "a");
        assert_eq!(table.render_cell(row, &table.all_columns()[2]), "1");
    }

    #[test]
    fn pipeline_filters_sorts_expands_and_paginates() {
        let mut table = table(vec![
            parent("zed", 50, vec![item("zed-b", 2), item("zed-a", 1)]),
            item("amy", 20),
            item("bob", 30),
        ]);
        table.toggle_sorting("age", false).unwrap();
        table.toggle_row_expanded(&RowId::from("0")).unwrap();
        table.set_page_size(3).unwrap();

        // amy, bob, zed, zed-a, zed-b
        assert_eq!(table.pre_pagination_row_model().len(), 5);
        assert_eq!(names(&table.row_model()), vec!["amy", "bob", "zed"]);

        table.next_page();
        assert_eq!(names(&table.row_model()), vec!["zed-a", "zed-b"]);

        table.set_global_filter("zed");
        assert_eq!(table.page_index(), 0);
        assert_eq!(names(&table.row_model()), vec!["zed", "zed-a", "zed-b"]);
    }
}
