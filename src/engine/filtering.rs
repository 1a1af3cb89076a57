use rayon::prelude::*;
use tracing::trace;

use super::Table;
use super::column::ColumnDef;
use super::row::Row;

// A row passes when any column with a value contains the needle. Rows that pass keep
// their sub rows filtered the same way, rows that fail are dropped with their subtree.
pub(super) fn filter_rows<'a, T: Sync>(
    rows: Vec<Row<'a, T>>,
    columns: &[ColumnDef<T>],
    needle: &str,
) -> Vec<Row<'a, T>> {
    rows.into_par_iter()
        .filter_map(|mut row| {
            if row_matches(&row, columns, needle) {
                let sub_rows = std::mem::take(&mut row.sub_rows);
                row.sub_rows = filter_rows(sub_rows, columns, needle);
                Some(row)
            } else {
                None
            }
        })
        .collect()
}

fn row_matches<T>(row: &Row<'_, T>, columns: &[ColumnDef<T>], needle: &str) -> bool {
    columns
        .iter()
        .filter_map(|column| column.value(row.original))
        .any(|value| value.contains(needle))
}

impl<T: Sync> Table<T> {
    pub fn global_filter(&self) -> &str {
        &self.state.global_filter
    }

    pub fn set_global_filter(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value == self.state.global_filter {
            return;
        }
        trace!("Global filter: \"{}\" -> \"{}\"", self.state.global_filter, value);
        self.state.global_filter = value;
        self.reset_page_index();
        self.clamp_page_index();
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::{RowId, TableOptions};

    #[test]
    fn empty_filter_keeps_everything() {
        let mut table = table(vec![item("a", 1), item("b", 2)]);
        table.set_global_filter("");
        assert_eq!(table.row_model().len(), 2);
    }

    #[test]
    fn filter_matches_any_column_case_insensitive() {
        let mut table = table(vec![item("Alice", 31), item("bob", 42), item("carol", 13)]);
        table.set_global_filter("ALI");
        assert_eq!(names(&table.row_model()), vec!["Alice"]);

        // numbers match on their rendered form
        table.set_global_filter("3");
        assert_eq!(names(&table.row_model()), vec!["Alice", "carol"]);
    }

    #[test]
    fn filter_drops_subtree_of_failing_parent_and_filters_children() {
        let mut table = table(vec![
            parent("team-x", 1, vec![item("x-lead", 2), item("other", 3)]),
            parent("misc", 4, vec![item("x-dev", 5)]),
        ]);
        table.toggle_all_rows_expanded(true);
        table.set_global_filter("x");
        // "misc" fails, so its matching child is not shown either
        assert_eq!(names(&table.row_model()), vec!["team-x", "x-lead"]);
        assert!(table.row_model().rows[0].has_sub_rows());
    }

    #[test]
    fn disabled_filtering_ignores_filter_value() {
        let mut table = table(vec![item("a", 1), item("b", 2)]);
        table.options = TableOptions::default().enable_filtering(false);
        table.set_global_filter("a");
        assert_eq!(table.global_filter(), "a");
        assert_eq!(table.row_model().len(), 2);
        assert!(!table.is_row_selected(&RowId::from("0")));
    }

    #[test]
    fn filter_without_page_reset_stays_on_an_existing_page() {
        let mut table = table((0..30).map(|i| item(if i < 3 { "keep" } else { "drop" }, i)).collect());
        table.options = TableOptions::default().auto_reset_page_index(false);
        table.last_page();
        assert_eq!(table.page_index(), 2);
        table.set_global_filter("keep");
        assert_eq!(table.page_index(), 0);
        assert_eq!(table.row_model().len(), 3);
    }
}
