use tracing::trace;

use super::row::{Row, RowId};
use super::{EngineError, Table};

impl<T: Sync> Table<T> {
    pub fn is_row_selected(&self, id: &RowId) -> bool {
        self.state.row_selection.contains(id)
    }

    /// True if the row itself is not selected but at least one of its descendants is.
    pub fn is_some_selected(&self, row: &Row<'_, T>) -> bool {
        if self.is_row_selected(&row.id) {
            return false;
        }
        let mut some = false;
        for sub_row in row.sub_rows.iter() {
            sub_row.for_each(&mut |r| some |= self.is_row_selected(&r.id));
        }
        some
    }

    pub fn selected_row_count(&self) -> usize {
        self.state.row_selection.len()
    }

    pub fn toggle_row_selected(&mut self, id: &RowId) -> Result<(), EngineError> {
        let ids = {
            let core = self.core_row_model();
            let row = Row::find(&core.rows, id).ok_or_else(|| EngineError::UnknownRow(id.clone()))?;
            self.selection_targets(std::slice::from_ref(row))
        };
        let value = !self.is_row_selected(id);
        self.set_selected(ids, value);
        Ok(())
    }

    pub fn is_all_page_rows_selected(&self) -> bool {
        let page = self.row_model();
        !page.is_empty() && page.rows.iter().all(|r| self.is_row_selected(&r.id))
    }

    pub fn toggle_all_page_rows_selected(&mut self, value: bool) {
        let ids = {
            let page = self.row_model();
            self.selection_targets(&page.rows)
        };
        self.set_selected(ids, value);
    }

    pub fn clear_row_selection(&mut self) {
        self.state.row_selection.clear();
    }

    // Rows affected by selecting `rows`, including their sub rows if enabled.
    fn selection_targets(&self, rows: &[Row<'_, T>]) -> Vec<RowId> {
        let mut ids = Vec::new();
        for row in rows {
            if self.options.enable_sub_row_selection {
                row.for_each(&mut |r| ids.push(r.id.clone()));
            } else {
                ids.push(row.id.clone());
            }
        }
        ids
    }

    fn set_selected(&mut self, ids: Vec<RowId>, value: bool) {
        if !self.options.enable_row_selection {
            trace!("Row selection is disabled");
            return;
        }
        for id in ids {
            if value {
                self.state.row_selection.insert(id);
            } else {
                self.state.row_selection.remove(&id);
            }
        }
        trace!("{} rows selected", self.state.row_selection.len());
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::TableOptions;
    use super::*;

    #[test]
    fn toggling_selects_and_deselects() {
        let mut table = table(vec![item("a", 1), item("b", 2)]);
        let id = RowId::from("1");
        table.toggle_row_selected(&id).unwrap();
        assert!(table.is_row_selected(&id));
        assert_eq!(table.selected_row_count(), 1);
        table.toggle_row_selected(&id).unwrap();
        assert!(!table.is_row_selected(&id));
        assert!(table.toggle_row_selected(&RowId::from("7")).is_err());
    }

    #[test]
    fn selecting_a_parent_selects_its_sub_rows() {
        let mut table = table(vec![parent("p", 1, vec![item("c1", 2), item("c2", 3)])]);
        table.toggle_row_selected(&RowId::from("0")).unwrap();
        assert_eq!(table.selected_row_count(), 3);

        // deselecting one child leaves the parent partially selected
        table.toggle_row_selected(&RowId::from("0")).unwrap();
        table.toggle_row_selected(&RowId::from("0.1")).unwrap();
        let core = table.core_row_model();
        assert!(!table.is_row_selected(&RowId::from("0")));
        assert!(table.is_some_selected(&core.rows[0]));
    }

    #[test]
    fn select_all_on_page_only_touches_current_page() {
        let mut table = table((0..15).map(|i| item("row", i)).collect());
        table.toggle_all_page_rows_selected(true);
        assert!(table.is_all_page_rows_selected());
        assert_eq!(table.selected_row_count(), 10);

        table.next_page();
        assert!(!table.is_all_page_rows_selected());
        table.toggle_all_page_rows_selected(true);
        assert_eq!(table.selected_row_count(), 15);

        table.toggle_all_page_rows_selected(false);
        assert_eq!(table.selected_row_count(), 10);
    }

    #[test]
    fn disabled_selection_is_a_no_op() {
        let mut table = table(vec![item("a", 1)]);
        table.options = TableOptions::default().enable_row_selection(false);
        table.toggle_row_selected(&RowId::from("0")).unwrap();
        table.toggle_all_page_rows_selected(true);
        assert_eq!(table.selected_row_count(), 0);
        table.clear_row_selection();
    }
}
