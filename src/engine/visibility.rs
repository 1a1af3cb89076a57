use tracing::trace;

use super::column::ColumnDef;
use super::{EngineError, Table};

impl<T: Sync> Table<T> {
    pub fn is_column_visible(&self, column_id: &str) -> bool {
        self.state
            .column_visibility
            .get(column_id)
            .copied()
            .unwrap_or(true)
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDef<T>> {
        self.columns
            .iter()
            .filter(|c| self.is_column_visible(c.id))
            .collect()
    }

    pub fn set_column_visibility(&mut self, column_id: &str, visible: bool) -> Result<(), EngineError> {
        let column = self.column(column_id)?;
        if !column.enable_hiding {
            trace!("Column {column_id} can not be hidden");
            return Ok(());
        }
        self.state
            .column_visibility
            .insert(column_id.to_string(), visible);
        Ok(())
    }

    pub fn toggle_column_visibility(&mut self, column_id: &str) -> Result<(), EngineError> {
        let visible = self.is_column_visible(column_id);
        self.set_column_visibility(column_id, !visible)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::{CellValue, ColumnDef, Table, TableOptions};
    use super::*;

    #[test]
    fn toggling_hides_and_reshows_a_column() {
        let mut table = table(vec![item("a", 1)]);
        table.toggle_column_visibility("name").unwrap();
        assert!(!table.is_column_visible("name"));
        let ids: Vec<&str> = table.visible_columns().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["select", "age"]);
        assert_eq!(table.headers().len(), 2);

        table.toggle_column_visibility("name").unwrap();
        assert_eq!(table.visible_columns().len(), 3);
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let mut table = table(vec![item("a", 1)]);
        assert_eq!(
            table.toggle_column_visibility("salary"),
            Err(EngineError::UnknownColumn("salary".into()))
        );
        assert!(table.state().column_visibility.is_empty());
    }

    #[test]
    fn pinned_columns_ignore_toggles() {
        let columns = vec![
            ColumnDef::accessor("name", "Name", |i: &Item| CellValue::from(i.name)).enable_hiding(false),
        ];
        let mut table = Table::new(vec![item("a", 1)], columns, TableOptions::default());
        table.toggle_column_visibility("name").unwrap();
        assert!(table.is_column_visible("name"));
    }
}
