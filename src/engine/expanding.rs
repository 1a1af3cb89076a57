use std::collections::HashSet;

use tracing::trace;

use super::row::{Row, RowId};
use super::state::Expanded;
use super::{EngineError, Table};

// Flattens the tree depth first. Sub rows follow their parent only if it is expanded.
pub(super) fn expand_rows<'a, T>(
    rows: Vec<Row<'a, T>>,
    expanded: &Expanded,
    out: &mut Vec<Row<'a, T>>,
) {
    for row in rows {
        if row.has_sub_rows() && expanded.contains(&row.id) {
            let sub_rows = row.sub_rows.clone();
            out.push(row);
            expand_rows(sub_rows, expanded, out);
        } else {
            out.push(row);
        }
    }
}

impl<T: Sync> Table<T> {
    pub fn can_expand(&self, row: &Row<'_, T>) -> bool {
        self.options.enable_expanding && row.has_sub_rows()
    }

    pub fn is_row_expanded(&self, id: &RowId) -> bool {
        self.state.expanded.contains(id)
    }

    pub fn is_all_rows_expanded(&self) -> bool {
        match &self.state.expanded {
            Expanded::All => true,
            Expanded::Rows(ids) => {
                let expandable = self.expandable_row_ids();
                !expandable.is_empty() && expandable.iter().all(|id| ids.contains(id))
            }
        }
    }

    pub fn toggle_row_expanded(&mut self, id: &RowId) -> Result<(), EngineError> {
        let expandable = {
            let core = self.core_row_model();
            let row = Row::find(&core.rows, id)
                .ok_or_else(|| EngineError::UnknownRow(id.clone()))?;
            row.has_sub_rows()
        };
        if !self.options.enable_expanding || !expandable {
            trace!("Row {id} can not be expanded");
            return Ok(());
        }

        // Collapsing a single row out of "all" needs the explicit list of expanded rows
        if self.state.expanded == Expanded::All {
            self.state.expanded = Expanded::Rows(self.expandable_row_ids());
        }
        if let Expanded::Rows(ids) = &mut self.state.expanded
            && !ids.remove(id)
        {
            ids.insert(id.clone());
        }
        trace!("Row {id} expanded: {}", self.is_row_expanded(id));
        self.clamp_page_index();
        Ok(())
    }

    pub fn toggle_all_rows_expanded(&mut self, expanded: bool) {
        if !self.options.enable_expanding {
            return;
        }
        self.state.expanded = if expanded {
            Expanded::All
        } else {
            Expanded::default()
        };
        self.clamp_page_index();
    }

    fn expandable_row_ids(&self) -> HashSet<RowId> {
        let mut ids = HashSet::new();
        for row in self.core_row_model().rows.iter() {
            row.for_each(&mut |r| {
                if r.has_sub_rows() {
                    ids.insert(r.id.clone());
                }
            });
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    fn tree() -> Vec<Item> {
        vec![
            parent("root", 1, vec![item("leaf-a", 2), parent("mid", 3, vec![item("deep", 4)])]),
            item("single", 5),
        ]
    }

    #[test]
    fn collapsed_rows_hide_sub_rows() {
        let table = table(tree());
        assert_eq!(names(&table.row_model()), vec!["root", "single"]);
    }

    #[test]
    fn expanding_shows_direct_children_only() {
        let mut table = table(tree());
        table.toggle_row_expanded(&RowId::from("0")).unwrap();
        let model = table.row_model();
        assert_eq!(names(&model), vec!["root", "leaf-a", "mid", "single"]);
        let depths: Vec<usize> = model.rows.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 0]);
        assert!(table.can_expand(&model.rows[2]));
        assert!(!table.can_expand(&model.rows[1]));

        table.toggle_row_expanded(&RowId::from("0.1")).unwrap();
        assert_eq!(
            names(&table.row_model()),
            vec!["root", "leaf-a", "mid", "deep", "single"]
        );

        table.toggle_row_expanded(&RowId::from("0")).unwrap();
        assert_eq!(names(&table.row_model()), vec!["root", "single"]);
    }

    #[test]
    fn expand_all_and_collapse_one() {
        let mut table = table(tree());
        table.toggle_all_rows_expanded(true);
        assert!(table.is_all_rows_expanded());
        assert_eq!(table.row_model().len(), 5);

        table.toggle_row_expanded(&RowId::from("0.1")).unwrap();
        assert!(!table.is_all_rows_expanded());
        assert_eq!(
            names(&table.row_model()),
            vec!["root", "leaf-a", "mid", "single"]
        );

        table.toggle_all_rows_expanded(false);
        assert_eq!(table.row_model().len(), 2);
    }

    #[test]
    fn leaf_and_unknown_rows() {
        let mut table = table(tree());
        table.toggle_row_expanded(&RowId::from("1")).unwrap();
        assert!(!table.is_row_expanded(&RowId::from("1")));
        assert_eq!(
            table.toggle_row_expanded(&RowId::from("9")),
            Err(EngineError::UnknownRow(RowId::from("9")))
        );
    }

    #[test]
    fn collapsing_keeps_page_index_on_an_existing_page() {
        let children = |n: &'static str| (0..10).map(|i| item(n, i)).collect::<Vec<_>>();
        let mut table = table(vec![
            parent("a", 1, children("a-child")),
            parent("b", 2, children("b-child")),
            parent("c", 3, children("c-child")),
        ]);
        table.toggle_all_rows_expanded(true);
        table.last_page();
        assert_eq!(table.page_index(), 3);

        table.toggle_all_rows_expanded(false);
        assert_eq!(table.page_index(), 0);
        assert_eq!(names(&table.row_model()), vec!["a", "b", "c"]);

        table.toggle_all_rows_expanded(true);
        table.last_page();
        table.toggle_row_expanded(&RowId::from("2")).unwrap();
        table.toggle_row_expanded(&RowId::from("1")).unwrap();
        // a + 10 children + b + c
        assert_eq!(table.page_index(), 1);
        assert_eq!(table.row_model().len(), 3);
    }
}
