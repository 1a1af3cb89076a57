use tracing::trace;

use super::{EngineError, Table};

impl<T: Sync> Table<T> {
    pub fn page_index(&self) -> usize {
        self.state.pagination.page_index
    }

    pub fn page_size(&self) -> usize {
        self.state.pagination.page_size
    }

    /// Number of pages over all rows visible before pagination. Zero for an empty table.
    pub fn page_count(&self) -> usize {
        if !self.options.enable_pagination {
            return 1;
        }
        self.pre_pagination_row_model()
            .len()
            .div_ceil(self.state.pagination.page_size)
    }

    pub fn can_previous_page(&self) -> bool {
        self.options.enable_pagination && self.state.pagination.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.options.enable_pagination && self.state.pagination.page_index + 1 < self.page_count()
    }

    pub fn next_page(&mut self) {
        if self.can_next_page() {
            self.state.pagination.page_index += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.can_previous_page() {
            self.state.pagination.page_index -= 1;
        }
    }

    pub fn first_page(&mut self) {
        self.state.pagination.page_index = 0;
    }

    pub fn last_page(&mut self) {
        self.set_page_index(self.page_count().saturating_sub(1));
    }

    // Collapsing or filtering rows can leave the index past the last page
    pub(super) fn clamp_page_index(&mut self) {
        self.set_page_index(self.page_index());
    }

    /// Moves to `index`, clamped to the last existing page.
    pub fn set_page_index(&mut self, index: usize) {
        let last = self.page_count().saturating_sub(1);
        self.state.pagination.page_index = index.min(last);
    }

    /// Changes the page size, keeping the first row of the current page on screen.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), EngineError> {
        if page_size == 0 {
            return Err(EngineError::InvalidPageSize(page_size));
        }
        let pagination = &mut self.state.pagination;
        let top_row = pagination.page_size * pagination.page_index;
        pagination.page_index = top_row / page_size;
        pagination.page_size = page_size;
        trace!(
            "Page size {} at page {}",
            pagination.page_size, pagination.page_index
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::{EngineError, TableOptions};

    fn numbered(n: i64) -> Vec<Item> {
        (0..n).map(|i| item("row", i)).collect()
    }

    #[test]
    fn pages_hold_at_most_page_size_rows() {
        let mut table = table(numbered(60));
        table.set_page_size(25).unwrap();
        assert_eq!(table.page_count(), 3);
        assert_eq!(table.row_model().len(), 25);
        table.next_page();
        assert_eq!(table.row_model().len(), 25);
        table.next_page();
        assert_eq!(table.row_model().len(), 10);
        assert!(!table.can_next_page());
        table.next_page();
        assert_eq!(table.page_index(), 2);
    }

    #[test]
    fn previous_page_stops_at_first_page() {
        let mut table = table(numbered(12));
        assert!(!table.can_previous_page());
        table.previous_page();
        assert_eq!(table.page_index(), 0);
        table.last_page();
        assert_eq!(table.page_index(), 1);
        assert!(table.can_previous_page());
        table.previous_page();
        assert_eq!(table.page_index(), 0);
    }

    #[test]
    fn page_size_change_keeps_top_row_visible() {
        let mut table = table(numbered(100));
        table.set_page_size(5).unwrap();
        table.set_page_index(5); // rows 25..30
        table.set_page_size(10).unwrap();
        assert_eq!(table.page_index(), 2); // rows 20..30
        let first = table.row_model().rows[0].original.age;
        assert_eq!(first, 20);
    }

    #[test]
    fn page_index_is_clamped_and_zero_size_rejected() {
        let mut table = table(numbered(15));
        table.set_page_index(40);
        assert_eq!(table.page_index(), 1);
        assert_eq!(table.set_page_size(0), Err(EngineError::InvalidPageSize(0)));
        assert_eq!(table.page_size(), 10);
    }

    #[test]
    fn empty_table_has_no_pages() {
        let table = table(vec![]);
        assert_eq!(table.page_count(), 0);
        assert!(!table.can_next_page());
        assert!(table.row_model().is_empty());
    }

    #[test]
    fn disabled_pagination_returns_every_row() {
        let mut table = table(numbered(30));
        table.options = TableOptions::default().enable_pagination(false);
        assert_eq!(table.row_model().len(), 30);
        assert_eq!(table.page_count(), 1);
        table.next_page();
        assert_eq!(table.page_index(), 0);
    }
}
