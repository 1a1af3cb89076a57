use std::collections::{HashMap, HashSet};

use super::row::RowId;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSort {
    pub id: String,
    pub desc: bool,
}

impl ColumnSort {
    pub fn new(id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            id: id.into(),
            desc: direction == SortDirection::Descending,
        }
    }

    pub fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}

/// Which rows show their sub rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expanded {
    All,
    Rows(HashSet<RowId>),
}

impl Default for Expanded {
    fn default() -> Self {
        Expanded::Rows(HashSet::new())
    }
}

impl Expanded {
    pub fn contains(&self, id: &RowId) -> bool {
        match self {
            Expanded::All => true,
            Expanded::Rows(ids) => ids.contains(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// The complete mutable state of a table. Only changed through `Table` operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    pub sorting: Vec<ColumnSort>,
    pub global_filter: String,
    pub expanded: Expanded,
    pub column_visibility: HashMap<String, bool>, // Missing key means visible
    pub pagination: PaginationState,
    pub row_selection: HashSet<RowId>,
}
