use std::fmt;

pub type SubRows<T> = fn(&T) -> &[T];

/// Row identifier, the index path of the row in the data ("0", "0.2", "0.2.1").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub String);

impl RowId {
    fn child(parent: Option<&RowId>, index: usize) -> Self {
        match parent {
            Some(p) => RowId(format!("{}.{index}", p.0)),
            None => RowId(index.to_string()),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId(s.to_string())
    }
}

pub struct Row<'a, T> {
    pub id: RowId,
    pub index: usize, // Position within the parent's children in the data
    pub depth: usize,
    pub parent_id: Option<RowId>,
    pub original: &'a T,
    pub sub_rows: Vec<Row<'a, T>>,
}

// Derive would require T: Clone, rows only hold a reference to T.
impl<T> Clone for Row<'_, T> {
    fn clone(&self) -> Self {
        Row {
            id: self.id.clone(),
            index: self.index,
            depth: self.depth,
            parent_id: self.parent_id.clone(),
            original: self.original,
            sub_rows: self.sub_rows.clone(),
        }
    }
}

impl<T> fmt::Debug for Row<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("sub_rows", &self.sub_rows.len())
            .finish()
    }
}

impl<'a, T> Row<'a, T> {
    pub fn has_sub_rows(&self) -> bool {
        !self.sub_rows.is_empty()
    }

    /// Depth first walk over this row and all its descendants.
    pub fn for_each(&self, f: &mut impl FnMut(&Row<'a, T>)) {
        f(self);
        for sub_row in self.sub_rows.iter() {
            sub_row.for_each(f);
        }
    }

    pub fn find<'r>(rows: &'r [Row<'a, T>], id: &RowId) -> Option<&'r Row<'a, T>> {
        for row in rows {
            if &row.id == id {
                return Some(row);
            }
            // Ids are index paths, only descend into a matching prefix
            if id.0.starts_with(&format!("{}.", row.id.0))
                && let Some(found) = Row::find(&row.sub_rows, id)
            {
                return Some(found);
            }
        }
        None
    }
}

pub fn build_rows<'a, T>(
    data: &'a [T],
    get_sub_rows: Option<SubRows<T>>,
    depth: usize,
    parent: Option<&RowId>,
) -> Vec<Row<'a, T>> {
    data.iter()
        .enumerate()
        .map(|(index, original)| {
            let id = RowId::child(parent, index);
            let sub_rows = match get_sub_rows {
                Some(f) => build_rows(f(original), Some(f), depth + 1, Some(&id)),
                None => Vec::new(),
            };
            Row {
                id,
                index,
                depth,
                parent_id: parent.cloned(),
                original,
                sub_rows,
            }
        })
        .collect()
}

/// A projection of rows after one or more pipeline stages.
#[derive(Debug)]
pub struct RowModel<'a, T> {
    pub rows: Vec<Row<'a, T>>,
}

impl<'a, T> RowModel<'a, T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id.clone()).collect()
    }
}
