use std::cmp::Ordering;
use std::fmt;

use derive_setters::Setters;

use super::row::Row;
use super::state::SortDirection;

pub type Accessor<T> = fn(&T) -> CellValue;
pub type CellRenderer<T> = fn(&CellContext<'_, T>) -> String;

/// Value read from a record by a column accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(v) => write!(f, "{v}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl CellValue {
    /// Integers compare numerically, everything else alphanumerically.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => compare_alphanumeric(a, b),
            (a, b) => compare_alphanumeric(&a.to_string(), &b.to_string()),
        }
    }

    /// Case insensitive substring match. `needle` has to be lowercase already.
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            CellValue::Integer(v) => v.to_string().contains(needle),
            CellValue::Text(s) => s.to_lowercase().contains(needle),
        }
    }
}

// Compares lowercased strings chunk by chunk, runs of digits are compared as numbers.
// "item2" < "item10"
pub fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let mut chunks_a = Chunks::new(&a);
    let mut chunks_b = Chunks::new(&b);

    loop {
        match (chunks_a.next(), chunks_b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(n), Ok(m)) => n.cmp(&m).then_with(|| x.cmp(y)),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

// Splits a string into maximal runs of digits and non-digits.
struct Chunks<'s> {
    rest: &'s str,
}

impl<'s> Chunks<'s> {
    fn new(s: &'s str) -> Self {
        Self { rest: s }
    }
}

impl<'s> Iterator for Chunks<'s> {
    type Item = &'s str;

    fn next(&mut self) -> Option<&'s str> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

/// Everything a cell render rule gets to see.
pub struct CellContext<'r, T> {
    pub row: &'r Row<'r, T>,
    pub value: Option<CellValue>,
    pub is_selected: bool,
    pub is_some_selected: bool,
    pub is_expanded: bool,
    pub can_expand: bool,
}

pub fn render_value<T>(ctx: &CellContext<'_, T>) -> String {
    ctx.value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// Static description of one column: where its value comes from and how it is shown.
#[derive(Setters)]
pub struct ColumnDef<T> {
    #[setters(skip)]
    pub id: &'static str,
    #[setters(skip)]
    pub header: &'static str,
    #[setters(skip)]
    pub accessor: Option<Accessor<T>>,
    pub cell: CellRenderer<T>,
    pub enable_sorting: bool,
    pub enable_hiding: bool,
}

impl<T> ColumnDef<T> {
    /// Column backed by a value of the record.
    pub fn accessor(id: &'static str, header: &'static str, accessor: Accessor<T>) -> Self {
        Self {
            id,
            header,
            accessor: Some(accessor),
            cell: render_value,
            enable_sorting: true,
            enable_hiding: true,
        }
    }

    /// Column without a value, only rendered (e.g. a selection checkbox).
    pub fn display(id: &'static str, header: &'static str, cell: CellRenderer<T>) -> Self {
        Self {
            id,
            header,
            accessor: None,
            cell,
            enable_sorting: false,
            enable_hiding: true,
        }
    }

    pub fn value(&self, record: &T) -> Option<CellValue> {
        self.accessor.map(|accessor| accessor(record))
    }

    pub fn can_sort(&self) -> bool {
        self.enable_sorting && self.accessor.is_some()
    }
}

/// A visible header as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub id: &'static str,
    pub label: &'static str,
    pub sort: Option<SortDirection>,
    pub sort_index: Option<usize>,
    pub can_sort: bool,
}
