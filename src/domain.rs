use clap::ValueEnum;
use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;
use tracing_error::SpanTrace;

use crate::engine::EngineError;

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 25, 50];

pub const HELP_TEXT: &str = "\
 q        Quit
 ?        Show this help
 Esc      Close popup / leave filter input

 Arrows   Move cursor (also h j k l)
 g / G    First / last row on screen

 s        Sort by column (asc, desc, off)
 S        Add column to multi sort
 x        Clear sorting
 /        Filter all columns
 1-9      Show / hide column

 Space    Expand / collapse row
 e        Expand / collapse all rows
 Enter    Select row
 a        Select all rows on page
 u        Clear selection

 n / p    Next / previous page
 N / P    Last / first page
 z        Cycle rows per page (5, 10, 25, 50)

 c / C    Copy cell / row to clipboard";

#[derive(Debug, thiserror::Error)]
pub enum RVError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("request failed: {source}")]
    Request {
        source: reqwest::Error,
        context: SpanTrace,
    },
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },
    #[error("could not parse rows: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Table(#[from] EngineError),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
}

impl From<reqwest::Error> for RVError {
    fn from(err: reqwest::Error) -> Self {
        RVError::Request {
            source: err,
            context: SpanTrace::capture(),
        }
    }
}

/// Which column layout and row models the table is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Plain rows, sorting only
    Flat,
    /// Rows with sub rows, selection, filtering and pagination
    Nested,
}

#[derive(Debug, Clone, Setters)]
pub struct RVConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub debounce_ms: u64,
    pub page_size: usize,
    pub variant: Variant,
}

impl Default for RVConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 40,
            debounce_ms: 500,
            page_size: 10,
            variant: Variant::Nested,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveBeginning,
    MoveEnd,
    ToggleSort,
    ToggleMultiSort,
    ClearSorting,
    Filter,
    ToggleExpand,
    ToggleExpandAll,
    ToggleSelect,
    SelectAllOnPage,
    ClearSelection,
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    CyclePageSize,
    ToggleColumn(usize),
    CopyCell,
    CopyRow,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}
