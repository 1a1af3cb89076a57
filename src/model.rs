use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::columns::{self, ID_COLUMN};
use crate::debounce::Debounced;
use crate::domain::{HELP_TEXT, Message, PAGE_SIZE_OPTIONS, RVConfig, RVError};
use crate::engine::{ColumnDef, EngineError, Header, RowId, SortDirection, Table};
use crate::inputter::{InputResult, Inputter};
use crate::record::Person;
use crate::ui::{
    CMDLINE_HEIGHT, COLUMN_WIDTH_MARGIN, STATUSLINE_HEIGHT, TABLE_HEADER_HEIGHT,
    TOGGLE_BAR_HEIGHT,
};

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    LOADING,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
}

/// One entry of the column visibility bar. Pinned columns have no key.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnToggle {
    pub key: Option<usize>,
    pub label: String,
    pub visible: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaginationView {
    pub enabled: bool,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub can_previous: bool,
    pub can_next: bool,
    pub selected: usize,
}

pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub toggles: Vec<ColumnToggle>,
    pub pagination: PaginationView,
    pub nrows: usize, // Rows on the current page
    pub selected_row: usize,
    pub selected_column: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub cmdinput: InputResult,
    pub active_cmdinput: bool,
    pub filter: String,
    pub filter_pending: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            table: Vec::new(),
            toggles: Vec::new(),
            pagination: PaginationView::default(),
            nrows: 0,
            selected_row: 0,
            selected_column: 0,
            show_popup: false,
            popup_message: String::new(),
            layout: UILayout::default(),
            cmdinput: InputResult::default(),
            active_cmdinput: false,
            filter: String::new(),
            filter_pending: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub statusline_width: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let table_height = ui_height
            .saturating_sub(TOGGLE_BAR_HEIGHT)
            .saturating_sub(TABLE_HEADER_HEIGHT)
            .saturating_sub(STATUSLINE_HEIGHT)
            .saturating_sub(CMDLINE_HEIGHT);

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width: ui_width,
            table_height,
            statusline_width: ui_width,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: RVConfig,
    pub status: Status,
    name: String,
    modus: Modus,
    previous_modus: Modus,
    table: Option<Table<Person>>,
    filter: Debounced<String>,
    curser_row: usize, // Index into the rows of the current page
    curser_column: usize,
    offset_row: usize,
    uilayout: UILayout,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &RVConfig, ui_width: usize, ui_height: usize) -> Result<Self, RVError> {
        let mut model = Self {
            config: config.clone(),
            status: Status::EMPTY,
            name: String::new(),
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            table: None,
            filter: Debounced::new(String::new(), Duration::from_millis(config.debounce_ms)),
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        model.status = Status::LOADING;
        model.update_table_data();
        model.set_status_message("Loading ...");
        Ok(model)
    }

    /// Hands the loaded rows to a fresh table. Happens once, after the first frame was drawn.
    pub fn load_rows(&mut self, name: impl Into<String>, rows: Vec<Person>) -> Result<(), RVError> {
        let nrows = rows.len();
        let table = columns::build_table(self.config.variant, rows, self.config.page_size)?;
        debug!(
            "Table ready: {} columns, {} top level rows",
            table.all_columns().len(),
            nrows
        );
        self.name = name.into();
        self.table = Some(table);
        self.status = Status::READY;
        self.curser_row = 0;
        self.curser_column = 0;
        self.offset_row = 0;
        self.update_table_data();
        self.set_status_message(format!("Loaded {nrows} rows"));
        Ok(())
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), RVError> {
        self.update_at(message, Instant::now())
    }

    /// Like `update`, with an explicit clock for the filter debounce.
    pub fn update_at(&mut self, message: Option<Message>, now: Instant) -> Result<(), RVError> {
        if let Some(value) = self.filter.poll(now).cloned() {
            self.apply_filter(value);
        }

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_table_selection_down(1),
                    Message::MoveUp => self.move_table_selection_up(1),
                    Message::MoveLeft => self.move_table_selection_left(),
                    Message::MoveRight => self.move_table_selection_right(),
                    Message::MoveBeginning => self.move_table_selection_beginning(),
                    Message::MoveEnd => self.move_table_selection_end(),
                    Message::ToggleSort => self.toggle_sorting(false),
                    Message::ToggleMultiSort => self.toggle_sorting(true),
                    Message::ClearSorting => self.clear_sorting(),
                    Message::Filter => self.enter_cmd_mode(),
                    Message::ToggleExpand => self.toggle_expand(),
                    Message::ToggleExpandAll => self.toggle_expand_all(),
                    Message::ToggleSelect => self.toggle_select(),
                    Message::SelectAllOnPage => self.select_all_on_page(),
                    Message::ClearSelection => self.clear_selection(),
                    Message::NextPage => self.change_page(Table::next_page),
                    Message::PreviousPage => self.change_page(Table::previous_page),
                    Message::FirstPage => self.change_page(Table::first_page),
                    Message::LastPage => self.change_page(Table::last_page),
                    Message::CyclePageSize => self.cycle_page_size(),
                    Message::ToggleColumn(key) => self.toggle_column(key),
                    Message::CopyCell => self.copy_table_cell(),
                    Message::CopyRow => self.copy_table_row(),
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::RawKey(_) => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit => self.exit(),
                    _ => (),
                },
                Modus::CMDINPUT => match msg {
                    Message::RawKey(key) => self.raw_input(key, now),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
            }
        }

        self.uidata.filter_pending = self.filter.is_pending();
        Ok(())
    }

    // ------------------------------ Projection ------------------------------ //

    fn update_table_data(&mut self) {
        let Some(table) = &self.table else {
            self.uidata = UIData::empty();
            self.uidata.layout = self.uilayout.clone();
            self.uidata.status_message = self.status_message.clone();
            self.uidata.last_status_message_update = self.last_status_message_update;
            return;
        };

        let page = table.row_model();
        let nrows = page.len();
        let columns = table.visible_columns();
        let headers = table.headers();
        let multi_sort = table.sorting().len() > 1;

        // Keep the curser on the page and inside the visible window
        let height = self.uilayout.table_height.max(1);
        self.curser_row = self.curser_row.min(nrows.saturating_sub(1));
        self.curser_column = self.curser_column.min(columns.len().saturating_sub(1));
        if self.curser_row < self.offset_row {
            self.offset_row = self.curser_row;
        } else if self.curser_row >= self.offset_row + height {
            self.offset_row = self.curser_row + 1 - height;
        }
        let rbegin = self.offset_row.min(nrows);
        let rend = std::cmp::min(rbegin + height, nrows);

        let mut views = Vec::with_capacity(columns.len());
        for (column, header) in columns.iter().zip(headers.iter()) {
            let data: Vec<String> = page
                .rows
                .iter()
                .map(|row| table.render_cell(row, column))
                .collect();
            let name = header_label(header, multi_sort);
            let width = column_width(&name, &data, self.config.max_column_width);
            views.push(ColumnView {
                name,
                width,
                data: data[rbegin..rend].to_vec(),
            });
        }

        // Number keys address the hideable columns only
        let mut next_key = 0;
        let toggles = table
            .all_columns()
            .iter()
            .map(|c| ColumnToggle {
                key: c.enable_hiding.then(|| {
                    next_key += 1;
                    next_key
                }),
                label: (if c.header.is_empty() { c.id } else { c.header }).to_string(),
                visible: table.is_column_visible(c.id),
            })
            .collect();

        let pagination = PaginationView {
            enabled: table.options().enable_pagination,
            page_index: table.page_index(),
            page_count: table.page_count(),
            page_size: table.page_size(),
            total_rows: table.pre_pagination_row_model().len(),
            can_previous: table.can_previous_page(),
            can_next: table.can_next_page(),
            selected: table.selected_row_count(),
        };

        trace!(
            "Table: Cr {}, Cc {}, Or {}, Rb {}, Re {}, th: {}",
            self.curser_row, self.curser_column, self.offset_row, rbegin, rend, height
        );

        self.uidata = UIData {
            name: self.name.clone(),
            table: views,
            toggles,
            pagination,
            nrows,
            selected_row: self.curser_row - rbegin.min(self.curser_row),
            selected_column: self.curser_column,
            show_popup: self.modus == Modus::POPUP,
            popup_message: if self.modus == Modus::POPUP {
                HELP_TEXT.to_string()
            } else {
                String::new()
            },
            layout: self.uilayout.clone(),
            cmdinput: self.last_input.clone(),
            active_cmdinput: self.active_cmdinput,
            filter: self.filter.value().clone(),
            filter_pending: self.filter.is_pending(),
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        };
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
    }

    fn report(&mut self, err: EngineError) {
        warn!("Rejected table action: {err}");
        self.set_status_message(err.to_string());
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.update_table_data();
    }

    fn current_row_id(&self) -> Option<RowId> {
        let table = self.table.as_ref()?;
        table
            .row_model()
            .rows
            .get(self.curser_row)
            .map(|row| row.id.clone())
    }

    fn current_column(&self) -> Option<&ColumnDef<Person>> {
        let table = self.table.as_ref()?;
        table.visible_columns().get(self.curser_column).copied()
    }

    // -------------------- Control handling functions ---------------------- //

    fn toggle_sorting(&mut self, multi: bool) {
        let Some(column_id) = self.current_column().map(|c| c.id) else {
            return;
        };
        // Header action of the id column never sorts
        if column_id == ID_COLUMN {
            trace!("Sorting suppressed for column {column_id}");
            return;
        }
        let Some(table) = self.table.as_mut() else {
            return;
        };
        match table.toggle_sorting(column_id, multi) {
            Ok(()) => {
                self.curser_row = 0;
                self.offset_row = 0;
                self.update_table_data();
            }
            Err(e) => self.report(e),
        }
    }

    fn clear_sorting(&mut self) {
        if let Some(table) = self.table.as_mut()
            && !table.sorting().is_empty()
        {
            table.clear_sorting();
            self.curser_row = 0;
            self.offset_row = 0;
            self.update_table_data();
            self.set_status_message("Sorting cleared");
        }
    }

    fn enter_cmd_mode(&mut self) {
        let filtering = self
            .table
            .as_ref()
            .is_some_and(|t| t.options().enable_filtering);
        if !filtering {
            self.set_status_message("Filtering is not available for this table");
            return;
        }
        trace!("Entering filter input ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.active_cmdinput = true;
        let current = self.filter.raw().clone();
        self.input.set(&current);
        self.last_input = self.input.get();

        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
    }

    fn raw_input(&mut self, key: KeyEvent, now: Instant) {
        if !self.active_cmdinput {
            return;
        }
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            // Only the debounced value reaches the table
            self.filter.set(self.last_input.input.clone(), now);
        }
        if self.last_input.finished {
            trace!("Leaving filter input with \"{}\"", self.last_input.input);
            self.active_cmdinput = false;
            self.modus = self.previous_modus;
            self.previous_modus = Modus::CMDINPUT;
        }
        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
    }

    fn apply_filter(&mut self, value: String) {
        let Some(table) = self.table.as_mut() else {
            return;
        };
        table.set_global_filter(value);
        let applied = table.global_filter().to_string();
        let matches = table.pre_pagination_row_model().len();
        info!("Filter \"{applied}\" matches {matches} rows");
        self.curser_row = 0;
        self.offset_row = 0;
        self.update_table_data();
        if applied.is_empty() {
            self.set_status_message("Filter cleared");
        } else {
            self.set_status_message(format!("Filter \"{applied}\": {matches} rows"));
        }
    }

    fn toggle_expand(&mut self) {
        let Some(id) = self.current_row_id() else {
            return;
        };
        let Some(table) = self.table.as_mut() else {
            return;
        };
        match table.toggle_row_expanded(&id) {
            Ok(()) => self.update_table_data(),
            Err(e) => self.report(e),
        }
    }

    fn toggle_expand_all(&mut self) {
        if let Some(table) = self.table.as_mut() {
            let expand = !table.is_all_rows_expanded();
            table.toggle_all_rows_expanded(expand);
            self.update_table_data();
        }
    }

    fn toggle_select(&mut self) {
        let Some(id) = self.current_row_id() else {
            return;
        };
        let Some(table) = self.table.as_mut() else {
            return;
        };
        match table.toggle_row_selected(&id) {
            Ok(()) => self.update_table_data(),
            Err(e) => self.report(e),
        }
    }

    fn select_all_on_page(&mut self) {
        if let Some(table) = self.table.as_mut() {
            let value = !table.is_all_page_rows_selected();
            table.toggle_all_page_rows_selected(value);
            self.update_table_data();
        }
    }

    fn clear_selection(&mut self) {
        if let Some(table) = self.table.as_mut() {
            table.clear_row_selection();
            self.update_table_data();
        }
    }

    fn change_page(&mut self, action: fn(&mut Table<Person>)) {
        if let Some(table) = self.table.as_mut() {
            action(table);
            trace!("Now on page {}/{}", table.page_index() + 1, table.page_count());
            self.curser_row = 0;
            self.offset_row = 0;
            self.update_table_data();
        }
    }

    fn cycle_page_size(&mut self) {
        let Some(table) = self.table.as_mut() else {
            return;
        };
        if !table.options().enable_pagination {
            return;
        }
        let current = table.page_size();
        let next = PAGE_SIZE_OPTIONS
            .iter()
            .position(|&s| s == current)
            .map(|idx| PAGE_SIZE_OPTIONS[(idx + 1) % PAGE_SIZE_OPTIONS.len()])
            .unwrap_or(PAGE_SIZE_OPTIONS[0]);
        match table.set_page_size(next) {
            Ok(()) => {
                self.curser_row = 0;
                self.offset_row = 0;
                self.update_table_data();
                self.set_status_message(format!("Showing {next} rows per page"));
            }
            Err(e) => self.report(e),
        }
    }

    fn toggle_column(&mut self, key: usize) {
        let Some(table) = self.table.as_mut() else {
            return;
        };
        let column_id = table
            .all_columns()
            .iter()
            .filter(|c| c.enable_hiding)
            .nth(key.wrapping_sub(1))
            .map(|c| c.id);
        let result = match column_id {
            Some(id) => table.toggle_column_visibility(id),
            None => Err(EngineError::UnknownColumn(format!("#{key}"))),
        };
        match result {
            Ok(()) => self.update_table_data(),
            Err(e) => self.report(e),
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
    }

    fn exit(&mut self) {
        if self.modus == Modus::POPUP {
            trace!("Close popup ...");
            self.modus = self.previous_modus;
            self.previous_modus = Modus::POPUP;
            self.uidata.show_popup = false;
        }
    }

    fn current_record(&self) -> Option<(&Person, Option<&ColumnDef<Person>>)> {
        let table = self.table.as_ref()?;
        let page = table.row_model();
        let record = page.rows.get(self.curser_row)?.original;
        Some((record, self.current_column()))
    }

    fn copy_table_cell(&mut self) {
        let Some((record, Some(column))) = self.current_record() else {
            return;
        };
        let cell = column.value(record).map(|v| v.to_string()).unwrap_or_default();
        trace!("Cell content: {}", cell);
        self.copy_to_clipboard(cell);
    }

    fn copy_table_row(&mut self) {
        let Some((record, _)) = self.current_record() else {
            return;
        };
        let Some(table) = self.table.as_ref() else {
            return;
        };
        let content = row_as_csv(table.all_columns(), record);
        self.copy_to_clipboard(content);
    }

    fn copy_to_clipboard(&mut self, content: String) {
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    warn!("Clipboard not available: {:?}", e);
                    self.set_status_message("Clipboard not available");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(content) {
                Ok(_) => {
                    trace!("Copied content to clipboard.");
                    self.set_status_message("Copied to clipboard");
                }
                Err(e) => trace!("Error copying to clipboard: {:?}", e),
            }
        }
    }

    fn move_table_selection_beginning(&mut self) {
        self.curser_row = 0;
        self.offset_row = 0;
        self.update_table_data();
    }

    fn move_table_selection_end(&mut self) {
        self.curser_row = self.uidata.nrows.saturating_sub(1);
        self.update_table_data();
    }

    fn move_table_selection_up(&mut self, size: usize) {
        self.curser_row = self.curser_row.saturating_sub(size);
        self.update_table_data();
    }

    fn move_table_selection_down(&mut self, size: usize) {
        if self.curser_row + 1 < self.uidata.nrows {
            self.curser_row = std::cmp::min(self.curser_row + size, self.uidata.nrows - 1);
            self.update_table_data();
        }
    }

    fn move_table_selection_left(&mut self) {
        self.curser_column = self.curser_column.saturating_sub(1);
        self.update_table_data();
    }

    fn move_table_selection_right(&mut self) {
        if self.curser_column + 1 < self.uidata.table.len() {
            self.curser_column += 1;
            self.update_table_data();
        }
    }
}

fn header_label(header: &Header, multi_sort: bool) -> String {
    let arrow = match header.sort {
        Some(SortDirection::Ascending) => " ↓",
        Some(SortDirection::Descending) => " ↑",
        None => "",
    };
    match header.sort_index {
        Some(idx) if multi_sort => format!("{}{arrow}{}", header.label, idx + 1),
        _ => format!("{}{arrow}", header.label),
    }
}

fn column_width(name: &str, data: &[String], max_column_width: usize) -> usize {
    let widest = data
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
        .max(name.chars().count());
    std::cmp::min(widest + COLUMN_WIDTH_MARGIN, max_column_width)
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping || needs_escaping {
        out = format!("\"{out}\"");
    }
    out
}

fn row_as_csv(columns: &[ColumnDef<Person>], record: &Person) -> String {
    columns
        .iter()
        .filter_map(|c| c.value(record))
        .map(|v| wrap_cell_content(&v.to_string()))
        .collect::<Vec<String>>()
        .join(",")
}
