use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use tracing::trace;

use crate::domain::RVConfig;
use crate::model::{Model, PaginationView, UIData};

pub const TOGGLE_BAR_HEIGHT: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const STATUSLINE_HEIGHT: usize = 1;
pub const CMDLINE_HEIGHT: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 1;

const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
const KEY_HINTS: &str = "? help  / filter  s sort  space expand  enter select  n/p page  q quit";

pub struct TableUI {
    max_column_width: usize,
}

impl TableUI {
    pub fn new(config: &RVConfig) -> Self {
        Self {
            max_column_width: config.max_column_width,
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [toggle_area, table_area, status_area, cmd_area] = Layout::vertical([
            Constraint::Length(TOGGLE_BAR_HEIGHT as u16),
            Constraint::Min(TABLE_HEADER_HEIGHT as u16),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
            Constraint::Length(CMDLINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        self.render_toggles(uidata, toggle_area, frame);
        self.render_table(uidata, table_area, frame);
        self.render_statusline(uidata, status_area, frame);
        self.render_cmdline(uidata, cmd_area, frame);

        if uidata.show_popup {
            self.render_popup(uidata, frame);
        }
    }

    fn render_toggles(&self, uidata: &UIData, area: Rect, frame: &mut Frame) {
        let mut spans = vec![Span::from(format!(" {} ", uidata.name)).bold()];
        for toggle in uidata.toggles.iter() {
            let mark = if toggle.visible { "x" } else { " " };
            let label = match toggle.key {
                Some(key) => Span::from(format!(" [{mark}] {key} {} ", toggle.label)),
                None => Span::from(format!(" [{mark}] {} ", toggle.label)).italic(),
            };
            if toggle.visible {
                spans.push(label.green());
            } else {
                spans.push(label.dark_gray());
            }
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_table(&self, uidata: &UIData, area: Rect, frame: &mut Frame) {
        let header = uidata
            .table
            .iter()
            .map(|column| {
                trace!("Header {:?} width {}", column.name, column.width);
                Cell::from(column.name.clone())
            })
            .collect::<Row>()
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));

        let nrows = uidata.table.first().map(|c| c.data.len()).unwrap_or(0);
        let rows = (0..nrows).map(|ridx| {
            uidata
                .table
                .iter()
                .map(|column| Cell::from(column.data[ridx].as_str()))
                .collect::<Row>()
        });

        let widths = uidata
            .table
            .iter()
            .map(|c| Constraint::Length(c.width.min(self.max_column_width) as u16));

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(0)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .cell_highlight_style(Style::default().add_modifier(Modifier::BOLD).yellow());

        let mut state = TableState::default();
        if nrows > 0 {
            state = state
                .with_selected(Some(uidata.selected_row))
                .with_selected_column(Some(uidata.selected_column));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_statusline(&self, uidata: &UIData, area: Rect, frame: &mut Frame) {
        let [left, right] =
            Layout::horizontal([Constraint::Fill(2), Constraint::Fill(1)]).areas(area);

        frame.render_widget(Line::from(pagination_text(&uidata.pagination)).cyan(), left);

        if uidata.last_status_message_update.elapsed() < STATUS_MESSAGE_TIMEOUT {
            frame.render_widget(
                Line::from(uidata.status_message.as_str()).right_aligned(),
                right,
            );
        }
    }

    fn render_cmdline(&self, uidata: &UIData, area: Rect, frame: &mut Frame) {
        if uidata.active_cmdinput {
            let text = format!("/{}", uidata.cmdinput.input);
            frame.render_widget(Line::from(text), area);
            let x = area.x + 1 + uidata.cmdinput.curser_pos as u16;
            frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
        } else if !uidata.filter.is_empty() || uidata.filter_pending {
            let pending = if uidata.filter_pending { " ..." } else { "" };
            let line = Line::from(vec![
                "Filter: ".bold(),
                Span::from(uidata.filter.as_str()).yellow(),
                Span::from(pending),
            ]);
            frame.render_widget(line, area);
        } else {
            frame.render_widget(Line::from(KEY_HINTS).dark_gray(), area);
        }
    }

    fn render_popup(&self, uidata: &UIData, frame: &mut Frame) {
        let lines = uidata.popup_message.lines().count() as u16;
        let width = uidata
            .popup_message
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as u16;
        let area = popup_area(frame.area(), width + 4, lines + 2);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(" <Esc> to close ").centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(uidata.popup_message.as_str())
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }
}

fn pagination_text(pagination: &PaginationView) -> String {
    if !pagination.enabled {
        return format!(" {} rows", pagination.total_rows);
    }
    let previous = if pagination.can_previous { "<" } else { " " };
    let next = if pagination.can_next { ">" } else { " " };
    format!(
        " {previous} Page {} of {} {next} | {} per page | {} rows | {} selected",
        pagination.page_index + 1,
        pagination.page_count,
        pagination.page_size,
        pagination.total_rows,
        pagination.selected
    )
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}
