use std::time::Duration;
use tracing::trace;

use crate::domain::{Message, RVConfig, RVError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &RVConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    /// Waits up to `event_poll_time` for an event. `None` still lets the model poll the filter.
    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, RVError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(self.map_event(event::read()?, model.raw_keyevents()));
        }
        Ok(None)
    }

    fn map_event(&self, event: Event, raw: bool) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                if raw {
                    Some(Message::RawKey(key))
                } else {
                    self.handle_key(key)
                }
            }
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        }
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Up | KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down | KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Left | KeyCode::Char('h'), _) => Some(Message::MoveLeft),
            (KeyCode::Right | KeyCode::Char('l'), _) => Some(Message::MoveRight),
            (KeyCode::Home | KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
            (KeyCode::End | KeyCode::Char('G'), _) => Some(Message::MoveEnd),
            (KeyCode::Char('s'), _) => Some(Message::ToggleSort),
            (KeyCode::Char('S'), _) => Some(Message::ToggleMultiSort),
            (KeyCode::Char('x'), _) => Some(Message::ClearSorting),
            (KeyCode::Char('/'), _) => Some(Message::Filter),
            (KeyCode::Char(' '), _) => Some(Message::ToggleExpand),
            (KeyCode::Char('e'), _) => Some(Message::ToggleExpandAll),
            (KeyCode::Enter, _) => Some(Message::ToggleSelect),
            (KeyCode::Char('a'), _) => Some(Message::SelectAllOnPage),
            (KeyCode::Char('u'), _) => Some(Message::ClearSelection),
            (KeyCode::Char('n') | KeyCode::PageDown, _) => Some(Message::NextPage),
            (KeyCode::Char('p') | KeyCode::PageUp, _) => Some(Message::PreviousPage),
            (KeyCode::Char('N'), _) => Some(Message::LastPage),
            (KeyCode::Char('P'), _) => Some(Message::FirstPage),
            (KeyCode::Char('z'), _) => Some(Message::CyclePageSize),
            (KeyCode::Char('c'), _) => Some(Message::CopyCell),
            (KeyCode::Char('C'), _) => Some(Message::CopyRow),
            (KeyCode::Char(d @ '1'..='9'), _) => d.to_digit(10).map(|n| Message::ToggleColumn(n as usize)),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEvent, KeyEventKind, KeyEventState};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn controller() -> Controller {
        Controller::new(&RVConfig::default())
    }

    #[test]
    fn maps_table_keys() {
        let c = controller();
        assert_eq!(c.map_event(press(KeyCode::Char('q')), false), Some(Message::Quit));
        assert_eq!(c.map_event(press(KeyCode::Char('j')), false), Some(Message::MoveDown));
        assert_eq!(c.map_event(press(KeyCode::Char('s')), false), Some(Message::ToggleSort));
        assert_eq!(c.map_event(press(KeyCode::Char('n')), false), Some(Message::NextPage));
        assert_eq!(c.map_event(press(KeyCode::Char('z')), false), Some(Message::CyclePageSize));
        assert_eq!(c.map_event(press(KeyCode::Char('x')), false), Some(Message::ClearSorting));
        assert_eq!(c.map_event(press(KeyCode::Char('u')), false), Some(Message::ClearSelection));
        assert_eq!(
            c.map_event(press(KeyCode::Char('4')), false),
            Some(Message::ToggleColumn(4))
        );
        assert_eq!(c.map_event(press(KeyCode::Char('0')), false), None);
        assert_eq!(
            c.map_event(
                Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
                false
            ),
            Some(Message::Quit)
        );
    }

    #[test]
    fn input_mode_passes_raw_keys() {
        let c = controller();
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(c.map_event(Event::Key(key), true), Some(Message::RawKey(key)));
    }

    #[test]
    fn releases_are_ignored_and_resizes_forwarded() {
        let c = controller();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(c.map_event(Event::Key(release), false), None);
        assert_eq!(
            c.map_event(Event::Resize(80, 24), false),
            Some(Message::Resize(80, 24))
        );
    }
}
