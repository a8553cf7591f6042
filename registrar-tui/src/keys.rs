//! Keybinding definitions for the TUI.
//!
//! The same key means different things depending on what has focus, so
//! mapping takes the current [`InputMode`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Table,
    Search,
    Form,
    Confirm,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    MoveUp,
    MoveDown,
    ColumnLeft,
    ColumnRight,
    SortColumn,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GoToPage(usize),
    Activate,
    NewItem,
    ToggleDeleted,
    OpenSearch,
    OpenHelp,
    Refresh,
    Input(char),
    Backspace,
    NextField,
    PrevField,
    Submit,
    DeleteItem,
    Confirm,
    Cancel,
}

pub fn map_key(event: KeyEvent, mode: InputMode) -> Option<Action> {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind == KeyEventKind::Release {
        return None;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match (code, mode) {
            (KeyCode::Char('c'), _) => Some(Action::Quit),
            (KeyCode::Char('r'), InputMode::Table) => Some(Action::Refresh),
            (KeyCode::Char('s'), InputMode::Form) => Some(Action::Submit),
            (KeyCode::Char('d'), InputMode::Form) => Some(Action::DeleteItem),
            _ => None,
        };
    }

    match mode {
        InputMode::Table => map_table_key(code),
        InputMode::Search => match code {
            KeyCode::Esc | KeyCode::Enter => Some(Action::Cancel),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        InputMode::Form => match code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Tab | KeyCode::Down => Some(Action::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Action::PrevField),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        InputMode::Confirm => match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Action::Confirm),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        InputMode::Help => match code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Some(Action::Cancel),
            _ => None,
        },
    }
}

fn map_table_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::OpenHelp),
        KeyCode::Char('/') => Some(Action::OpenSearch),
        KeyCode::Char('n') => Some(Action::NewItem),
        KeyCode::Char('D') => Some(Action::ToggleDeleted),
        KeyCode::Char('s') => Some(Action::SortColumn),
        KeyCode::Enter | KeyCode::Char('e') => Some(Action::Activate),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::ColumnLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::ColumnRight),
        KeyCode::PageDown | KeyCode::Char(']') => Some(Action::NextPage),
        KeyCode::PageUp | KeyCode::Char('[') => Some(Action::PrevPage),
        KeyCode::Home => Some(Action::FirstPage),
        KeyCode::End => Some(Action::LastPage),
        KeyCode::F(n) if (1..=9).contains(&n) => Some(Action::GoToPage(usize::from(n))),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let idx = match c {
                '1' => 0,
                '2' => 1,
                '3' => 2,
                _ => return None,
            };
            Some(Action::SwitchView(idx))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[test]
    fn test_letters_are_text_inside_form() {
        assert_eq!(
            map_key(press(KeyCode::Char('q')), InputMode::Form),
            Some(Action::Input('q'))
        );
        assert_eq!(
            map_key(press(KeyCode::Char('q')), InputMode::Table),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut event = press(KeyCode::Char('n'));
        event.kind = KeyEventKind::Release;
        assert_eq!(map_key(event, InputMode::Table), None);
    }

    #[test]
    fn test_confirm_accepts_y_and_rejects_n() {
        assert_eq!(
            map_key(press(KeyCode::Char('y')), InputMode::Confirm),
            Some(Action::Confirm)
        );
        assert_eq!(
            map_key(press(KeyCode::Char('n')), InputMode::Confirm),
            Some(Action::Cancel)
        );
    }

    #[test]
    fn test_function_keys_jump_to_pages() {
        assert_eq!(
            map_key(press(KeyCode::F(3)), InputMode::Table),
            Some(Action::GoToPage(3))
        );
    }
}
