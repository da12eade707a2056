use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Maps insert-mode key presses to editing actions
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Process a key event
    pub fn handle_key(&self, key: KeyEvent) -> InputAction {
        let soft_break = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

        match key.code {
            KeyCode::Enter if soft_break => InputAction::Newline,
            KeyCode::Enter => InputAction::Submit,
            KeyCode::Esc => InputAction::Cancel,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
            KeyCode::Char(c) => InputAction::Insert(c),
            KeyCode::Backspace => InputAction::Delete,
            KeyCode::Tab => InputAction::ToggleSidebar,
            KeyCode::PageUp => InputAction::ScrollUp,
            KeyCode::PageDown => InputAction::ScrollDown,
            KeyCode::F(n @ 1..=4) => InputAction::Sample(usize::from(n - 1)),
            _ => InputAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Submit,
    Newline,
    Cancel,
    Insert(char),
    Delete,
    ToggleSidebar,
    ScrollUp,
    ScrollDown,
    /// Index into the sample prompt list
    Sample(usize),
    Quit,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_enter_submits_and_modified_enter_breaks_line() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Enter, KeyModifiers::NONE)), InputAction::Submit);
        assert_eq!(handler.handle_key(key(KeyCode::Enter, KeyModifiers::SHIFT)), InputAction::Newline);
        assert_eq!(handler.handle_key(key(KeyCode::Enter, KeyModifiers::ALT)), InputAction::Newline);
    }

    #[test]
    fn test_function_keys_pick_samples() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::F(1), KeyModifiers::NONE)), InputAction::Sample(0));
        assert_eq!(handler.handle_key(key(KeyCode::F(4), KeyModifiers::NONE)), InputAction::Sample(3));
        assert_eq!(handler.handle_key(key(KeyCode::F(5), KeyModifiers::NONE)), InputAction::None);
    }

    #[test]
    fn test_ctrl_c_quits_instead_of_typing() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), InputAction::Quit);
        assert_eq!(handler.handle_key(key(KeyCode::Char('c'), KeyModifiers::NONE)), InputAction::Insert('c'));
        assert_eq!(handler.handle_key(key(KeyCode::Char('C'), KeyModifiers::SHIFT)), InputAction::Insert('C'));
    }
}
