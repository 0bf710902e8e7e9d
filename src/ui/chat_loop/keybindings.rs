//! Maps terminal key presses onto [`AppAction`]s.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::app::AppAction;

const LINE_STEP: u16 = 1;
const PAGE_STEP: u16 = 10;

pub fn actions_for_key(key: &KeyEvent) -> Vec<AppAction> {
    if key.kind == KeyEventKind::Release {
        return Vec::new();
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => vec![AppAction::Quit],
        KeyCode::Char('u') if ctrl => vec![AppAction::ClearInput],
        KeyCode::Char(ch) if !ctrl => vec![AppAction::InsertIntoInput {
            text: ch.to_string(),
        }],
        KeyCode::Backspace => vec![AppAction::DeleteBackward],
        KeyCode::Enter => vec![AppAction::ScrollToLatest, AppAction::SubmitInput],
        KeyCode::Esc => vec![AppAction::DismissError],
        KeyCode::Up => vec![AppAction::ScrollUp { lines: LINE_STEP }],
        KeyCode::Down => vec![AppAction::ScrollDown { lines: LINE_STEP }],
        KeyCode::PageUp => vec![AppAction::ScrollUp { lines: PAGE_STEP }],
        KeyCode::PageDown => vec![AppAction::ScrollDown { lines: PAGE_STEP }],
        KeyCode::End => vec![AppAction::ScrollToLatest],
        _ => Vec::new(),
    }
}

/// Pasted text is inserted verbatim; line breaks collapse to spaces since the
/// input box is a single line.
pub fn actions_for_paste(text: &str) -> Vec<AppAction> {
    let flattened: String = text
        .chars()
        .map(|ch| if ch == '\r' || ch == '\n' { ' ' } else { ch })
        .collect();
    if flattened.is_empty() {
        return Vec::new();
    }
    vec![AppAction::InsertIntoInput { text: flattened }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::apply_actions;
    use crate::utils::test_utils::create_test_app;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn typing_builds_input_and_enter_submits() {
        let mut app = create_test_app();
        let mut commands = Vec::new();
        for ch in "hi!".chars() {
            commands.extend(apply_actions(
                &mut app,
                actions_for_key(&press(KeyCode::Char(ch), KeyModifiers::NONE)),
            ));
        }
        assert_eq!(app.ui.input, "hi!");

        commands.extend(apply_actions(
            &mut app,
            actions_for_key(&press(KeyCode::Backspace, KeyModifiers::NONE)),
        ));
        assert_eq!(app.ui.input, "hi");
        assert!(commands.is_empty());

        let commands = apply_actions(
            &mut app,
            actions_for_key(&press(KeyCode::Enter, KeyModifiers::NONE)),
        );
        assert_eq!(commands.len(), 1);
        assert!(app.ui.input.is_empty());
        assert!(app.is_loading());
    }

    #[test]
    fn ctrl_c_quits_instead_of_typing() {
        let mut app = create_test_app();
        apply_actions(
            &mut app,
            actions_for_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(app.ui.exit_requested);
        assert!(app.ui.input.is_empty());
    }

    #[test]
    fn shifted_characters_are_typed() {
        let actions = actions_for_key(&press(KeyCode::Char('H'), KeyModifiers::SHIFT));
        assert!(matches!(
            actions.as_slice(),
            [AppAction::InsertIntoInput { text }] if text == "H"
        ));
    }

    #[test]
    fn navigation_keys_scroll() {
        let mut app = create_test_app();
        apply_actions(
            &mut app,
            actions_for_key(&press(KeyCode::PageUp, KeyModifiers::NONE)),
        );
        assert_eq!(app.ui.scroll_back, PAGE_STEP);
        apply_actions(
            &mut app,
            actions_for_key(&press(KeyCode::Down, KeyModifiers::NONE)),
        );
        assert_eq!(app.ui.scroll_back, PAGE_STEP - 1);
        apply_actions(
            &mut app,
            actions_for_key(&press(KeyCode::End, KeyModifiers::NONE)),
        );
        assert_eq!(app.ui.scroll_back, 0);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut key = press(KeyCode::Char('x'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(actions_for_key(&key).is_empty());
    }

    #[test]
    fn paste_flattens_newlines() {
        let actions = actions_for_paste("one\ntwo\r\n");
        assert!(matches!(
            actions.as_slice(),
            [AppAction::InsertIntoInput { text }] if text == "one two  "
        ));
        assert!(actions_for_paste("").is_empty());
    }
}
