use crate::application::{App, Dialog};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if matches!(app.dialog, Dialog::Shown(_)) {
            Self::handle_dialog(app, key);
            return;
        }

        if modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('r') = key {
                app.retry_categories();
            }
            return;
        }

        app.status_message = None;

        match key {
            KeyCode::Enter => app.submit_step(),
            KeyCode::Esc => app.go_back(),
            KeyCode::Tab | KeyCode::Down => app.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.focus_previous(),
            KeyCode::Left => app.adjust(false),
            KeyCode::Right => app.adjust(true),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Char(' ') if app.focused_field().is_choice() => app.adjust(true),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    fn handle_dialog(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.start_new_application(),
            KeyCode::Esc => app.close_dialog(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Completion;
    use crate::domain::{ApplicationDraft, Field, Gender, Step};
    use crate::infrastructure::{
        CategoryCatalog, DEFAULT_CATEGORY_TTL_MS, DraftStore, ManualClock, MemoryStore,
    };

    fn new_app() -> App {
        let storage = MemoryStore::new();
        App::new(
            DraftStore::open(Box::new(storage.clone())),
            CategoryCatalog::new(Box::new(storage), DEFAULT_CATEGORY_TTL_MS),
            Box::new(ManualClock::new(0)),
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            InputHandler::handle_key_event(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    fn press(app: &mut App, key: KeyCode) {
        InputHandler::handle_key_event(app, key, KeyModifiers::NONE);
    }

    #[test]
    fn test_fill_personal_step_with_keys() {
        let mut app = new_app();
        type_text(&mut app, "5551234567");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Jane");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Doe");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_field(), Field::Gender);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.personal.gender, Some(Gender::Female));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.step, Step::Address);
        assert_eq!(app.draft().first_name, "Jane");
    }

    #[test]
    fn test_backspace_and_back_navigation() {
        let mut app = new_app();
        type_text(&mut app, "12");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.personal.phone, "1");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.step, Step::Personal);
    }

    #[test]
    fn test_space_cycles_choice_but_types_in_text() {
        let mut app = new_app();
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Mary Jane");
        assert_eq!(app.personal.first_name, "Mary Jane");

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.focused_field(), Field::Gender);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.personal.gender, Some(Gender::Male));
    }

    #[test]
    fn test_dialog_keys() {
        let mut app = new_app();
        app.dialog = Dialog::Shown(Completion {
            draft: ApplicationDraft::default(),
            response: serde_json::json!({}),
        });

        type_text(&mut app, "99");
        assert!(app.personal.phone.is_empty());

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.dialog, Dialog::Hidden));

        app.dialog = Dialog::Shown(Completion {
            draft: ApplicationDraft::default(),
            response: serde_json::json!({}),
        });
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.dialog, Dialog::Hidden));
        assert_eq!(app.step, Step::Personal);
    }

    #[test]
    fn test_ctrl_keys_do_not_type() {
        let mut app = new_app();
        InputHandler::handle_key_event(&mut app, KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(app.personal.phone.is_empty());
        assert!(app.take_jobs().is_empty());
    }
}
