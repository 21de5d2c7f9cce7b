//! Inline keyboards for the three conversation flows.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::vocab;

/// Callback-data prefixes for parameterized buttons.
pub const LANG_PREFIX: &str = "lang:";
pub const CONTACT_PREFIX: &str = "contact:";
pub const CONFIRM_DELETE_PREFIX: &str = "confirm_delete:";

/// Add-info categories: button label → callback data.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("Имя", "name"),
    ("Фамилия", "surname"),
    ("Отчество", "patronymic"),
    ("Дата рождения", "date_of_birth"),
    ("Языки", "languages"),
    ("Локация", "location"),
    ("Возможная дата выхода на новое место работы", "date_of_exit"),
    ("Зарплатные ожидания (на руки)", "salary"),
    ("Контакты", "add_contacts"),
];

fn chunked(buttons: Vec<InlineKeyboardButton>, per_row: usize) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = buttons
        .chunks(per_row)
        .map(|chunk| chunk.to_vec())
        .collect();
    InlineKeyboardMarkup::new(rows)
}

pub fn main_menu() -> InlineKeyboardMarkup {
    chunked(
        vec![
            InlineKeyboardButton::callback("Сканировать резюме", "scan"),
            InlineKeyboardButton::callback("Удалить запись", "delete_record"),
            InlineKeyboardButton::callback("Добавить информацию", "add_info"),
        ],
        1,
    )
}

pub fn add_more_files() -> InlineKeyboardMarkup {
    chunked(
        vec![
            InlineKeyboardButton::callback("✅ Да", "add_more_yes"),
            InlineKeyboardButton::callback("❌ Нет", "add_more_no"),
        ],
        2,
    )
}

pub fn confirm_delete(resume_id: &str) -> InlineKeyboardMarkup {
    chunked(
        vec![
            InlineKeyboardButton::callback(
                "✅ Да, удалить",
                format!("{CONFIRM_DELETE_PREFIX}{resume_id}"),
            ),
            InlineKeyboardButton::callback("❌ Отмена", "cancel_delete"),
        ],
        1,
    )
}

pub fn categories() -> InlineKeyboardMarkup {
    chunked(
        CATEGORIES
            .iter()
            .map(|(label, data)| InlineKeyboardButton::callback(*label, *data))
            .collect(),
        2,
    )
}

pub fn languages() -> InlineKeyboardMarkup {
    chunked(
        vocab::FOREIGN_LANGUAGES
            .iter()
            .map(|lang| InlineKeyboardButton::callback(*lang, format!("{LANG_PREFIX}{lang}")))
            .collect(),
        3,
    )
}

pub fn more_languages() -> InlineKeyboardMarkup {
    chunked(
        vec![
            InlineKeyboardButton::callback("Да", "lang_more"),
            InlineKeyboardButton::callback("Нет", "lang_done"),
        ],
        1,
    )
}

pub fn contacts() -> InlineKeyboardMarkup {
    chunked(
        vocab::CONTACT_KINDS
            .iter()
            .map(|(label, field)| {
                InlineKeyboardButton::callback(*label, format!("{CONTACT_PREFIX}{field}"))
            })
            .collect(),
        3,
    )
}

pub fn more_contacts() -> InlineKeyboardMarkup {
    chunked(
        vec![
            InlineKeyboardButton::callback("Да", "contact_more"),
            InlineKeyboardButton::callback("Нет", "contact_done"),
        ],
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_count(kb: &InlineKeyboardMarkup) -> usize {
        kb.inline_keyboard.iter().map(|row| row.len()).sum()
    }

    #[test]
    fn test_main_menu_is_one_column() {
        let kb = main_menu();
        assert_eq!(kb.inline_keyboard.len(), 3);
        assert!(kb.inline_keyboard.iter().all(|row| row.len() == 1));
    }

    #[test]
    fn test_language_keyboard_covers_vocabulary() {
        assert_eq!(button_count(&languages()), vocab::FOREIGN_LANGUAGES.len());
        assert!(languages()
            .inline_keyboard
            .iter()
            .all(|row| row.len() <= 3));
    }

    #[test]
    fn test_contacts_keyboard_covers_kinds() {
        assert_eq!(button_count(&contacts()), vocab::CONTACT_KINDS.len());
    }

    #[test]
    fn test_confirm_delete_embeds_id() {
        let kb = confirm_delete("k_12345");
        let data: Vec<_> = kb
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(d) => Some(d.clone()),
                _ => None,
            })
            .collect();
        assert!(data.contains(&"confirm_delete:k_12345".to_string()));
    }
}
