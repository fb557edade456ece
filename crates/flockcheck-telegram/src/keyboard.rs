// SPDX-FileCopyrightText: 2026 Flockcheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline keyboards for menu effects.
//!
//! Each menu item becomes one button on its own row. The callback data is the
//! item's [`Action`](flockcheck_core::Action) string, which
//! [`handler::callback_event`](crate::handler::callback_event) parses back.

use flockcheck_core::{FieldStatus, MenuItem};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Button text, with a check mark for filled fields.
pub fn button_label(item: &MenuItem) -> String {
    match item.status {
        Some(FieldStatus::Filled) => format!("✅ {}", item.label),
        Some(FieldStatus::Missing) => format!("⬜ {}", item.label),
        None => item.label.clone(),
    }
}

pub fn inline_keyboard(items: &[MenuItem]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(items.iter().map(|item| {
        vec![InlineKeyboardButton::callback(
            button_label(item),
            item.action.to_string(),
        )]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flockcheck_core::{Action, FieldId};
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn labels_mark_field_status() {
        let mut item = MenuItem::new("Body Weight", Action::SelectField(FieldId::Weight));
        assert_eq!(button_label(&item), "Body Weight");
        item.status = Some(FieldStatus::Filled);
        assert_eq!(button_label(&item), "✅ Body Weight");
        item.status = Some(FieldStatus::Missing);
        assert_eq!(button_label(&item), "⬜ Body Weight");
    }

    #[test]
    fn one_row_per_item_with_action_callback() {
        let items = vec![
            MenuItem::new("Resume", Action::Resume),
            MenuItem::new("Body Temperature", Action::SelectField(FieldId::Temperature)),
        ];
        let markup = inline_keyboard(&items);
        assert_eq!(markup.inline_keyboard.len(), 2);

        let data: Vec<String> = markup
            .inline_keyboard
            .iter()
            .map(|row| {
                assert_eq!(row.len(), 1);
                match &row[0].kind {
                    InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                    other => panic!("expected callback button, got {other:?}"),
                }
            })
            .collect();
        assert_eq!(data, vec!["resume", "field:temperature"]);
        assert_eq!(markup.inline_keyboard[1][0].text, "Body Temperature");
    }
}
