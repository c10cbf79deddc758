use chrono::NaiveDate;
use imgui::Ui;

use crate::gui::toast::Toasts;
use crate::remote::Remote;

/// Combo over (id, label) pairs. Returns the newly picked id, if any.
pub fn id_combo(
    ui: &Ui,
    label: &str,
    options: &[(i64, String)],
    current: Option<i64>,
    placeholder: &str,
) -> Option<i64> {
    let preview = current
        .and_then(|id| options.iter().find(|(option_id, _)| *option_id == id))
        .map(|(_, name)| name.as_str())
        .unwrap_or(placeholder);
    let mut picked = None;
    if let Some(_combo) = ui.begin_combo(label, preview) {
        for (id, name) in options {
            let selected = current == Some(*id);
            if ui
                .selectable_config(format!("{}##{}", name, id))
                .selected(selected)
                .build()
                && !selected
            {
                picked = Some(*id);
            }
        }
    }
    picked
}

pub fn text_field(ui: &Ui, label: &str, value: &mut String) {
    ui.set_next_item_width(280.0);
    ui.input_text(label, value).build();
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

/// Frame upkeep for a fetch whose value backs a dropdown. A failure is
/// reported once; the options then stay empty.
pub fn poll_options<T: Send + 'static>(remote: &mut Remote<Vec<T>>, what: &str, toasts: &mut Toasts) {
    remote.poll();
    if let Some(err) = remote.take_failed() {
        toasts.error(format!("Failed to load {}: {}", what, err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_parse_in_iso_calendar_form_only() {
        assert_eq!(parse_date("2024-06-03"), NaiveDate::from_ymd_opt(2024, 6, 3));
        assert_eq!(parse_date("  2024-06-03  "), NaiveDate::from_ymd_opt(2024, 6, 3));
        assert_eq!(parse_date("06/03/2024"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date(""), None);
    }
}
