use imgui::{Condition, Ui};
use std::time::{Duration, Instant};

const TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug)]
struct Toast {
    level: ToastLevel,
    message: String,
    created: Instant,
}

/// Transient overlay notifications, drawn on top of whatever screen is
/// active and discarded after a few seconds.
#[derive(Debug, Default)]
pub struct Toasts {
    entries: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Toasts::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message.into());
    }

    fn push(&mut self, level: ToastLevel, message: String) {
        if level == ToastLevel::Error {
            tracing::warn!("{}", message);
        }
        self.entries.push(Toast {
            level,
            message,
            created: Instant::now(),
        });
    }

    pub fn draw(&mut self, ui: &Ui) {
        self.entries
            .retain(|toast| toast.created.elapsed() < TOAST_LIFETIME);
        if self.entries.is_empty() {
            return;
        }
        let display_size = ui.io().display_size;
        if let Some(window) = ui
            .window("##toasts")
            .position(
                [display_size[0] - 340.0, display_size[1] - 40.0 - 24.0 * self.entries.len() as f32],
                Condition::Always,
            )
            .size([320.0, 0.0], Condition::Always)
            .title_bar(false)
            .resizable(false)
            .movable(false)
            .scroll_bar(false)
            .always_auto_resize(true)
            .bg_alpha(0.92)
            .begin()
        {
            for toast in &self.entries {
                let color = match toast.level {
                    ToastLevel::Info => [0.25, 0.25, 0.25, 1.0],
                    ToastLevel::Success => [0.0, 0.45, 0.12, 1.0],
                    ToastLevel::Error => [0.75, 0.1, 0.1, 1.0],
                };
                ui.text_colored(color, &toast.message);
            }
            window.end();
        }
    }
}
