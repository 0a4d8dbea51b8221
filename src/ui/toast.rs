//! Transient notifications in the status line

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Paragraph,
    Frame,
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    shown_at: Instant,
}

/// Holds at most one notification; a newer one replaces the older.
#[derive(Debug)]
pub struct Toaster {
    current: Option<Toast>,
    ttl: Duration,
}

impl Toaster {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Info, message.into());
    }

    fn push(&mut self, kind: ToastKind, message: String) {
        self.current = Some(Toast {
            kind,
            message,
            shown_at: Instant::now(),
        });
    }

    /// Visible notification at `now`, expiring old ones
    pub fn current(&mut self, now: Instant) -> Option<&Toast> {
        if self
            .current
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.shown_at) >= self.ttl)
        {
            self.current = None;
        }
        self.current.as_ref()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let Some(toast) = self.current(Instant::now()) else {
            return;
        };
        let (prefix, color) = match toast.kind {
            ToastKind::Success => ("✓ ", Color::Green),
            ToastKind::Error => ("✗ ", Color::Red),
            ToastKind::Info => ("", Color::Cyan),
        };
        let line = Span::styled(
            format!("{}{}", prefix, toast.message),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
        frame.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires() {
        let mut toaster = Toaster::new(Duration::from_secs(4));
        toaster.error("Erro ao salvar anamnese");
        let now = Instant::now();

        assert_eq!(
            toaster.current(now).map(|t| t.message.as_str()),
            Some("Erro ao salvar anamnese")
        );
        assert!(toaster.current(now + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_newer_toast_replaces_older() {
        let mut toaster = Toaster::new(Duration::from_secs(4));
        toaster.info("a");
        toaster.success("b");
        let toast = toaster.current(Instant::now()).unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "b");
    }
}
