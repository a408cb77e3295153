use std::time::Duration;

pub type NoticeId = u64;

pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    /// CSS-style class name, also used as the text prefix when rendering.
    pub fn class(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub text: String,
    pub severity: Severity,
}

/// Single-slot notification area. Showing a message replaces whatever is
/// currently visible; ids let a late expiry timer tell whether its message
/// is still the one on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageSlot {
    current: Option<Notice>,
    last_id: NoticeId,
}

impl MessageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, text: impl Into<String>, severity: Severity) -> NoticeId {
        self.last_id += 1;
        self.current = Some(Notice {
            id: self.last_id,
            text: text.into(),
            severity,
        });
        self.last_id
    }

    /// Removes the message only if `id` is still the visible one.
    pub fn expire(&mut self, id: NoticeId) -> bool {
        match &self.current {
            Some(notice) if notice.id == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn close(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showing_replaces_visible_message() {
        let mut slot = MessageSlot::new();
        let first = slot.show("one", Severity::Info);
        let second = slot.show("two", Severity::Error);

        assert_ne!(first, second);
        let current = slot.current().unwrap();
        assert_eq!(current.text, "two");
        assert_eq!(current.severity, Severity::Error);
    }

    #[test]
    fn stale_expiry_keeps_newer_message() {
        let mut slot = MessageSlot::new();
        let first = slot.show("one", Severity::Info);
        let second = slot.show("two", Severity::Success);

        assert!(!slot.expire(first));
        assert_eq!(slot.current().map(|n| n.id), Some(second));
        assert!(slot.expire(second));
        assert!(slot.current().is_none());
    }

    #[test]
    fn close_on_empty_slot_is_noop() {
        let mut slot = MessageSlot::new();
        assert!(!slot.close());
        slot.show("x", Severity::Info);
        assert!(slot.close());
        assert!(slot.current().is_none());
    }
}
