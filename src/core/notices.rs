// Notices
// Non-blocking toasts and blocking popups shown to the user

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// Non-blocking notice that expires on its own
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

impl Toast {
    pub fn new(message: String, kind: ToastKind) -> Self {
        Self {
            message,
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn success(message: String) -> Self {
        Self::new(message, ToastKind::Success)
    }

    pub fn error(message: String) -> Self {
        Self::new(message, ToastKind::Error)
    }

    pub fn info(message: String) -> Self {
        Self::new(message, ToastKind::Info)
    }
}

/// Toasts currently on screen, oldest first
#[derive(Debug, Clone)]
pub struct ToastStack {
    toasts: Vec<Toast>,
    lifetime: Duration,
}

impl ToastStack {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    /// Drop every toast older than the configured lifetime
    pub fn prune(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < lifetime);
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Warning,
    Error,
}

/// Blocking notice; input goes nowhere else until it is dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub message: String,
    pub kind: PopupKind,
}

impl Popup {
    pub fn new(title: String, message: String, kind: PopupKind) -> Self {
        Self { title, message, kind }
    }

    pub fn warning(title: String, message: String) -> Self {
        Self::new(title, message, PopupKind::Warning)
    }

    pub fn error(title: String, message: String) -> Self {
        Self::new(title, message, PopupKind::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_drops_only_expired_toasts() {
        let mut stack = ToastStack::new(Duration::from_millis(100));
        let start = Instant::now();

        let mut old = Toast::info("old".to_string());
        old.shown_at = start;
        let mut fresh = Toast::success("fresh".to_string());
        fresh.shown_at = start + Duration::from_millis(80);

        stack.push(old);
        stack.push(fresh);

        stack.prune(start + Duration::from_millis(120));
        assert_eq!(stack.toasts().len(), 1);
        assert_eq!(stack.toasts()[0].message, "fresh");

        stack.prune(start + Duration::from_millis(500));
        assert!(stack.is_empty());
    }
}
