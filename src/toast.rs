//! Toast Notifications
//!
//! The toast list the page shows over the dashboard, and the sink trait the
//! session uses to push into it.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Default display time of a non-sticky toast
pub const DEFAULT_TOAST_DURATION_MS: u32 = 8000;

/// Visual severity of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Danger,
}

/// A toast to be shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastRequest {
    pub kind: ToastKind,
    pub text: String,
    /// `None` keeps the toast open until dismissed
    pub duration_ms: Option<u32>,
    /// Skip the toast if one with the same text is already shown
    pub no_duplicate: bool,
}

impl ToastRequest {
    pub fn new(kind: ToastKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            duration_ms: Some(DEFAULT_TOAST_DURATION_MS),
            no_duplicate: false,
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Danger, text)
    }

    /// Keep open until manually closed
    pub fn sticky(mut self) -> Self {
        self.duration_ms = None;
        self
    }

    pub fn no_duplicate(mut self) -> Self {
        self.no_duplicate = true;
        self
    }
}

/// A toast currently shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub text: String,
    pub duration_ms: Option<u32>,
}

impl Toast {
    pub fn is_sticky(&self) -> bool {
        self.duration_ms.is_none()
    }
}

/// Ordered list of visible toasts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastList {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a toast; returns its id, or `None` when de-duplicated away
    pub fn push(&mut self, request: ToastRequest) -> Option<u64> {
        if request.no_duplicate && self.toasts.iter().any(|t| t.text == request.text) {
            return None;
        }

        self.next_id += 1;
        self.toasts.push(Toast {
            id: self.next_id,
            kind: request.kind,
            text: request.text,
            duration_ms: request.duration_ms,
        });
        Some(self.next_id)
    }

    /// Remove a toast; false if it was already gone
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Destination for toasts raised outside the view layer
pub trait ToastSink {
    fn add_toast(&self, request: ToastRequest) -> Option<u64>;
}

/// Toast store for headless use
#[derive(Debug, Default)]
pub struct ToastQueue {
    list: RefCell<ToastList>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the visible toasts
    pub fn toasts(&self) -> Vec<Toast> {
        self.list.borrow().iter().cloned().collect()
    }

    pub fn dismiss(&self, id: u64) -> bool {
        self.list.borrow_mut().dismiss(id)
    }

    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }
}

impl ToastSink for ToastQueue {
    fn add_toast(&self, request: ToastRequest) -> Option<u64> {
        let id = self.list.borrow_mut().push(request);
        if id.is_none() {
            tracing::debug!("Duplicate toast suppressed");
        }
        id
    }
}
