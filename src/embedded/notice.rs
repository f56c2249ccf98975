//! Unauthorized Notice
//!
//! If there is a problem with the guest token the API starts answering 401
//! and the client calls back here. A guest has no login to fall back to, so
//! the user is told once and the page keeps working as far as it can.

use std::cell::Cell;
use std::rc::Rc;

use crate::client::UnauthorizedHandler;
use crate::toast::{ToastRequest, ToastSink};

/// Text of the session-interrupted toast
pub const UNAUTHORIZED_MESSAGE: &str = "This session has encountered an interruption, and some controls may not work as intended. If you are the developer of this app, please check that the guest token is being generated correctly.";

/// Shows the session-interrupted toast at most once per page
pub struct UnauthorizedNotice {
    shown: Cell<bool>,
    toasts: Rc<dyn ToastSink>,
}

impl UnauthorizedNotice {
    pub fn new(toasts: Rc<dyn ToastSink>) -> Self {
        Self {
            shown: Cell::new(false),
            toasts,
        }
    }

    /// React to an authorization failure; true if the toast was dispatched
    pub fn notify(&self) -> bool {
        if self.shown.replace(true) {
            return false;
        }

        tracing::warn!("Guest token rejected, showing session interrupted notice");
        self.toasts
            .add_toast(ToastRequest::danger(UNAUTHORIZED_MESSAGE).sticky().no_duplicate());
        true
    }

    pub fn was_shown(&self) -> bool {
        self.shown.get()
    }

    /// Callback form for the API client
    pub fn handler(self: &Rc<Self>) -> UnauthorizedHandler {
        let notice = Rc::clone(self);
        Rc::new(move || {
            notice.notify();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast::{ToastKind, ToastQueue};

    #[test]
    fn test_notice_shown_once() {
        let queue = Rc::new(ToastQueue::new());
        let notice = Rc::new(UnauthorizedNotice::new(queue.clone()));
        let handler = notice.handler();

        handler();
        handler();
        handler();

        assert!(notice.was_shown());
        let toasts = queue.toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Danger);
        assert_eq!(toasts[0].text, UNAUTHORIZED_MESSAGE);
        assert!(toasts[0].is_sticky());
    }

    #[test]
    fn test_dismissed_notice_not_shown_again() {
        let queue = Rc::new(ToastQueue::new());
        let notice = UnauthorizedNotice::new(queue.clone());

        assert!(notice.notify());
        let id = queue.toasts()[0].id;
        assert!(queue.dismiss(id));

        assert!(!notice.notify());
        assert!(queue.is_empty());
    }
}
