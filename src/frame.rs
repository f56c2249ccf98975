//! Frame Abstraction
//!
//! Everything the embedded page needs from the document it lives in:
//! window nesting, the mount element, scroll metrics and navigation.

use crate::embedded::{BootstrapUser, RenderError};
use crate::protocol::ScrollSize;
use std::collections::VecDeque;

/// Text shown when the page is opened outside of an iframe
pub const NOT_EMBEDDED_MESSAGE: &str =
    "This page is intended to be embedded in an iframe, but it looks like that is not the case.";

/// The document hosting the embedded application
pub trait Frame {
    /// True when the window has a parent window other than itself
    fn is_embedded(&self) -> bool;

    /// Replace the mount element's content with plain text
    fn show_failure_message(&mut self, message: &str);

    /// Current scrollable size of the document body
    fn scroll_size(&self) -> ScrollSize;

    /// Current page URL
    fn location_href(&self) -> String;

    /// Navigate to `url`, replacing the current history entry
    fn replace_location(&mut self, url: &str);

    /// Put the bootstrap user into the client-side store
    fn load_user(&mut self, user: &BootstrapUser);

    /// Render the application tree into the mount element
    fn mount_application(&mut self) -> Result<(), RenderError>;
}

/// In-memory frame for running the embedded page without a browser
#[derive(Debug, Clone)]
pub struct HeadlessFrame {
    embedded: bool,
    href: String,
    scroll: ScrollSize,
    mount_content: Option<String>,
    user: Option<BootstrapUser>,
    mount_count: u32,
    navigations: Vec<String>,
    mount_failures: VecDeque<RenderError>,
}

impl HeadlessFrame {
    fn new(embedded: bool, href: impl Into<String>) -> Self {
        Self {
            embedded,
            href: href.into(),
            scroll: ScrollSize::default(),
            mount_content: None,
            user: None,
            mount_count: 0,
            navigations: Vec::new(),
            mount_failures: VecDeque::new(),
        }
    }

    /// A frame nested inside a host page
    pub fn embedded(href: impl Into<String>) -> Self {
        Self::new(true, href)
    }

    /// A frame opened as a top-level window
    pub fn top_level(href: impl Into<String>) -> Self {
        Self::new(false, href)
    }

    pub fn with_scroll_size(mut self, size: ScrollSize) -> Self {
        self.scroll = size;
        self
    }

    /// Simulate the document growing or shrinking
    pub fn set_scroll_size(&mut self, size: ScrollSize) {
        self.scroll = size;
    }

    /// Make the next mount fail with `error`
    pub fn fail_next_mount(&mut self, error: RenderError) {
        self.mount_failures.push_back(error);
    }

    pub fn mount_content(&self) -> Option<&str> {
        self.mount_content.as_deref()
    }

    pub fn user(&self) -> Option<&BootstrapUser> {
        self.user.as_ref()
    }

    /// How many times the application tree was mounted
    pub fn mount_count(&self) -> u32 {
        self.mount_count
    }

    /// Every URL navigated to, in order
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

impl Frame for HeadlessFrame {
    fn is_embedded(&self) -> bool {
        self.embedded
    }

    fn show_failure_message(&mut self, message: &str) {
        self.mount_content = Some(message.to_string());
    }

    fn scroll_size(&self) -> ScrollSize {
        self.scroll
    }

    fn location_href(&self) -> String {
        self.href.clone()
    }

    fn replace_location(&mut self, url: &str) {
        self.href = url.to_string();
        self.navigations.push(url.to_string());
    }

    fn load_user(&mut self, user: &BootstrapUser) {
        self.user = Some(user.clone());
    }

    fn mount_application(&mut self) -> Result<(), RenderError> {
        self.mount_count += 1;
        if let Some(error) = self.mount_failures.pop_front() {
            return Err(error);
        }
        self.mount_content = Some("<EmbeddedApp />".to_string());
        Ok(())
    }
}
