//! Failure Boundary
//!
//! Supervises the mounted dashboard tree. A caught rendering failure is
//! answered with a full-page reload carrying an incremented attempt counter,
//! until the ceiling is reached.

use thiserror::Error;
use url::Url;

use super::retry::{next_attempt, RetryDecision};
use crate::frame::Frame;

/// Heading of the fallback view shown after a failure
pub const FALLBACK_MESSAGE: &str = "Unexpected error";

/// A failure while mounting or rendering the application tree
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Mount element #{0} not found")]
    MountPointMissing(String),

    #[error("Failed to load {resource}: {reason}")]
    Load { resource: String, reason: String },

    #[error("Render failed: {0}")]
    Render(String),
}

/// Catches render failures and applies the reload policy
#[derive(Debug, Clone)]
pub struct FailureBoundary {
    ceiling: u32,
    caught: Option<RenderError>,
}

impl FailureBoundary {
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            caught: None,
        }
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Last error caught, i.e. what the fallback view reports
    pub fn error(&self) -> Option<&RenderError> {
        self.caught.as_ref()
    }

    pub fn has_failed(&self) -> bool {
        self.caught.is_some()
    }

    /// Record a failure and act on the retry policy
    ///
    /// Returns `None` only when the current location cannot be parsed, in
    /// which case no reload is attempted.
    pub fn catch<F: Frame>(&mut self, frame: &mut F, error: RenderError) -> Option<RetryDecision> {
        let href = frame.location_href();
        tracing::debug!(error = %error, href = %href, "error loading embedded frame");
        self.caught = Some(error);

        let location = match Url::parse(&href) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(href = %href, error = %e, "Cannot parse page URL, not retrying");
                return None;
            }
        };

        let decision = next_attempt(&location, self.ceiling);
        match &decision {
            RetryDecision::Reload { url, attempt } => {
                tracing::debug!(attempt, url = %url, "retrying embed");
                frame.replace_location(url);
            }
            RetryDecision::Exhausted { attempt } => {
                tracing::warn!(
                    attempt,
                    ceiling = self.ceiling,
                    "Embed retries exhausted, leaving failure view in place"
                );
            }
        }

        Some(decision)
    }
}
