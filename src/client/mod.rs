//! Guest API Client
//!
//! The embedded page talks to the Superset API as a guest: every request
//! carries the guest token in a configurable header, and authorization
//! failures are reported to a callback instead of redirecting to a login.

#[cfg(feature = "native")]
mod http;
mod models;

#[cfg(feature = "native")]
pub use http::{ClientError, SupersetClient};
pub use models::{
    dashboard_endpoint, embedded_dashboard_endpoint, DashboardInfo, EmbeddedDashboard, ResultEnvelope,
};

use std::fmt;
use std::rc::Rc;
use thiserror::Error;

use crate::embedded::RenderError;

/// Header Superset reads the guest token from unless configured otherwise
pub const DEFAULT_GUEST_TOKEN_HEADER: &str = "X-GuestToken";

/// Callback invoked on every authorization failure
pub type UnauthorizedHandler = Rc<dyn Fn()>;

/// Request decoration installed by the guest session
#[derive(Clone)]
pub struct GuestClientSettings {
    pub guest_token: String,
    pub guest_token_header_name: String,
    pub unauthorized_handler: Option<UnauthorizedHandler>,
}

impl GuestClientSettings {
    pub fn new(guest_token: impl Into<String>, header_name: impl Into<String>) -> Self {
        Self {
            guest_token: guest_token.into(),
            guest_token_header_name: header_name.into(),
            unauthorized_handler: None,
        }
    }

    pub fn with_unauthorized_handler(mut self, handler: UnauthorizedHandler) -> Self {
        self.unauthorized_handler = Some(handler);
        self
    }

    /// Run the unauthorized callback, if any
    pub fn notify_unauthorized(&self) {
        if let Some(handler) = &self.unauthorized_handler {
            handler();
        }
    }
}

impl fmt::Debug for GuestClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestClientSettings")
            .field("guest_token", &"<redacted>")
            .field("guest_token_header_name", &self.guest_token_header_name)
            .field("unauthorized_handler", &self.unauthorized_handler.is_some())
            .finish()
    }
}

/// Why a guest API request produced no data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Guest token rejected; the unauthorized handler has already run
    #[error("Guest token rejected by the server")]
    Unauthorized,

    #[error("Failed to load {resource}: {reason}")]
    Failed { resource: String, reason: String },
}

impl FetchError {
    pub fn failed(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        FetchError::Failed {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// The render failure to hand to the failure boundary
    ///
    /// `None` for [`FetchError::Unauthorized`]: the page keeps rendering in a
    /// degraded state under the session notice and is never reloaded.
    pub fn into_render_error(self) -> Option<RenderError> {
        match self {
            FetchError::Unauthorized => None,
            FetchError::Failed { resource, reason } => Some(RenderError::Load { resource, reason }),
        }
    }
}

/// An API client the guest session can (re)configure
pub trait ApiClient {
    /// Replace the client's guest settings wholesale
    fn configure(&self, settings: GuestClientSettings);
}

impl<T: ApiClient + ?Sized> ApiClient for Rc<T> {
    fn configure(&self, settings: GuestClientSettings) {
        (**self).configure(settings)
    }
}
