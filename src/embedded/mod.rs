//! Embedded Page
//!
//! The guest side of an embedded dashboard: the page served inside a host's
//! iframe, its guest session and the failure handling around rendering.
//!
//! ## Lifecycle
//!
//! 1. [`EmbeddedPage::boot`] checks the frame is nested, otherwise it shows
//!    a static message and stops
//! 2. the host posts a port-transfer envelope carrying a `MessagePort`
//! 3. a [`Switchboard`](crate::channel::Switchboard) is opened on that port
//!    with `guestToken` and `getScrollSize` defined
//! 4. the first `guestToken` configures the API client and mounts the
//!    application; later tokens only refresh the client

mod boundary;
mod bootstrap;
mod notice;
mod page;
mod retry;
mod session;
mod user;

pub use boundary::{FailureBoundary, RenderError, FALLBACK_MESSAGE};
pub use bootstrap::{BootstrapConfig, BootstrapData, DashboardRef, EmbeddedBootstrap, EmbeddedRoute};
pub use notice::{UnauthorizedNotice, UNAUTHORIZED_MESSAGE};
pub use page::{EmbeddedPage, HandshakeOutcome, InboundMessage, PagePhase};
pub use retry::{current_attempt, next_attempt, with_attempt, RetryDecision, ATTEMPT_PARAM, DEFAULT_RETRY_CEILING};
pub use session::GuestSession;
pub use user::{BootstrapUser, GUEST_ROLE};
