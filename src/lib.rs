//! # Superset Embedded
//!
//! The guest side of an embedded Superset dashboard: the page that runs inside
//! a third-party iframe, receives a message port from its host and opens a
//! guest session with the token the host hands over.
//!
//! ## Features
//!
//! - **Handshake**: validates the `__embedded_comms__` envelope and adopts the
//!   transferred port
//! - **RPC channel**: `guestToken` and `getScrollSize` over a typed switchboard
//! - **Guest session**: configures the API client and bootstraps the app once
//! - **Failure recovery**: bounded reloads driven by an `attempt` URL parameter
//!
//! ## Modules
//!
//! - [`protocol`]: envelope validation and wire messages
//! - [`channel`]: method registry and switchboard over a [`channel::MessagePort`]
//! - [`embedded`]: page lifecycle, guest session, retry policy
//! - [`client`]: guest-token aware API client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use superset_embedded::host::{run_simulation, HostSimulator};
//! use superset_embedded::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let report = run_simulation(&config, "http://localhost:8088/embedded/6a3c/")?;
//!
//!     println!("Mounted {} time(s), scroll size {:?}", report.mounts, report.scroll_size);
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod client;
pub mod config;
pub mod embedded;
pub mod frame;
#[cfg(feature = "native")]
pub mod host;
#[cfg(feature = "native")]
pub mod logging;
pub mod protocol;
pub mod toast;

// Re-export top-level types for convenience
pub use channel::{ChannelError, ChannelOptions, Completion, MessagePort, Switchboard};

pub use client::{ApiClient, FetchError, GuestClientSettings, UnauthorizedHandler};

#[cfg(feature = "native")]
pub use client::{ClientError, SupersetClient};

pub use config::{ApiConfig, Config, ConfigError, EmbeddedConfig, LoggingConfig};

pub use embedded::{
    BootstrapData, BootstrapUser, EmbeddedPage, EmbeddedRoute, FailureBoundary, GuestSession,
    HandshakeOutcome, InboundMessage, PagePhase, RenderError, RetryDecision, UnauthorizedNotice,
};

pub use frame::{Frame, HeadlessFrame, NOT_EMBEDDED_MESSAGE};

pub use protocol::{validate_message, Envelope, EnvelopeError, OriginPolicy, RpcMethod, ScrollSize};

pub use toast::{Toast, ToastKind, ToastList, ToastQueue, ToastRequest, ToastSink};
