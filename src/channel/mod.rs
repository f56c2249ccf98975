//! Cross-Frame Channel
//!
//! A request/reply transport over a single transferred message port.
//!
//! ## Architecture
//!
//! - **MessagePort**: the raw bidirectional port (browser `MessagePort`,
//!   or [`MemoryPort`] natively)
//! - **CommandRegistry**: typed method table, closed over [`RpcMethod`]
//! - **Switchboard**: wire protocol driver (`get`/`reply`/`error`/`emit`)
//!
//! [`RpcMethod`]: crate::protocol::RpcMethod

#[cfg(feature = "native")]
mod memory;
mod registry;
mod switchboard;

#[cfg(feature = "native")]
pub use memory::{MemoryPort, MessageChannel};
pub use registry::{CommandRegistry, Handler};
pub use switchboard::{Completion, Switchboard};

use serde_json::Value;
use thiserror::Error;

/// One end of a message channel
///
/// Delivery of inbound messages is push-based: whoever owns the receiving
/// side hands them to [`Switchboard::handle_message`].
pub trait MessagePort {
    /// Post a message to the other end
    fn post_message(&self, message: Value) -> ChannelResult<()>;

    /// Begin delivering queued inbound messages
    fn start(&self) {}

    /// Disconnect the port
    fn close(&self) {}
}

/// Identity and diagnostics of a channel end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOptions {
    /// Name used in message ids and error texts
    pub name: String,
    /// Log every message crossing the port
    pub debug: bool,
}

impl ChannelOptions {
    pub fn new(name: impl Into<String>, debug: bool) -> Self {
        Self {
            name: name.into(),
            debug,
        }
    }
}

/// Errors raised by the channel itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Method name outside the closed RPC set
    #[error("Unknown RPC method: {0}")]
    UnknownMethod(String),

    /// The port has been closed or its peer is gone
    #[error("Message port closed")]
    PortClosed,

    /// A message carried a switchboard action but not a valid body
    #[error("Malformed switchboard message: {0}")]
    Malformed(String),
}

/// Result type alias for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;
