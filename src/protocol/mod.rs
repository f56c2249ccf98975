//! Embedded Comms Protocol
//!
//! Message formats shared by the embedded frame and its host.
//!
//! ## Phases
//!
//! 1. **Handshake**: the host posts an [`Envelope`] on the frame's window
//!    with a `MessagePort` attached.
//! 2. **Channel**: both sides exchange [`SwitchboardMessage`]s over that port.
//!
//! ## Example
//!
//! ```javascript
//! // Host page
//! const channel = new MessageChannel();
//! iframe.contentWindow.postMessage(
//!   { type: '__embedded_comms__', handshake: 'port transfer' },
//!   '*',
//!   [channel.port2],
//! );
//! ```

mod envelope;
mod messages;
mod rpc;

pub use envelope::{validate_message, Envelope, EnvelopeError, OriginPolicy, MESSAGE_TYPE, PORT_TRANSFER};
pub use messages::{SwitchboardMessage, ACTION_KEY};
pub use rpc::{GuestTokenArgs, RpcError, RpcMethod, ScrollSize, UnknownMethod};
