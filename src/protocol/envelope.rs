//! Handshake Envelope
//!
//! Validation of the cross-document messages the host page posts into the
//! embedded frame before a channel exists.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Type tag every embedded-comms envelope must carry
pub const MESSAGE_TYPE: &str = "__embedded_comms__";

/// Handshake phase marking the transfer of a message port
pub const PORT_TRANSFER: &str = "port transfer";

/// A validated inbound envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Always equal to [`MESSAGE_TYPE`] once validated
    #[serde(rename = "type")]
    pub message_type: String,
    /// Handshake phase, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handshake: Option<String>,
}

impl Envelope {
    /// Envelope a host posts together with the port it transfers
    pub fn port_transfer() -> Self {
        Self {
            message_type: MESSAGE_TYPE.to_string(),
            handshake: Some(PORT_TRANSFER.to_string()),
        }
    }

    /// Whether this envelope asks the frame to adopt an attached port
    pub fn is_port_transfer(&self) -> bool {
        self.handshake.as_deref() == Some(PORT_TRANSFER)
    }

    /// Serialize to the JSON shape posted over the window
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": self.message_type,
            "handshake": self.handshake,
        })
    }
}

/// Which sender origins may open a channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Origin check disabled. Any page able to post to the frame is trusted.
    #[default]
    AllowAny,
    /// Only the listed origins (scheme://host[:port]) are accepted
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Build a policy from configured origins; an empty list disables the check
    pub fn from_allowed(origins: &[String]) -> Self {
        let origins: Vec<String> = origins
            .iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() {
            OriginPolicy::AllowAny
        } else {
            OriginPolicy::AllowList(origins)
        }
    }

    /// Check a sender origin against the policy
    pub fn permits(&self, origin: &str) -> bool {
        match self {
            OriginPolicy::AllowAny => true,
            OriginPolicy::AllowList(allowed) => {
                let origin = origin.trim_end_matches('/');
                allowed.iter().any(|a| a == origin)
            }
        }
    }

    /// True when no origin restriction is in force
    pub fn is_open(&self) -> bool {
        matches!(self, OriginPolicy::AllowAny)
    }
}

/// Reasons an inbound message is not an embedded-comms envelope
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("Message payload is not an object")]
    NotAnObject,

    #[error("Message type does not match type used for embedded comms")]
    TypeMismatch,

    #[error("Message origin {0} is not in the allowed list")]
    OriginNotAllowed(String),
}

/// Validate a raw message event payload
///
/// Errors mark messages unrelated to embedded comms; callers drop them.
pub fn validate_message(
    origin: &str,
    data: &Value,
    policy: &OriginPolicy,
) -> Result<Envelope, EnvelopeError> {
    if !policy.permits(origin) {
        return Err(EnvelopeError::OriginNotAllowed(origin.to_string()));
    }

    let object = data.as_object().ok_or(EnvelopeError::NotAnObject)?;

    match object.get("type").and_then(Value::as_str) {
        Some(MESSAGE_TYPE) => {}
        _ => return Err(EnvelopeError::TypeMismatch),
    }

    let handshake = object
        .get("handshake")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Envelope {
        message_type: MESSAGE_TYPE.to_string(),
        handshake,
    })
}
