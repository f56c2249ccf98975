//! RPC Method Set
//!
//! The closed set of methods the embedded frame exposes to its host, and
//! their argument/result payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Methods the host may invoke over the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RpcMethod {
    /// Hand a (possibly rotated) guest token to the frame
    GuestToken,
    /// Report the document's scrollable size for iframe auto-sizing
    GetScrollSize,
}

impl RpcMethod {
    /// Every known method
    pub const ALL: [RpcMethod; 2] = [RpcMethod::GuestToken, RpcMethod::GetScrollSize];

    /// Wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::GuestToken => "guestToken",
            RpcMethod::GetScrollSize => "getScrollSize",
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RpcMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RpcMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// A method name outside the known set
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown RPC method: {0}")]
pub struct UnknownMethod(pub String);

/// Arguments of `guestToken`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestTokenArgs {
    pub guest_token: String,
}

/// Result of `getScrollSize`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollSize {
    pub width: u32,
    pub height: u32,
}

impl ScrollSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Failures raised by an RPC handler
///
/// These are turned into `error` replies by the channel and never escape it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    #[error("Invalid arguments for {method}: {reason}")]
    InvalidArgs { method: RpcMethod, reason: String },

    #[error("Handler failed: {0}")]
    Handler(String),
}

impl RpcError {
    pub fn invalid_args(method: RpcMethod, err: impl fmt::Display) -> Self {
        RpcError::InvalidArgs {
            method,
            reason: err.to_string(),
        }
    }
}
