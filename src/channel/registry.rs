//! Command Registry
//!
//! Maps wire method names onto typed handlers. Only names from the closed
//! [`RpcMethod`] set can be registered.

use serde_json::Value;
use std::collections::HashMap;

use super::{ChannelError, ChannelResult};
use crate::protocol::{RpcError, RpcMethod};

/// A handler receives the channel context and the raw `args` payload
pub type Handler<C> = fn(&mut C, Value) -> Result<Value, RpcError>;

/// Method table of a channel
pub struct CommandRegistry<C> {
    handlers: HashMap<RpcMethod, Handler<C>>,
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> CommandRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a wire name
    ///
    /// Re-registering a method replaces its handler.
    pub fn register(&mut self, name: &str, handler: Handler<C>) -> ChannelResult<RpcMethod> {
        let method: RpcMethod = name
            .parse()
            .map_err(|_| ChannelError::UnknownMethod(name.to_string()))?;

        if self.handlers.insert(method, handler).is_some() {
            tracing::debug!(method = %method, "Replaced RPC handler");
        }

        Ok(method)
    }

    /// Find the handler for a wire name
    pub fn lookup(&self, name: &str) -> Option<Handler<C>> {
        let method: RpcMethod = name.parse().ok()?;
        self.handlers.get(&method).copied()
    }

    pub fn is_registered(&self, method: RpcMethod) -> bool {
        self.handlers.contains_key(&method)
    }

    /// Registered methods in a stable order
    pub fn methods(&self) -> Vec<RpcMethod> {
        let mut methods: Vec<_> = self.handlers.keys().copied().collect();
        methods.sort();
        methods
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
