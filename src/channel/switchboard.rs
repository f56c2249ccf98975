//! Switchboard
//!
//! Drives the request/reply protocol over one [`MessagePort`]. The channel
//! context `C` is lent to every handler invocation, so handlers are plain
//! functions with no captured state.

use serde_json::Value;
use std::collections::{HashSet, VecDeque};

use super::registry::{CommandRegistry, Handler};
use super::{ChannelError, ChannelOptions, ChannelResult, MessagePort};
use crate::protocol::{RpcMethod, SwitchboardMessage};

/// Outcome of a `get` issued from this end
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Reply { message_id: String, result: Value },
    Failed { message_id: String, error: String },
}

impl Completion {
    pub fn message_id(&self) -> &str {
        match self {
            Completion::Reply { message_id, .. } | Completion::Failed { message_id, .. } => {
                message_id
            }
        }
    }
}

/// One end of an RPC channel bound to a port
pub struct Switchboard<P: MessagePort, C> {
    port: P,
    options: ChannelOptions,
    registry: CommandRegistry<C>,
    started: bool,
    /// Messages handed in before `start`
    backlog: VecDeque<Value>,
    /// Ids of outstanding `get` calls
    pending: HashSet<String>,
    next_id: u64,
}

impl<P: MessagePort, C> Switchboard<P, C> {
    /// Bind a channel to a port. The port is owned by the channel from here on.
    pub fn new(port: P, options: ChannelOptions) -> Self {
        if options.debug {
            tracing::debug!(channel = %options.name, "Switchboard initialized");
        }

        Self {
            port,
            options,
            registry: CommandRegistry::new(),
            started: false,
            backlog: VecDeque::new(),
            pending: HashSet::new(),
            next_id: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Expose a method to the other end
    pub fn define_method(&mut self, name: &str, handler: Handler<C>) -> ChannelResult<RpcMethod> {
        let method = self.registry.register(name, handler)?;
        if self.options.debug {
            tracing::debug!(channel = %self.options.name, method = %method, "Method defined");
        }
        Ok(method)
    }

    pub fn registered_methods(&self) -> Vec<RpcMethod> {
        self.registry.methods()
    }

    /// Number of `get` calls still waiting for an answer
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    /// Start the port and process anything that arrived before
    ///
    /// A queued message that fails to dispatch is dropped; the rest of the
    /// backlog is still processed.
    pub fn start(&mut self, ctx: &mut C) -> Vec<Completion> {
        self.port.start();
        self.started = true;

        let mut completions = Vec::new();
        while let Some(message) = self.backlog.pop_front() {
            match self.dispatch(ctx, message) {
                Ok(Some(done)) => completions.push(done),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(channel = %self.options.name, error = %e, "Dropped queued message");
                }
            }
        }

        tracing::info!(
            channel = %self.options.name,
            methods = ?self.registry.methods(),
            "Switchboard started"
        );
        completions
    }

    /// Handle one message received on the port
    ///
    /// Non-switchboard traffic is ignored. Replies to our own `get` calls come
    /// back as a [`Completion`].
    pub fn handle_message(&mut self, ctx: &mut C, message: Value) -> ChannelResult<Option<Completion>> {
        if !self.started {
            self.backlog.push_back(message);
            return Ok(None);
        }
        self.dispatch(ctx, message)
    }

    /// Invoke a method on the other end; returns the message id to await
    pub fn get(&mut self, method: &str, args: Value) -> ChannelResult<String> {
        self.next_id += 1;
        let message_id = format!("m_{}_{}", self.options.name, self.next_id);

        self.post(SwitchboardMessage::Get {
            method: method.to_string(),
            message_id: message_id.clone(),
            args,
        })?;

        self.pending.insert(message_id.clone());
        Ok(message_id)
    }

    /// Fire-and-forget invocation on the other end
    pub fn emit(&self, method: &str, args: Value) -> ChannelResult<()> {
        self.post(SwitchboardMessage::Emit {
            method: method.to_string(),
            args,
        })
    }

    /// Close the underlying port
    pub fn close(&self) {
        self.port.close();
    }

    fn dispatch(&mut self, ctx: &mut C, message: Value) -> ChannelResult<Option<Completion>> {
        if !SwitchboardMessage::is_switchboard(&message) {
            if self.options.debug {
                tracing::debug!(channel = %self.options.name, ?message, "Ignoring non-switchboard message");
            }
            return Ok(None);
        }

        let parsed: SwitchboardMessage = serde_json::from_value(message)
            .map_err(|e| ChannelError::Malformed(e.to_string()))?;

        if self.options.debug {
            tracing::debug!(channel = %self.options.name, message = ?parsed, "Received");
        }

        match parsed {
            SwitchboardMessage::Get {
                method,
                message_id,
                args,
            } => {
                let reply = self.invoke(ctx, &method, args, &message_id);
                self.post(reply)?;
                Ok(None)
            }
            SwitchboardMessage::Emit { method, args } => {
                match self.registry.lookup(&method) {
                    Some(handler) => {
                        if let Err(e) = handler(ctx, args) {
                            tracing::debug!(channel = %self.options.name, method = %method, error = %e, "Emit handler failed");
                        }
                    }
                    None => {
                        tracing::debug!(channel = %self.options.name, method = %method, "Emit for undefined method");
                    }
                }
                Ok(None)
            }
            SwitchboardMessage::Reply { message_id, result } => {
                Ok(self.complete(Completion::Reply { message_id, result }))
            }
            SwitchboardMessage::Error { message_id, error } => {
                Ok(self.complete(Completion::Failed { message_id, error }))
            }
        }
    }

    fn invoke(&self, ctx: &mut C, method: &str, args: Value, message_id: &str) -> SwitchboardMessage {
        let name = &self.options.name;

        let Some(handler) = self.registry.lookup(method) else {
            return SwitchboardMessage::Error {
                message_id: message_id.to_string(),
                error: format!("[{name}] Method \"{method}\" is not defined"),
            };
        };

        match handler(ctx, args) {
            Ok(result) => SwitchboardMessage::Reply {
                message_id: message_id.to_string(),
                result,
            },
            Err(e) => {
                tracing::debug!(channel = %name, method = %method, error = %e, "Handler failed");
                SwitchboardMessage::Error {
                    message_id: message_id.to_string(),
                    error: format!("[{name}] Method \"{method}\" threw an error"),
                }
            }
        }
    }

    fn complete(&mut self, completion: Completion) -> Option<Completion> {
        if self.pending.remove(completion.message_id()) {
            Some(completion)
        } else {
            tracing::debug!(
                channel = %self.options.name,
                message_id = %completion.message_id(),
                "Answer for unknown message id"
            );
            None
        }
    }

    fn post(&self, message: SwitchboardMessage) -> ChannelResult<()> {
        if self.options.debug {
            tracing::debug!(channel = %self.options.name, ?message, "Sending");
        }
        self.port.post_message(message.to_value())
    }
}
