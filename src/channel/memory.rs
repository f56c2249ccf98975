//! In-Memory Message Channel
//!
//! A native stand-in for the browser's `MessageChannel`: two entangled ports
//! backed by unbounded tokio channels. Used by the host simulator and tests.

use serde_json::Value;
use std::cell::{Cell, RefCell};
use tokio::sync::mpsc;

use super::{ChannelError, ChannelResult, MessagePort};

/// A pair of connected ports
pub struct MessageChannel {
    pub port1: MemoryPort,
    pub port2: MemoryPort,
}

impl MessageChannel {
    pub fn new() -> Self {
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();

        Self {
            port1: MemoryPort::new(tx1, rx2),
            port2: MemoryPort::new(tx2, rx1),
        }
    }
}

impl Default for MessageChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// One end of a [`MessageChannel`]
pub struct MemoryPort {
    outbound: mpsc::UnboundedSender<Value>,
    inbound: RefCell<mpsc::UnboundedReceiver<Value>>,
    closed: Cell<bool>,
}

impl MemoryPort {
    fn new(outbound: mpsc::UnboundedSender<Value>, inbound: mpsc::UnboundedReceiver<Value>) -> Self {
        Self {
            outbound,
            inbound: RefCell::new(inbound),
            closed: Cell::new(false),
        }
    }

    /// Take the next delivered message, if any
    pub fn try_recv(&self) -> Option<Value> {
        if self.closed.get() {
            return None;
        }
        self.inbound.borrow_mut().try_recv().ok()
    }

    /// Take every message delivered so far
    pub fn drain(&self) -> Vec<Value> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl MessagePort for MemoryPort {
    fn post_message(&self, message: Value) -> ChannelResult<()> {
        if self.closed.get() {
            return Err(ChannelError::PortClosed);
        }
        self.outbound
            .send(message)
            .map_err(|_| ChannelError::PortClosed)
    }

    fn close(&self) {
        self.closed.set(true);
        self.inbound.borrow_mut().close();
    }
}
