//! Host Simulator
//!
//! Plays the embedding page's part natively: posts the port-transfer
//! envelope, hands over guest tokens and polls the frame's scroll size.
//! Used by the binaries and by end-to-end tests.

use serde_json::{json, Value};
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

use crate::channel::{ChannelError, ChannelOptions, Completion, MemoryPort, MessageChannel, Switchboard};
use crate::client::{ClientError, SupersetClient};
use crate::config::Config;
use crate::embedded::{BootstrapData, EmbeddedPage, HandshakeOutcome, InboundMessage, PagePhase};
use crate::frame::HeadlessFrame;
use crate::protocol::{Envelope, RpcMethod, ScrollSize};
use crate::toast::ToastQueue;

/// Origin the simulated host posts from
pub const SIMULATED_HOST_ORIGIN: &str = "http://localhost:9001";

/// Host side of a channel with an embedded frame
pub struct HostSimulator {
    origin: String,
    switchboard: Switchboard<MemoryPort, ()>,
}

impl HostSimulator {
    /// Create the host end and the window message carrying the frame's port
    pub fn connect(origin: impl Into<String>, debug: bool) -> (Self, InboundMessage<MemoryPort>) {
        let origin = origin.into();
        let MessageChannel { port1, port2 } = MessageChannel::new();

        let mut switchboard = Switchboard::new(port1, ChannelOptions::new("host", debug));
        switchboard.start(&mut ());

        let handshake = InboundMessage::new(origin.clone(), Envelope::port_transfer().to_value(), vec![port2]);
        (Self { origin, switchboard }, handshake)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether the host end is already processing answers
    pub fn is_started(&self) -> bool {
        self.switchboard.is_started()
    }

    /// Hand a guest token to the frame; returns the message id
    pub fn send_guest_token(&mut self, guest_token: &str) -> Result<String, ChannelError> {
        self.switchboard
            .get(RpcMethod::GuestToken.as_str(), json!({ "guestToken": guest_token }))
    }

    /// Ask the frame for its scroll size; returns the message id
    pub fn request_scroll_size(&mut self) -> Result<String, ChannelError> {
        self.switchboard.get(RpcMethod::GetScrollSize.as_str(), Value::Null)
    }

    /// Call an arbitrary method on the frame
    pub fn call(&mut self, method: &str, args: Value) -> Result<String, ChannelError> {
        self.switchboard.get(method, args)
    }

    /// Collect every answer the frame has posted so far
    pub fn pump(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        while let Some(message) = self.switchboard.port().try_recv() {
            match self.switchboard.handle_message(&mut (), message) {
                Ok(Some(done)) => completions.push(done),
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "Host dropped message"),
            }
        }
        completions
    }

    /// Calls still waiting for an answer
    pub fn pending_calls(&self) -> usize {
        self.switchboard.pending_calls()
    }
}

/// Errors that abort a simulated session
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Handshake failed: {0:?}")]
    Handshake(HandshakeOutcome),

    #[error("Frame answered {method} with an error: {error}")]
    Rpc { method: RpcMethod, error: String },
}

/// What happened during a simulated embedding session
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub phase: PagePhase,
    pub guest_tokens_sent: u32,
    pub mounts: u32,
    pub scroll_size: Option<ScrollSize>,
    pub undefined_method_error: Option<String>,
    pub toasts: usize,
}

/// Run a complete session: handshake, two guest tokens, a scroll-size poll
/// and a call to a method the frame does not define
pub fn run_simulation(config: &Config, href: &str) -> Result<SimulationReport, SimulationError> {
    let frame = HeadlessFrame::embedded(href).with_scroll_size(ScrollSize::new(1280, 960));
    let client = SupersetClient::new(&config.api)?;
    let toasts = Rc::new(ToastQueue::new());

    let mut page: EmbeddedPage<HeadlessFrame, SupersetClient, MemoryPort> =
        EmbeddedPage::boot(&config.embedded, &BootstrapData::default(), frame, client, toasts.clone());

    let (mut host, handshake) = HostSimulator::connect(SIMULATED_HOST_ORIGIN, config.embedded.debug);
    match page.on_message(handshake) {
        HandshakeOutcome::ChannelStarted { .. } => {}
        other => return Err(SimulationError::Handshake(other)),
    }
    tracing::info!(origin = %host.origin(), "Handshake complete");

    let mut guest_tokens_sent = 0;
    for _ in 0..2 {
        let token = Uuid::new_v4().to_string();
        host.send_guest_token(&token)?;
        guest_tokens_sent += 1;
    }
    page.pump();
    for done in host.pump() {
        if let Completion::Failed { error, .. } = done {
            return Err(SimulationError::Rpc {
                method: RpcMethod::GuestToken,
                error,
            });
        }
    }

    host.request_scroll_size()?;
    page.pump();
    let scroll_size: Option<ScrollSize> = host.pump().into_iter().find_map(|done| match done {
        Completion::Reply { result, .. } => serde_json::from_value(result).ok(),
        Completion::Failed { .. } => None,
    });
    if let Some(size) = scroll_size {
        tracing::info!(width = size.width, height = size.height, "Scroll size reported");
    }

    host.call("getDataMask", Value::Null)?;
    page.pump();
    let undefined_method_error = host.pump().into_iter().find_map(|done| match done {
        Completion::Failed { error, .. } => Some(error),
        Completion::Reply { .. } => None,
    });

    Ok(SimulationReport {
        phase: page.phase(),
        guest_tokens_sent,
        mounts: page.session().frame().mount_count(),
        scroll_size,
        undefined_method_error,
        toasts: toasts.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_session() {
        let report = run_simulation(&Config::default(), "http://localhost:8088/embedded/6a3c/").unwrap();

        assert_eq!(report.phase, PagePhase::Connected);
        assert_eq!(report.guest_tokens_sent, 2);
        assert_eq!(report.mounts, 1);
        assert_eq!(report.scroll_size, Some(ScrollSize::new(1280, 960)));
        assert_eq!(
            report.undefined_method_error.as_deref(),
            Some("[superset] Method \"getDataMask\" is not defined")
        );
        assert_eq!(report.toasts, 0);
    }

    #[test]
    fn test_disallowed_origin_aborts() {
        let mut config = Config::default();
        config.embedded.allowed_origins = vec!["https://portal.example".to_string()];

        let err = run_simulation(&config, "http://localhost:8088/embedded/6a3c/").unwrap_err();
        assert!(matches!(err, SimulationError::Handshake(HandshakeOutcome::Ignored(_))));
    }

    #[test]
    fn test_host_ids_and_pending() {
        let (mut host, handshake) = HostSimulator::connect(SIMULATED_HOST_ORIGIN, false);
        assert_eq!(handshake.origin, SIMULATED_HOST_ORIGIN);
        assert_eq!(handshake.ports.len(), 1);
        assert!(host.is_started());

        assert_eq!(host.send_guest_token("t").unwrap(), "m_host_1");
        assert_eq!(host.request_scroll_size().unwrap(), "m_host_2");
        assert_eq!(host.pending_calls(), 2);
        assert!(host.pump().is_empty());
    }
}
