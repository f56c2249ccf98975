//! Embedded Page
//!
//! Entry point of the embedded frame. Performs the pre-flight frame check,
//! listens for the host's handshake and owns the resulting channel.

use serde_json::Value;
use std::rc::Rc;

use super::bootstrap::BootstrapData;
use super::boundary::{FailureBoundary, RenderError};
use super::notice::UnauthorizedNotice;
use super::retry::RetryDecision;
use super::session::GuestSession;
use crate::channel::{ChannelError, ChannelOptions, Completion, MessagePort, Switchboard};
use crate::client::ApiClient;
use crate::config::EmbeddedConfig;
use crate::frame::{Frame, NOT_EMBEDDED_MESSAGE};
use crate::protocol::{validate_message, EnvelopeError, OriginPolicy, RpcMethod};
use crate::toast::ToastSink;

/// Lifecycle phase of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePhase {
    /// Opened outside an iframe; terminal
    NotEmbedded,
    /// Waiting for the host's port transfer
    AwaitingHandshake,
    /// A channel is live
    Connected,
}

/// A message event received on the frame's window
#[derive(Debug)]
pub struct InboundMessage<P> {
    pub origin: String,
    pub data: Value,
    pub ports: Vec<P>,
}

impl<P> InboundMessage<P> {
    pub fn new(origin: impl Into<String>, data: Value, ports: Vec<P>) -> Self {
        Self {
            origin: origin.into(),
            data,
            ports,
        }
    }
}

/// What the page did with a window message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// The page is not listening (not embedded)
    Inactive,
    /// Not an embedded-comms envelope; dropped
    Ignored(EnvelopeError),
    /// Valid envelope that did not transfer a port
    Acknowledged,
    /// A channel was set up on the transferred port
    ChannelStarted { replaced: bool },
    /// The port was unusable
    ChannelFailed(ChannelError),
}

type Channel<F, C, P> = Switchboard<P, GuestSession<F, C>>;

/// The embedded frame's state for one page load
pub struct EmbeddedPage<F: Frame, C: ApiClient, P: MessagePort> {
    options: ChannelOptions,
    origin_policy: OriginPolicy,
    phase: PagePhase,
    session: GuestSession<F, C>,
    channel: Option<Channel<F, C, P>>,
    channels_opened: u32,
}

impl<F: Frame, C: ApiClient, P: MessagePort> EmbeddedPage<F, C, P> {
    /// Set up the page; renders the failure text if not inside an iframe
    pub fn boot(
        config: &EmbeddedConfig,
        bootstrap: &BootstrapData,
        mut frame: F,
        client: C,
        toasts: Rc<dyn ToastSink>,
    ) -> Self {
        let phase = if frame.is_embedded() {
            PagePhase::AwaitingHandshake
        } else {
            frame.show_failure_message(NOT_EMBEDDED_MESSAGE);
            PagePhase::NotEmbedded
        };

        let origin_policy = OriginPolicy::from_allowed(&config.allowed_origins);
        if phase == PagePhase::AwaitingHandshake && origin_policy.is_open() {
            tracing::warn!("No allowed origins configured; any page embedding this frame can open a channel");
        }

        let header_name = bootstrap.guest_token_header_name(&config.guest_token_header_name);
        let notice = Rc::new(UnauthorizedNotice::new(toasts));
        let session = GuestSession::new(
            frame,
            client,
            notice,
            FailureBoundary::new(config.retry_ceiling),
            header_name,
        );

        if phase == PagePhase::AwaitingHandshake {
            tracing::debug!("embed page is ready to receive messages");
        }

        Self {
            options: ChannelOptions::new(config.channel_name.clone(), config.debug),
            origin_policy,
            phase,
            session,
            channel: None,
            channels_opened: 0,
        }
    }

    pub fn phase(&self) -> PagePhase {
        self.phase
    }

    /// Whether a window message listener should be installed at all
    pub fn is_listening(&self) -> bool {
        self.phase != PagePhase::NotEmbedded
    }

    /// Handle a message event posted on the frame's window
    pub fn on_message(&mut self, message: InboundMessage<P>) -> HandshakeOutcome {
        if !self.is_listening() {
            return HandshakeOutcome::Inactive;
        }

        let envelope = match validate_message(&message.origin, &message.data, &self.origin_policy) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(origin = %message.origin, error = %e, "ignoring message unrelated to embedded comms");
                return HandshakeOutcome::Ignored(e);
            }
        };

        let Some(port) = message.ports.into_iter().next() else {
            tracing::debug!(?envelope, "Envelope carries no port");
            return HandshakeOutcome::Acknowledged;
        };
        if !envelope.is_port_transfer() {
            tracing::debug!(?envelope, "Envelope is not a port transfer");
            return HandshakeOutcome::Acknowledged;
        }

        tracing::debug!(origin = %message.origin, "message port received");
        match self.open_channel(port) {
            Ok(replaced) => HandshakeOutcome::ChannelStarted { replaced },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start channel");
                HandshakeOutcome::ChannelFailed(e)
            }
        }
    }

    /// Channel bound to `port` with both RPC methods defined, not yet started
    fn prepare_channel(&self, port: P) -> Result<Channel<F, C, P>, ChannelError> {
        let mut channel: Channel<F, C, P> = Switchboard::new(port, self.options.clone());
        channel.define_method(RpcMethod::GuestToken.as_str(), GuestSession::guest_token_rpc)?;
        channel.define_method(RpcMethod::GetScrollSize.as_str(), GuestSession::scroll_size_rpc)?;
        Ok(channel)
    }

    fn open_channel(&mut self, port: P) -> Result<bool, ChannelError> {
        let mut channel = self.prepare_channel(port)?;
        channel.start(&mut self.session);

        let replaced = match self.channel.replace(channel) {
            Some(previous) => {
                tracing::info!("Host sent a new port; replacing existing channel");
                previous.close();
                true
            }
            None => false,
        };

        self.channels_opened += 1;
        self.phase = PagePhase::Connected;
        Ok(replaced)
    }

    /// Handle a message received on the live channel's port
    pub fn on_channel_message(&mut self, message: Value) -> Option<Completion> {
        let channel = self.channel.as_mut()?;
        match channel.handle_message(&mut self.session, message) {
            Ok(completion) => completion,
            Err(e) => {
                tracing::debug!(error = %e, "Dropped channel message");
                None
            }
        }
    }

    /// Report a rendering failure from the mounted tree
    pub fn on_render_failure(&mut self, error: RenderError) -> Option<RetryDecision> {
        self.session.report_render_failure(error)
    }

    pub fn channel(&self) -> Option<&Channel<F, C, P>> {
        self.channel.as_ref()
    }

    /// Port of the live channel
    pub fn channel_port(&self) -> Option<&P> {
        self.channel.as_ref().map(Switchboard::port)
    }

    /// Number of channels opened over the page's lifetime
    pub fn channels_opened(&self) -> u32 {
        self.channels_opened
    }

    pub fn session(&self) -> &GuestSession<F, C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GuestSession<F, C> {
        &mut self.session
    }
}

#[cfg(feature = "native")]
impl<F: Frame, C: ApiClient> EmbeddedPage<F, C, crate::channel::MemoryPort> {
    /// Process everything delivered on the live channel's port
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.channel_port().and_then(|p| p.try_recv()) {
            self.on_channel_message(message);
            handled += 1;
        }
        handled
    }
}

#[cfg(all(test, feature = "native"))]
mod tests {
    use super::*;
    use crate::channel::MessageChannel;
    use crate::embedded::session::tests::RecordingClient;
    use crate::frame::HeadlessFrame;
    use crate::protocol::{Envelope, ScrollSize};
    use crate::toast::ToastQueue;
    use serde_json::json;

    type TestPage = EmbeddedPage<HeadlessFrame, Rc<RecordingClient>, crate::channel::MemoryPort>;

    const HREF: &str = "https://bi.example/embedded/6a3c/";

    fn boot_with(config: EmbeddedConfig, frame: HeadlessFrame) -> (TestPage, Rc<RecordingClient>, Rc<ToastQueue>) {
        let client = Rc::new(RecordingClient::default());
        let toasts = Rc::new(ToastQueue::new());
        let page = EmbeddedPage::boot(
            &config,
            &BootstrapData::default(),
            frame,
            Rc::clone(&client),
            toasts.clone(),
        );
        (page, client, toasts)
    }

    fn boot(frame: HeadlessFrame) -> (TestPage, Rc<RecordingClient>, Rc<ToastQueue>) {
        boot_with(EmbeddedConfig::default(), frame)
    }

    /// Returns the host's port after a successful handshake
    fn handshake(page: &mut TestPage) -> crate::channel::MemoryPort {
        let MessageChannel { port1, port2 } = MessageChannel::new();
        let outcome = page.on_message(InboundMessage::new(
            "https://portal.example",
            Envelope::port_transfer().to_value(),
            vec![port2],
        ));
        assert!(matches!(outcome, HandshakeOutcome::ChannelStarted { .. }));
        port1
    }

    fn get(method: &str, id: &str, args: Value) -> Value {
        json!({"switchboardAction": "get", "method": method, "messageId": id, "args": args})
    }

    #[test]
    fn test_not_embedded_fast_path() {
        let (mut page, client, _) = boot(HeadlessFrame::top_level(HREF));

        assert_eq!(page.phase(), PagePhase::NotEmbedded);
        assert!(!page.is_listening());
        assert_eq!(page.session().frame().mount_content(), Some(NOT_EMBEDDED_MESSAGE));

        let MessageChannel { port1: _host, port2 } = MessageChannel::new();
        let outcome = page.on_message(InboundMessage::new(
            "https://portal.example",
            Envelope::port_transfer().to_value(),
            vec![port2],
        ));
        assert_eq!(outcome, HandshakeOutcome::Inactive);
        assert!(page.channel().is_none());
        assert_eq!(page.channels_opened(), 0);
        assert!(client.tokens().is_empty());
    }

    #[test]
    fn test_foreign_messages_have_no_side_effects() {
        let (mut page, _, _) = boot(HeadlessFrame::embedded(HREF));

        for data in [json!("hello"), json!({"type": "other", "handshake": "port transfer"}), json!(null)] {
            let MessageChannel { port1: _host, port2 } = MessageChannel::new();
            let outcome = page.on_message(InboundMessage::new("https://x.example", data, vec![port2]));
            assert!(matches!(outcome, HandshakeOutcome::Ignored(_)));
        }

        assert_eq!(page.phase(), PagePhase::AwaitingHandshake);
        assert!(page.channel().is_none());
        assert_eq!(page.channels_opened(), 0);
    }

    #[test]
    fn test_envelope_without_port_or_transfer() {
        let (mut page, _, _) = boot(HeadlessFrame::embedded(HREF));

        let outcome = page.on_message(InboundMessage::new("", Envelope::port_transfer().to_value(), vec![]));
        assert_eq!(outcome, HandshakeOutcome::Acknowledged);

        let MessageChannel { port1: _host, port2 } = MessageChannel::new();
        let outcome = page.on_message(InboundMessage::new(
            "",
            json!({"type": "__embedded_comms__", "handshake": "hello"}),
            vec![port2],
        ));
        assert_eq!(outcome, HandshakeOutcome::Acknowledged);
        assert!(page.channel().is_none());
    }

    #[test]
    fn test_handshake_registers_both_methods_before_start() {
        let (mut page, client, _) = boot(HeadlessFrame::embedded(HREF));
        let MessageChannel { port1: host, port2 } = MessageChannel::new();

        let mut channel = page.prepare_channel(port2).unwrap();
        assert!(!channel.is_started());
        assert_eq!(
            channel.registered_methods(),
            vec![RpcMethod::GuestToken, RpcMethod::GetScrollSize]
        );

        // Held back until start, then answered from the backlog
        channel
            .handle_message(page.session_mut(), get("guestToken", "m_host_1", json!({"guestToken": "abc"})))
            .unwrap();
        assert!(host.try_recv().is_none());
        assert!(client.tokens().is_empty());

        channel.start(page.session_mut());
        let reply = host.try_recv().unwrap();
        assert_eq!(reply["switchboardAction"], "reply");
        assert_eq!(reply["messageId"], "m_host_1");
        assert_eq!(client.tokens(), vec!["abc"]);
    }

    #[test]
    fn test_handshake_starts_named_channel() {
        let (mut page, _, _) = boot(HeadlessFrame::embedded(HREF));
        let _host = handshake(&mut page);

        let channel = page.channel().unwrap();
        assert!(channel.is_started());
        assert_eq!(channel.name(), "superset");
        assert_eq!(
            channel.registered_methods(),
            vec![RpcMethod::GuestToken, RpcMethod::GetScrollSize]
        );
        assert_eq!(page.channels_opened(), 1);
        assert_eq!(page.phase(), PagePhase::Connected);
    }

    #[test]
    fn test_guest_token_over_channel() {
        let (mut page, client, _) = boot(HeadlessFrame::embedded(HREF));
        let host = handshake(&mut page);

        host.post_message(get("guestToken", "m_host_1", json!({"guestToken": "abc"}))).unwrap();
        host.post_message(get("guestToken", "m_host_2", json!({"guestToken": "def"}))).unwrap();
        assert_eq!(page.pump(), 2);

        let replies = host.drain();
        assert_eq!(replies.len(), 2);
        assert!(replies.iter().all(|r| r["switchboardAction"] == "reply"));
        assert_eq!(client.tokens(), vec!["abc", "def"]);
        assert_eq!(page.session().frame().mount_count(), 1);
    }

    #[test]
    fn test_scroll_size_over_channel() {
        let frame = HeadlessFrame::embedded(HREF).with_scroll_size(ScrollSize::new(1280, 900));
        let (mut page, _, _) = boot(frame);
        let host = handshake(&mut page);

        host.post_message(get("getScrollSize", "m_host_1", Value::Null)).unwrap();
        page.pump();
        assert_eq!(host.try_recv().unwrap()["result"], json!({"width": 1280, "height": 900}));

        page.session_mut().frame_mut().set_scroll_size(ScrollSize::new(1280, 2400));
        host.post_message(get("getScrollSize", "m_host_2", Value::Null)).unwrap();
        page.pump();
        assert_eq!(host.try_recv().unwrap()["result"], json!({"width": 1280, "height": 2400}));
    }

    #[test]
    fn test_second_handshake_replaces_channel() {
        let (mut page, client, _) = boot(HeadlessFrame::embedded(HREF));
        let first_host = handshake(&mut page);

        let MessageChannel { port1: second_host, port2 } = MessageChannel::new();
        let outcome = page.on_message(InboundMessage::new("", Envelope::port_transfer().to_value(), vec![port2]));
        assert_eq!(outcome, HandshakeOutcome::ChannelStarted { replaced: true });
        assert_eq!(page.channels_opened(), 2);

        // The old port is closed: the host can no longer reach the frame through it
        assert!(first_host.post_message(get("guestToken", "m_1", json!({"guestToken": "old"}))).is_err());

        second_host.post_message(get("guestToken", "m_1", json!({"guestToken": "new"}))).unwrap();
        page.pump();
        assert_eq!(client.tokens(), vec!["new"]);
    }

    #[test]
    fn test_origin_allow_list_enforced() {
        let config = EmbeddedConfig {
            allowed_origins: vec!["https://portal.example".to_string()],
            ..EmbeddedConfig::default()
        };
        let (mut page, _, _) = boot_with(config, HeadlessFrame::embedded(HREF));

        let MessageChannel { port1: _host, port2 } = MessageChannel::new();
        let outcome = page.on_message(InboundMessage::new(
            "https://evil.example",
            Envelope::port_transfer().to_value(),
            vec![port2],
        ));
        assert_eq!(
            outcome,
            HandshakeOutcome::Ignored(EnvelopeError::OriginNotAllowed("https://evil.example".to_string()))
        );

        let _host = handshake(&mut page);
        assert_eq!(page.phase(), PagePhase::Connected);
    }

    #[test]
    fn test_bootstrap_header_name_wins() {
        let client = Rc::new(RecordingClient::default());
        let bootstrap =
            BootstrapData::from_json(r#"{"config": {"GUEST_TOKEN_HEADER_NAME": "X-Embed-Token"}}"#).unwrap();
        let page: TestPage = EmbeddedPage::boot(
            &EmbeddedConfig::default(),
            &bootstrap,
            HeadlessFrame::embedded(HREF),
            Rc::clone(&client),
            Rc::new(ToastQueue::new()),
        );
        assert_eq!(page.session().guest_token_header_name(), "X-Embed-Token");
    }

    #[test]
    fn test_render_failure_reload_then_exhausted() {
        let (mut page, _, _) = boot(HeadlessFrame::embedded(format!("{HREF}?attempt=1")));
        let failure = || RenderError::Render("boom".to_string());

        assert!(matches!(page.on_render_failure(failure()), Some(RetryDecision::Reload { attempt: 2, .. })));
        assert!(matches!(page.on_render_failure(failure()), Some(RetryDecision::Reload { attempt: 3, .. })));
        assert_eq!(page.on_render_failure(failure()), Some(RetryDecision::Exhausted { attempt: 3 }));
        assert_eq!(page.session().frame().navigations().len(), 2);
    }

    #[test]
    fn test_unauthorized_after_handshake_single_toast() {
        let (mut page, client, toasts) = boot(HeadlessFrame::embedded(HREF));
        let host = handshake(&mut page);

        host.post_message(get("guestToken", "m_host_1", json!({"guestToken": "expired"}))).unwrap();
        page.pump();

        client.fail_unauthorized();
        client.fail_unauthorized();
        assert_eq!(toasts.len(), 1);
    }
}
