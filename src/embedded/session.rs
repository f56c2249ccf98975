//! Guest Session
//!
//! Channel context of the embedded page: reacts to guest tokens handed over
//! by the host and answers scroll-size queries.

use serde_json::Value;
use std::rc::Rc;

use super::boundary::{FailureBoundary, RenderError};
use super::notice::UnauthorizedNotice;
use super::retry::RetryDecision;
use super::user::BootstrapUser;
use crate::client::{ApiClient, GuestClientSettings};
use crate::frame::Frame;
use crate::protocol::{GuestTokenArgs, RpcError, RpcMethod, ScrollSize};

/// Per-page guest session state
pub struct GuestSession<F: Frame, C: ApiClient> {
    frame: F,
    client: C,
    notice: Rc<UnauthorizedNotice>,
    boundary: FailureBoundary,
    guest_token_header_name: String,
    /// Application bootstrapped; later tokens only refresh the client
    started: bool,
    token_updates: u32,
}

impl<F: Frame, C: ApiClient> GuestSession<F, C> {
    pub fn new(
        frame: F,
        client: C,
        notice: Rc<UnauthorizedNotice>,
        boundary: FailureBoundary,
        guest_token_header_name: impl Into<String>,
    ) -> Self {
        Self {
            frame,
            client,
            notice,
            boundary,
            guest_token_header_name: guest_token_header_name.into(),
            started: false,
            token_updates: 0,
        }
    }

    /// Install a guest token; bootstraps the application on first use
    pub fn activate(&mut self, guest_token: &str) {
        let settings = GuestClientSettings::new(guest_token, self.guest_token_header_name.as_str())
            .with_unauthorized_handler(self.notice.handler());
        self.client.configure(settings);
        self.token_updates += 1;

        if !self.started {
            self.start();
            self.started = true;
        } else {
            tracing::debug!(updates = self.token_updates, "Guest token refreshed");
        }
    }

    fn start(&mut self) {
        let user = BootstrapUser::guest();
        self.frame.load_user(&user);

        match self.frame.mount_application() {
            Ok(()) => tracing::info!(username = %user.username, "Embedded application mounted"),
            Err(e) => {
                self.boundary.catch(&mut self.frame, e);
            }
        }
    }

    /// Route a rendering failure raised after mount to the boundary
    pub fn report_render_failure(&mut self, error: RenderError) -> Option<RetryDecision> {
        self.boundary.catch(&mut self.frame, error)
    }

    pub fn scroll_size(&self) -> ScrollSize {
        self.frame.scroll_size()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of guest tokens received so far
    pub fn token_updates(&self) -> u32 {
        self.token_updates
    }

    pub fn guest_token_header_name(&self) -> &str {
        &self.guest_token_header_name
    }

    pub fn frame(&self) -> &F {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut F {
        &mut self.frame
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn notice(&self) -> &Rc<UnauthorizedNotice> {
        &self.notice
    }

    pub fn boundary(&self) -> &FailureBoundary {
        &self.boundary
    }

    /// `guestToken` RPC handler
    pub(crate) fn guest_token_rpc(&mut self, args: Value) -> Result<Value, RpcError> {
        let args: GuestTokenArgs = serde_json::from_value(args)
            .map_err(|e| RpcError::invalid_args(RpcMethod::GuestToken, e))?;
        self.activate(&args.guest_token);
        Ok(Value::Null)
    }

    /// `getScrollSize` RPC handler
    pub(crate) fn scroll_size_rpc(&mut self, _args: Value) -> Result<Value, RpcError> {
        serde_json::to_value(self.scroll_size()).map_err(|e| RpcError::Handler(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::frame::HeadlessFrame;
    use crate::toast::ToastQueue;
    use serde_json::json;
    use std::cell::RefCell;

    /// API client that records every configuration it receives
    #[derive(Default)]
    pub(crate) struct RecordingClient {
        pub configured: RefCell<Vec<GuestClientSettings>>,
    }

    impl RecordingClient {
        pub fn tokens(&self) -> Vec<String> {
            self.configured
                .borrow()
                .iter()
                .map(|s| s.guest_token.clone())
                .collect()
        }

        /// Simulate the server rejecting a request
        pub fn fail_unauthorized(&self) {
            let current = self.configured.borrow().last().cloned();
            if let Some(settings) = current {
                settings.notify_unauthorized();
            }
        }
    }

    impl ApiClient for RecordingClient {
        fn configure(&self, settings: GuestClientSettings) {
            self.configured.borrow_mut().push(settings);
        }
    }

    fn session(
        frame: HeadlessFrame,
    ) -> (GuestSession<HeadlessFrame, Rc<RecordingClient>>, Rc<RecordingClient>, Rc<ToastQueue>) {
        let client = Rc::new(RecordingClient::default());
        let toasts = Rc::new(ToastQueue::new());
        let notice = Rc::new(UnauthorizedNotice::new(toasts.clone()));
        let session = GuestSession::new(
            frame,
            Rc::clone(&client),
            notice,
            FailureBoundary::new(3),
            "X-GuestToken",
        );
        (session, client, toasts)
    }

    #[test]
    fn test_activate_twice_bootstraps_once() {
        let (mut session, client, _) = session(HeadlessFrame::embedded("https://bi.example/embedded/a/"));

        session.activate("token-1");
        session.activate("token-2");

        assert!(session.is_started());
        assert_eq!(session.frame().mount_count(), 1);
        assert_eq!(client.tokens(), vec!["token-1", "token-2"]);
        assert_eq!(session.token_updates(), 2);
        assert_eq!(session.frame().user().unwrap().username, "guest_user");
    }

    #[test]
    fn test_header_name_forwarded() {
        let (mut session, client, _) = session(HeadlessFrame::embedded("https://bi.example/"));
        session.activate("t");
        assert_eq!(client.configured.borrow()[0].guest_token_header_name, "X-GuestToken");
        assert!(client.configured.borrow()[0].unauthorized_handler.is_some());
    }

    #[test]
    fn test_repeated_unauthorized_single_toast() {
        let (mut session, client, toasts) = session(HeadlessFrame::embedded("https://bi.example/"));
        session.activate("expired");

        client.fail_unauthorized();
        client.fail_unauthorized();

        assert_eq!(toasts.len(), 1);
        assert!(session.notice().was_shown());

        // Token rotation does not re-arm the notice
        session.activate("fresh");
        client.fail_unauthorized();
        assert_eq!(toasts.len(), 1);
    }

    #[test]
    fn test_mount_failure_triggers_reload() {
        let mut frame = HeadlessFrame::embedded("https://bi.example/embedded/a/");
        frame.fail_next_mount(RenderError::Load {
            resource: "DashboardPage".to_string(),
            reason: "network".to_string(),
        });
        let (mut session, _, _) = session(frame);

        session.activate("t");
        assert!(session.is_started());
        assert!(session.boundary().has_failed());
        assert_eq!(
            session.frame().navigations(),
            ["https://bi.example/embedded/a/?attempt=2".to_string()]
        );
    }

    #[test]
    fn test_late_render_failure() {
        let (mut session, _, _) = session(HeadlessFrame::embedded("https://bi.example/?attempt=2"));
        session.activate("t");

        let decision = session.report_render_failure(RenderError::Render("chart crashed".to_string()));
        assert!(matches!(decision, Some(RetryDecision::Reload { attempt: 3, .. })));
    }

    #[test]
    fn test_guest_token_rpc_validates_args() {
        let (mut session, client, _) = session(HeadlessFrame::embedded("https://bi.example/"));

        let err = session.guest_token_rpc(json!({"token": "x"})).unwrap_err();
        assert!(matches!(err, RpcError::InvalidArgs { method: RpcMethod::GuestToken, .. }));
        assert!(client.tokens().is_empty());
        assert!(!session.is_started());

        assert_eq!(session.guest_token_rpc(json!({"guestToken": "x"})).unwrap(), Value::Null);
        assert!(session.is_started());
    }

    #[test]
    fn test_scroll_size_rpc_reads_current_size() {
        let frame = HeadlessFrame::embedded("https://bi.example/").with_scroll_size(ScrollSize::new(800, 600));
        let (mut session, _, _) = session(frame);

        assert_eq!(session.scroll_size_rpc(Value::Null).unwrap(), json!({"width": 800, "height": 600}));

        session.frame_mut().set_scroll_size(ScrollSize::new(800, 1400));
        assert_eq!(session.scroll_size_rpc(Value::Null).unwrap(), json!({"width": 800, "height": 1400}));
    }
}
