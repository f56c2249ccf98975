//! Global Application State
//!
//! Reactive state shared by the mounted components, created before the
//! guest session so the session can push toasts and the bootstrap user.

use leptos::*;
use std::rc::Rc;

use superset_embedded::config::EmbeddedConfig;
use superset_embedded::embedded::BootstrapUser;
use superset_embedded::toast::{ToastList, ToastRequest, ToastSink};

use crate::api::GlooClient;

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    /// Guest identity loaded on bootstrap
    pub user: RwSignal<Option<BootstrapUser>>,
    /// Visible toasts
    pub toasts: RwSignal<ToastList>,
    /// Guest-token aware API client
    pub client: Rc<GlooClient>,
    /// Verbose console logging
    pub debug: bool,
    /// Element the application is mounted into
    pub mount_element_id: String,
    /// Highest attempt that still reloads after a render failure
    pub retry_ceiling: u32,
}

impl GlobalState {
    pub fn new(client: Rc<GlooClient>, config: &EmbeddedConfig) -> Self {
        Self {
            user: create_rw_signal(None),
            toasts: create_rw_signal(ToastList::new()),
            client,
            debug: config.debug,
            mount_element_id: config.mount_element_id.clone(),
            retry_ceiling: config.retry_ceiling,
        }
    }

    /// Close a toast
    pub fn dismiss_toast(&self, id: u64) {
        self.toasts.update(|toasts| {
            toasts.dismiss(id);
        });
    }
}

impl ToastSink for GlobalState {
    fn add_toast(&self, request: ToastRequest) -> Option<u64> {
        let duration = request.duration_ms;
        let id = self.toasts.try_update(|toasts| toasts.push(request)).flatten()?;

        // Sticky toasts stay until dismissed
        if let Some(ms) = duration {
            let toasts = self.toasts;
            gloo_timers::callback::Timeout::new(ms, move || {
                toasts.update(|toasts| {
                    toasts.dismiss(id);
                });
            })
            .forget();
        }

        Some(id)
    }
}

/// Get the global state from context
pub fn use_global_state() -> GlobalState {
    use_context::<GlobalState>().expect("GlobalState not found")
}
