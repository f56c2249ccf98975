//! Browser Frame
//!
//! [`Frame`] over the real window and document.

use leptos::*;
use wasm_bindgen::{JsCast, JsValue};

use superset_embedded::embedded::{BootstrapData, BootstrapUser, RenderError};
use superset_embedded::frame::Frame;
use superset_embedded::protocol::ScrollSize;

use crate::app::App;
use crate::state::global::GlobalState;

/// Attribute of the mount element carrying the server's bootstrap JSON
const BOOTSTRAP_ATTRIBUTE: &str = "data-bootstrap";

/// Read the bootstrap payload rendered on the mount element
pub fn read_bootstrap(mount_element_id: &str) -> Result<BootstrapData, String> {
    let raw = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(mount_element_id))
        .and_then(|element| element.get_attribute(BOOTSTRAP_ATTRIBUTE));

    match raw {
        Some(raw) => BootstrapData::from_json(&raw).map_err(|e| e.to_string()),
        None => Ok(BootstrapData::default()),
    }
}

/// The window the embedded page runs in
pub struct BrowserFrame {
    mount_element_id: String,
    state: GlobalState,
}

impl BrowserFrame {
    pub fn new(mount_element_id: &str, state: GlobalState) -> Self {
        Self {
            mount_element_id: mount_element_id.to_string(),
            state,
        }
    }

    fn mount_element(&self) -> Option<web_sys::HtmlElement> {
        web_sys::window()?
            .document()?
            .get_element_by_id(&self.mount_element_id)?
            .dyn_into::<web_sys::HtmlElement>()
            .ok()
    }
}

impl Frame for BrowserFrame {
    fn is_embedded(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        match window.parent() {
            Ok(Some(parent)) => {
                let parent: JsValue = parent.into();
                !js_sys::Object::is(&parent, window.as_ref())
            }
            _ => false,
        }
    }

    fn show_failure_message(&mut self, message: &str) {
        if let Some(element) = self.mount_element() {
            element.set_text_content(Some(message));
        }
    }

    fn scroll_size(&self) -> ScrollSize {
        web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.body())
            .map(|body| ScrollSize::new(body.scroll_width().max(0) as u32, body.scroll_height().max(0) as u32))
            .unwrap_or_default()
    }

    fn location_href(&self) -> String {
        web_sys::window()
            .and_then(|window| window.location().href().ok())
            .unwrap_or_default()
    }

    fn replace_location(&mut self, url: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().replace(url) {
                web_sys::console::error_1(&format!("Failed to reload embed: {:?}", e).into());
            }
        }
    }

    fn load_user(&mut self, user: &BootstrapUser) {
        self.state.user.set(Some(user.clone()));
    }

    fn mount_application(&mut self) -> Result<(), RenderError> {
        let element = self
            .mount_element()
            .ok_or_else(|| RenderError::MountPointMissing(self.mount_element_id.clone()))?;

        element.set_inner_html("");
        let state = self.state.clone();
        mount_to(element, move || view! { <App state=state /> });
        Ok(())
    }
}
