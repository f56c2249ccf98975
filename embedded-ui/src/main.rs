//! Superset Embedded Page
//!
//! The page a host application loads into an iframe to show a dashboard
//! with a guest token, built with Leptos (WASM).
//!
//! # Flow
//!
//! - If the page is not inside an iframe, a static message replaces the app
//! - Otherwise a window `message` listener waits for the host's port
//! - The host hands over a guest token through the port; the first one
//!   mounts the application into the `#app` element
//!
//! # Architecture
//!
//! The handshake, channel and guest session live in the `superset-embedded`
//! crate. This crate provides the browser implementations of its seams:
//! [`frame::BrowserFrame`], [`state::channel::BrowserPort`] and
//! [`api::GlooClient`].

use std::cell::RefCell;
use std::rc::Rc;

use superset_embedded::embedded::{BootstrapData, EmbeddedPage};

mod api;
mod app;
mod components;
mod frame;
mod logging;
mod pages;
mod state;

use api::GlooClient;
use frame::BrowserFrame;
use state::channel::{self, console_log};
use state::global::GlobalState;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    let config = state::embedded_config();
    logging::init_console_tracing(config.debug);
    let bootstrap = frame::read_bootstrap(&config.mount_element_id).unwrap_or_else(|e| {
        web_sys::console::warn_1(&format!("Ignoring unreadable bootstrap data: {}", e).into());
        BootstrapData::default()
    });

    let client = Rc::new(GlooClient::new(&api::api_base()));
    let state = GlobalState::new(Rc::clone(&client), &config);
    let frame = BrowserFrame::new(&config.mount_element_id, state.clone());

    let page = EmbeddedPage::boot(&config, &bootstrap, frame, client, Rc::new(state));
    if !page.is_listening() {
        return;
    }

    let page = Rc::new(RefCell::new(page));
    match channel::listen(page, config.debug) {
        Ok(()) => console_log(config.debug, "[superset] embed page is ready to receive messages"),
        Err(e) => web_sys::console::error_1(&format!("Failed to install message listener: {:?}", e).into()),
    }
}
