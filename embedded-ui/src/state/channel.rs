//! Cross-Frame Channel
//!
//! Browser side of the handshake: the window `message` listener and the
//! [`MessagePort`] implementation over `web_sys::MessagePort`.

use serde_json::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::MessageEvent;

use superset_embedded::channel::{ChannelError, ChannelResult, MessagePort};
use superset_embedded::embedded::{EmbeddedPage, HandshakeOutcome, InboundMessage};

use crate::api::GlooClient;
use crate::frame::BrowserFrame;

type Page = EmbeddedPage<BrowserFrame, Rc<GlooClient>, BrowserPort>;

/// The page shared between the window listener and the port's handler
pub type PageHandle = Rc<RefCell<Page>>;

type InboundHandler = Rc<dyn Fn(Value)>;

/// Log to the console when debugging is on
pub fn console_log(debug: bool, message: &str) {
    if debug {
        web_sys::console::log_1(&message.into());
    }
}

/// Convert a structured-clone payload into JSON
///
/// Anything JSON cannot represent (functions, `undefined`) becomes `null`.
pub fn js_to_value(data: &JsValue) -> Value {
    js_sys::JSON::stringify(data)
        .ok()
        .and_then(|s| s.as_string())
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(Value::Null)
}

/// Convert JSON into a value that can be posted
pub fn value_to_js(value: &Value) -> Result<JsValue, ChannelError> {
    let text = serde_json::to_string(value).map_err(|e| ChannelError::Malformed(e.to_string()))?;
    js_sys::JSON::parse(&text).map_err(|e| ChannelError::Malformed(format!("{:?}", e)))
}

/// A transferred `MessagePort`
pub struct BrowserPort {
    port: web_sys::MessagePort,
    on_inbound: InboundHandler,
    on_message: RefCell<Option<Closure<dyn FnMut(MessageEvent)>>>,
}

impl BrowserPort {
    fn new(port: web_sys::MessagePort, on_inbound: InboundHandler) -> Self {
        Self {
            port,
            on_inbound,
            on_message: RefCell::new(None),
        }
    }
}

impl MessagePort for BrowserPort {
    fn post_message(&self, message: Value) -> ChannelResult<()> {
        let data = value_to_js(&message)?;
        self.port
            .post_message(&data)
            .map_err(|_| ChannelError::PortClosed)
    }

    fn start(&self) {
        let handler = Rc::clone(&self.on_inbound);
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            handler(js_to_value(&event.data()));
        }) as Box<dyn FnMut(MessageEvent)>);

        self.port.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        self.port.start();
        *self.on_message.borrow_mut() = Some(on_message);
    }

    fn close(&self) {
        self.port.set_onmessage(None);
        self.port.close();
        self.on_message.borrow_mut().take();
    }
}

/// Install the window message listener for the host's handshake
pub fn listen(page: PageHandle, debug: bool) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let weak = Rc::downgrade(&page);

    let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
        let Some(page) = weak.upgrade() else {
            return;
        };

        let inbound = inbound_message(&event, port_handler(Rc::downgrade(&page), debug));
        let outcome = match page.try_borrow_mut() {
            Ok(mut page) => page.on_message(inbound),
            Err(_) => {
                web_sys::console::warn_1(&"[superset] message arrived while the page was busy".into());
                return;
            }
        };

        match outcome {
            HandshakeOutcome::ChannelStarted { replaced } => {
                console_log(debug, &format!("[superset] message port received (replaced: {})", replaced));
            }
            HandshakeOutcome::ChannelFailed(e) => {
                web_sys::console::error_1(&format!("[superset] could not open channel: {}", e).into());
            }
            other => console_log(debug, &format!("[superset] message ignored: {:?}", other)),
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    window.add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())?;
    on_message.forget();
    Ok(())
}

fn inbound_message(event: &MessageEvent, handler: InboundHandler) -> InboundMessage<BrowserPort> {
    let ports = event
        .ports()
        .iter()
        .filter_map(|port| port.dyn_into::<web_sys::MessagePort>().ok())
        .map(|port| BrowserPort::new(port, Rc::clone(&handler)))
        .collect();

    InboundMessage::new(event.origin(), js_to_value(&event.data()), ports)
}

/// Route messages arriving on the channel's port back into the page
fn port_handler(page: Weak<RefCell<Page>>, debug: bool) -> InboundHandler {
    Rc::new(move |message: Value| {
        let Some(page) = page.upgrade() else {
            return;
        };
        let Ok(mut page) = page.try_borrow_mut() else {
            web_sys::console::warn_1(&"[superset] channel message arrived while the page was busy".into());
            return;
        };
        if let Some(done) = page.on_channel_message(message) {
            console_log(debug, &format!("[superset] completed {}", done.message_id()));
        }
    })
}
