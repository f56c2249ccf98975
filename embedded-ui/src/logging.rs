//! Console Logging
//!
//! Forwards `tracing` events from the embedded core to the browser console,
//! one console call per event at the matching console level.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use wasm_bindgen::JsValue;

/// Most verbose level forwarded to the console
pub fn max_level(debug: bool) -> Level {
    if debug {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Install the console subscriber; `false` if one was already installed
pub fn init_console_tracing(debug: bool) -> bool {
    let level = max_level(debug);
    let filter = Targets::new()
        .with_target("superset_embedded", level)
        .with_target("superset_embedded_ui", level);

    // No wall clock on wasm32-unknown-unknown
    let layer = fmt::layer()
        .with_writer(ConsoleMakeWriter)
        .without_time()
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry().with(layer).with(filter).try_init().is_ok()
}

/// Hands out console writers keyed by event level
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter { level: Level::INFO }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter { level: *meta.level() }
    }
}

/// Writes each formatted event as a single console line
#[derive(Debug)]
pub struct ConsoleWriter {
    level: Level,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let line = text.trim_end();
        if line.is_empty() {
            return Ok(buf.len());
        }

        let line = JsValue::from_str(line);
        if self.level == Level::ERROR {
            web_sys::console::error_1(&line);
        } else if self.level == Level::WARN {
            web_sys::console::warn_1(&line);
        } else if self.level == Level::INFO {
            web_sys::console::info_1(&line);
        } else {
            web_sys::console::debug_1(&line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
