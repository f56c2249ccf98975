//! State Management
//!
//! Global application state and the cross-frame channel wiring.

pub mod channel;
pub mod global;

use superset_embedded::config::EmbeddedConfig;

/// Embedded page settings for this build
///
/// Channel debug logging follows the build profile; nothing on the page can
/// turn it on.
pub fn embedded_config() -> EmbeddedConfig {
    EmbeddedConfig {
        debug: cfg!(debug_assertions),
        ..EmbeddedConfig::default()
    }
}
