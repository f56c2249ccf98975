//! API Access
//!
//! Guest-token aware client for the Superset REST API.

pub mod client;

pub use client::{api_base, GlooClient};
