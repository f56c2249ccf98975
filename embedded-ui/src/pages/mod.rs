//! Pages
//!
//! Top-level page components for each embedded route.

pub mod dashboard;

pub use dashboard::{EmbeddedDashboardPage, LegacyDashboardPage};
