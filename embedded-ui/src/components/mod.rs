//! UI Components
//!
//! Reusable Leptos components for the embedded page.

pub mod loading;
pub mod retry_boundary;
pub mod toast;

pub use loading::Loading;
pub use retry_boundary::RetryBoundary;
pub use toast::Toasts;
