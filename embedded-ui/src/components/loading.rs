//! Loading Component

use leptos::*;

/// Full-page loading spinner
#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="loading-container">
            <div class="loading-spinner" />
        </div>
    }
}
