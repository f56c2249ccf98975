//! Retry Boundary
//!
//! Error boundary around the routed pages. The first error caught reloads
//! the frame with a bumped `attempt` counter; past the ceiling the generic
//! fallback stays on screen.

use leptos::*;

use superset_embedded::embedded::{FailureBoundary, RenderError, FALLBACK_MESSAGE};

use crate::frame::BrowserFrame;
use crate::state::global::use_global_state;

#[component]
pub fn RetryBoundary(children: Children) -> impl IntoView {
    let state = use_global_state();

    let fallback = move |errors: RwSignal<Errors>| {
        let reason = errors.with(|errors| {
            errors
                .iter()
                .map(|(_, e)| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        });

        let mut frame = BrowserFrame::new(&state.mount_element_id, state.clone());
        let mut boundary = FailureBoundary::new(state.retry_ceiling);
        boundary.catch(&mut frame, RenderError::Render(reason));

        view! {
            <div class="embedded-error">
                <p>{FALLBACK_MESSAGE}</p>
            </div>
        }
    };

    view! {
        <ErrorBoundary fallback=fallback>
            {children()}
        </ErrorBoundary>
    }
}
