//! App Root Component
//!
//! Application tree mounted once the first guest token arrives.

use leptos::*;
use leptos_router::*;

use crate::components::{RetryBoundary, Toasts};
use crate::pages::{EmbeddedDashboardPage, LegacyDashboardPage};
use crate::state::global::GlobalState;

/// Root application component
#[component]
pub fn App(state: GlobalState) -> impl IntoView {
    // Provide global state to all components
    provide_context(state);

    view! {
        <Router>
            <div class="dashboard-embedded">
                <RetryBoundary>
                    <Routes>
                        <Route path="/embedded/:uuid" view=EmbeddedDashboardPage />
                        <Route path="/dashboard/:id_or_slug/embedded" view=LegacyDashboardPage />
                        <Route path="/*any" view=NotFound />
                    </Routes>
                </RetryBoundary>

                // Toast notifications
                <Toasts />
            </div>
        </Router>
    }
}

/// No embedded route matched
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="embedded-not-found">
            <h1>"Dashboard not found"</h1>
            <p>"This address does not point at an embedded dashboard."</p>
        </div>
    }
}
