//! Dashboard Pages
//!
//! Resolve the routed dashboard with the guest client and render its shell.
//! Load errors surface to the retry boundary. A rejected guest token leaves a
//! degraded shell under the session notice instead.

use leptos::*;
use leptos_router::*;

use superset_embedded::client::{DashboardInfo, FetchError};
use superset_embedded::embedded::RenderError;

use crate::components::Loading;
use crate::state::global::use_global_state;

/// `/embedded/:uuid`
#[component]
pub fn EmbeddedDashboardPage() -> impl IntoView {
    let state = use_global_state();
    let params = use_params_map();
    let uuid = move || params.with(|p| p.get("uuid").cloned().unwrap_or_default());

    let client = state.client.clone();
    let dashboard = create_local_resource(uuid, move |uuid| {
        let client = client.clone();
        async move {
            let embedded = client.embedded_dashboard(&uuid).await?;
            client.dashboard(&embedded.dashboard_id).await
        }
    });

    view! { <DashboardShell dashboard=dashboard /> }
}

/// `/dashboard/:id_or_slug/embedded`
#[component]
pub fn LegacyDashboardPage() -> impl IntoView {
    let state = use_global_state();
    let params = use_params_map();
    let id_or_slug = move || params.with(|p| p.get("id_or_slug").cloned().unwrap_or_default());

    let client = state.client.clone();
    let dashboard = create_local_resource(id_or_slug, move |id_or_slug| {
        let client = client.clone();
        async move { client.dashboard(&id_or_slug).await }
    });

    view! { <DashboardShell dashboard=dashboard /> }
}

/// What the shell shows for a fetch result; `Ok(None)` is the degraded view
fn shell_content(result: Result<DashboardInfo, FetchError>) -> Result<Option<DashboardInfo>, RenderError> {
    match result {
        Ok(info) => Ok(Some(info)),
        Err(error) => match error.into_render_error() {
            Some(render) => Err(render),
            None => Ok(None),
        },
    }
}

#[component]
fn DashboardShell(dashboard: Resource<String, Result<DashboardInfo, FetchError>>) -> impl IntoView {
    let state = use_global_state();

    view! {
        <Suspense fallback=move || view! { <Loading /> }>
            {move || {
                dashboard.get().map(|result| {
                    shell_content(result).map(|content| match content {
                        Some(info) => {
                            let viewer = state
                                .user
                                .with(|user| user.as_ref().map(|u| format!("{} {}", u.first_name, u.last_name)));
                            view! {
                                <header class="dashboard-header">
                                    <h1 class="dashboard-header__title">{info.dashboard_title}</h1>
                                    {viewer.map(|name| view! { <span class="dashboard-header__viewer">{name}</span> })}
                                </header>
                                <div class="dashboard-grid" data-dashboard-id=info.id />
                            }
                            .into_view()
                        }
                        None => view! { <div class="dashboard-grid dashboard-grid--unauthorized" /> }.into_view(),
                    })
                })
            }}
        </Suspense>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> DashboardInfo {
        DashboardInfo {
            id: 12,
            dashboard_title: "Sales".to_string(),
            slug: None,
        }
    }

    #[test]
    fn test_loaded_dashboard_renders() {
        assert_eq!(shell_content(Ok(info())), Ok(Some(info())));
    }

    #[test]
    fn test_unauthorized_stays_out_of_retry_boundary() {
        assert_eq!(shell_content(Err(FetchError::Unauthorized)), Ok(None));
    }

    #[test]
    fn test_load_failure_goes_to_retry_boundary() {
        let result = shell_content(Err(FetchError::failed("api/v1/dashboard/12", "Request failed (500)")));
        assert!(matches!(result, Err(RenderError::Load { ref resource, .. }) if resource == "api/v1/dashboard/12"));
    }
}
