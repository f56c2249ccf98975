//! HTTP API Client
//!
//! `gloo-net` implementation of the guest API client. Every request carries
//! the guest token header; a 401 runs the unauthorized handler.

use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use std::cell::RefCell;

use superset_embedded::client::{
    dashboard_endpoint, embedded_dashboard_endpoint, ApiClient, DashboardInfo, EmbeddedDashboard,
    FetchError, GuestClientSettings, ResultEnvelope,
};

/// The API is served from the same origin as the embedded page
pub fn api_base() -> String {
    web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default()
}

#[derive(Debug, serde::Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: Option<String>,
}

/// Guest API client for the browser
pub struct GlooClient {
    base_url: String,
    settings: RefCell<Option<GuestClientSettings>>,
}

impl GlooClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            settings: RefCell::new(None),
        }
    }

    /// GET an endpoint and decode its JSON body
    ///
    /// A 401 runs the unauthorized handler and comes back as
    /// [`FetchError::Unauthorized`].
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        let endpoint = endpoint.trim_start_matches('/');
        let url = format!("{}/{}", self.base_url, endpoint);
        // No borrow may be held across the await
        let settings = self.settings.borrow().clone();

        let mut request = Request::get(&url);
        if let Some(settings) = &settings {
            request = request.header(&settings.guest_token_header_name, &settings.guest_token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::failed(endpoint, format!("Network error: {}", e)))?;

        if response.status() == 401 {
            if let Some(settings) = &settings {
                settings.notify_unauthorized();
            }
            return Err(FetchError::Unauthorized);
        }

        if !response.ok() {
            let error: ApiError = response.json().await.unwrap_or(ApiError { message: None });
            let reason = error
                .message
                .unwrap_or_else(|| format!("Request failed ({})", response.status()));
            return Err(FetchError::failed(endpoint, reason));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::failed(endpoint, format!("Parse error: {}", e)))
    }

    /// Resolve an embedded dashboard uuid
    pub async fn embedded_dashboard(&self, uuid: &str) -> Result<EmbeddedDashboard, FetchError> {
        self.get_json::<ResultEnvelope<EmbeddedDashboard>>(&embedded_dashboard_endpoint(uuid))
            .await
            .map(|envelope| envelope.result)
    }

    /// Fetch dashboard metadata by numeric id or slug
    pub async fn dashboard(&self, id_or_slug: &str) -> Result<DashboardInfo, FetchError> {
        self.get_json::<ResultEnvelope<DashboardInfo>>(&dashboard_endpoint(id_or_slug))
            .await
            .map(|envelope| envelope.result)
    }
}

impl ApiClient for GlooClient {
    fn configure(&self, settings: GuestClientSettings) {
        *self.settings.borrow_mut() = Some(settings);
    }
}
