//! Superset REST Client
//!
//! `reqwest` based implementation of the guest API client.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use thiserror::Error;

use super::{
    dashboard_endpoint, embedded_dashboard_endpoint, ApiClient, DashboardInfo, EmbeddedDashboard,
    GuestClientSettings, ResultEnvelope,
};
use crate::config::ApiConfig;

/// HTTP client for the Superset API, decorated with guest credentials
pub struct SupersetClient {
    client: Client,
    base_url: String,
    settings: RefCell<Option<GuestClientSettings>>,
}

impl SupersetClient {
    /// Create a client for the configured API
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            settings: RefCell::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The guest token currently attached to requests
    pub fn guest_token(&self) -> Option<String> {
        self.settings
            .borrow()
            .as_ref()
            .map(|s| s.guest_token.clone())
    }

    /// GET an endpoint and decode its JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        // Clone out so no RefCell borrow is held across the await
        let settings = self.settings.borrow().clone();

        let mut request = self.client.get(&url);
        if let Some(settings) = &settings {
            request = request.header(
                settings.guest_token_header_name.as_str(),
                settings.guest_token.as_str(),
            );
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(url = %url, "Guest request unauthorized");
            if let Some(settings) = &settings {
                settings.notify_unauthorized();
            }
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Resolve an embedded dashboard uuid
    pub async fn embedded_dashboard(&self, uuid: &str) -> Result<EmbeddedDashboard, ClientError> {
        let endpoint = embedded_dashboard_endpoint(uuid);
        let envelope: ResultEnvelope<EmbeddedDashboard> = self.get_json(&endpoint).await?;
        Ok(envelope.result)
    }

    /// Fetch dashboard metadata by numeric id or slug
    pub async fn dashboard(&self, id_or_slug: &str) -> Result<DashboardInfo, ClientError> {
        let endpoint = dashboard_endpoint(id_or_slug);
        let envelope: ResultEnvelope<DashboardInfo> = self.get_json(&endpoint).await?;
        Ok(envelope.result)
    }
}

impl ApiClient for SupersetClient {
    fn configure(&self, settings: GuestClientSettings) {
        tracing::debug!(header = %settings.guest_token_header_name, "Guest client configured");
        *self.settings.borrow_mut() = Some(settings);
    }
}

/// Errors from the Superset API client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Guest token rejected by the server")]
    Unauthorized,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::HeaderMap, routing::get, Json, Router};
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    async fn spawn_api() -> String {
        async fn dashboard(Path(id): Path<String>, headers: HeaderMap) -> axum::response::Response {
            use axum::response::IntoResponse;

            match headers.get("X-GuestToken").and_then(|v| v.to_str().ok()) {
                Some("good-token") => Json(json!({
                    "result": {"id": 7, "dashboard_title": format!("Sales {id}"), "slug": "sales"}
                }))
                .into_response(),
                _ => (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({"msg": "Token expired"})),
                )
                    .into_response(),
            }
        }

        async fn embedded(Path(uuid): Path<String>) -> Json<serde_json::Value> {
            Json(json!({
                "result": {"uuid": uuid, "dashboard_id": "7", "allowed_domains": []}
            }))
        }

        let app = Router::new()
            .route("/api/v1/dashboard/:id", get(dashboard))
            .route("/api/v1/embedded_dashboard/:uuid", get(embedded))
            .route(
                "/api/v1/broken",
                get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "kaput") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> SupersetClient {
        SupersetClient::new(&ApiConfig {
            base_url,
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_guest_token_header_attached() {
        let client = client(spawn_api().await);
        client.configure(GuestClientSettings::new("good-token", "X-GuestToken"));
        assert_eq!(client.guest_token().as_deref(), Some("good-token"));

        let dashboard = client.dashboard("7").await.unwrap();
        assert_eq!(dashboard.id, 7);
        assert_eq!(dashboard.dashboard_title, "Sales 7");
        assert_eq!(dashboard.slug.as_deref(), Some("sales"));
    }

    #[tokio::test]
    async fn test_unauthorized_invokes_handler_each_time() {
        let client = client(spawn_api().await);
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        client.configure(
            GuestClientSettings::new("stale-token", "X-GuestToken")
                .with_unauthorized_handler(Rc::new(move || counter.set(counter.get() + 1))),
        );

        assert!(matches!(client.dashboard("7").await, Err(ClientError::Unauthorized)));
        assert!(matches!(client.dashboard("7").await, Err(ClientError::Unauthorized)));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_reconfigure_replaces_token() {
        let client = client(spawn_api().await);
        client.configure(GuestClientSettings::new("stale-token", "X-GuestToken"));
        assert!(client.dashboard("7").await.is_err());

        client.configure(GuestClientSettings::new("good-token", "X-GuestToken"));
        assert!(client.dashboard("7").await.is_ok());
    }

    #[tokio::test]
    async fn test_custom_header_name() {
        let client = client(spawn_api().await);
        client.configure(GuestClientSettings::new("good-token", "X-Other-Header"));
        assert!(matches!(client.dashboard("7").await, Err(ClientError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_embedded_dashboard_lookup() {
        let client = client(spawn_api().await);
        let embedded = client.embedded_dashboard("a1b2-c3").await.unwrap();
        assert_eq!(embedded.uuid, "a1b2-c3");
        assert_eq!(embedded.dashboard_id, "7");
    }

    #[tokio::test]
    async fn test_server_error() {
        let client = client(format!("{}/", spawn_api().await));
        let err = client.get_json::<serde_json::Value>("/api/v1/broken").await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "kaput");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }
}
