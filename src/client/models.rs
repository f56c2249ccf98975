//! Response types shared by the native and browser clients

use serde::{Deserialize, Serialize};

/// Superset wraps single-object responses in `{"result": ...}`
#[derive(Debug, Deserialize)]
pub struct ResultEnvelope<T> {
    pub result: T,
}

/// Embedded configuration of a dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedDashboard {
    pub uuid: String,
    pub dashboard_id: String,
    #[serde(default)]
    pub allowed_domains: Vec<String>,
}

/// Subset of dashboard metadata the embedded page needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardInfo {
    pub id: u64,
    pub dashboard_title: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Endpoint of an embedded dashboard's configuration
pub fn embedded_dashboard_endpoint(uuid: &str) -> String {
    format!("api/v1/embedded_dashboard/{}", urlencoding::encode(uuid))
}

/// Endpoint of a dashboard's metadata
pub fn dashboard_endpoint(id_or_slug: &str) -> String {
    format!("api/v1/dashboard/{}", urlencoding::encode(id_or_slug))
}
