//! Bootstrap Data
//!
//! JSON the server renders into the embedded page alongside the mount
//! element, plus the routes the embedded application answers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-rendered page payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BootstrapData {
    #[serde(default)]
    pub embedded: Option<EmbeddedBootstrap>,
    #[serde(default)]
    pub config: BootstrapConfig,
}

/// Embedded section of the payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbeddedBootstrap {
    pub dashboard_id: DashboardRef,
}

/// Application config exposed to the frontend
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BootstrapConfig {
    #[serde(rename = "GUEST_TOKEN_HEADER_NAME", default)]
    pub guest_token_header_name: Option<String>,
}

/// A dashboard referenced by numeric id or slug/uuid string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DashboardRef {
    Id(u64),
    Key(String),
}

impl fmt::Display for DashboardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardRef::Id(id) => write!(f, "{id}"),
            DashboardRef::Key(key) => f.write_str(key),
        }
    }
}

impl BootstrapData {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Header name for the guest token, falling back to `default`
    pub fn guest_token_header_name<'a>(&'a self, default: &'a str) -> &'a str {
        self.config
            .guest_token_header_name
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(default)
    }

    pub fn dashboard(&self) -> Option<&DashboardRef> {
        self.embedded.as_ref().map(|e| &e.dashboard_id)
    }
}

/// Paths served by the embedded application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedRoute {
    /// `/embedded/<uuid>/`
    Embedded { uuid: String },
    /// `/dashboard/<idOrSlug>/embedded/`
    LegacyDashboard { id_or_slug: String },
}

impl EmbeddedRoute {
    /// Match a location path
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            ["embedded", uuid] => Some(EmbeddedRoute::Embedded {
                uuid: uuid.to_string(),
            }),
            ["dashboard", id_or_slug, "embedded"] => Some(EmbeddedRoute::LegacyDashboard {
                id_or_slug: id_or_slug.to_string(),
            }),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            EmbeddedRoute::Embedded { uuid } => format!("/embedded/{uuid}/"),
            EmbeddedRoute::LegacyDashboard { id_or_slug } => {
                format!("/dashboard/{id_or_slug}/embedded/")
            }
        }
    }
}
