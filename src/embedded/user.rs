//! Guest Bootstrap User
//!
//! The embedded page never calls the user endpoint; it synthesizes a guest
//! identity in the application's bootstrap format instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role every embedded viewer holds
pub const GUEST_ROLE: &str = "Guest";

/// Permissions granted to the guest role, as `(permission, view)` pairs
const GUEST_PERMISSIONS: &[(&str, &str)] = &[
    ("can_read", "Dashboard"),
    ("can_read", "Chart"),
    ("can_read", "Dataset"),
    ("can_read", "EmbeddedDashboard"),
    ("can_read", "DashboardFilterStateRestApi"),
    ("can_write", "DashboardFilterStateRestApi"),
    ("can_read", "DashboardPermalinkRestApi"),
    ("can_write", "DashboardPermalinkRestApi"),
    ("can_read", "ExploreFormDataRestApi"),
    ("can_read", "Annotation"),
    ("can_read", "CssTemplate"),
    ("can_dashboard", "Superset"),
    ("can_explore_json", "Superset"),
    ("can_time_range", "Api"),
    ("can_query", "Api"),
    ("can_query_form_data", "Api"),
    ("can_get", "Datasource"),
    ("can_samples", "Datasource"),
    ("can_export", "Chart"),
    ("can_list", "AsyncEventsRestApi"),
];

/// User identity in the application's bootstrap payload shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub is_active: bool,
    pub is_anonymous: bool,
    #[serde(default)]
    pub permissions: BTreeMap<String, Vec<String>>,
    /// Role name to `[permission, view]` pairs
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<(String, String)>>,
}

impl BootstrapUser {
    /// The synthesized embedded guest
    pub fn guest() -> Self {
        let permissions = GUEST_PERMISSIONS
            .iter()
            .map(|(perm, view)| (perm.to_string(), view.to_string()))
            .collect();

        Self {
            first_name: "Guest".to_string(),
            last_name: "User".to_string(),
            username: "guest_user".to_string(),
            is_active: false,
            is_anonymous: false,
            permissions: BTreeMap::new(),
            roles: BTreeMap::from([(GUEST_ROLE.to_string(), permissions)]),
        }
    }

    /// Whether any role grants `permission` on `view`
    pub fn has_permission(&self, permission: &str, view: &str) -> bool {
        self.roles
            .values()
            .flatten()
            .any(|(p, v)| p == permission && v == view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_permissions() {
        let user = BootstrapUser::guest();
        assert!(user.has_permission("can_read", "Dashboard"));
        assert!(user.has_permission("can_write", "DashboardFilterStateRestApi"));
        assert!(!user.has_permission("can_write", "Dashboard"));
        assert!(!user.has_permission("can_grant_guest_token", "SecurityRestApi"));
    }

    #[test]
    fn test_bootstrap_shape() {
        let value = serde_json::to_value(BootstrapUser::guest()).unwrap();
        assert_eq!(value["firstName"], "Guest");
        assert_eq!(value["isAnonymous"], false);
        assert_eq!(value["roles"]["Guest"][0][0], "can_read");
        assert_eq!(value["roles"]["Guest"][0][1], "Dashboard");
        assert!(value["permissions"].as_object().unwrap().is_empty());
    }
}
