//! Admin model

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::models::user::{Role, User};

/// Platform-wide counters for the admin dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformStats {
    pub users: i64,
    pub banned_users: i64,
    pub products: BTreeMap<String, i64>,
    pub comments: BTreeMap<String, i64>,
    pub votes: i64,
    pub active_boosts: i64,
}

impl PlatformStats {
    /// Fill a per-status map, keeping zero entries for statuses with no rows
    pub fn status_map(known: &[&str], rows: Vec<(String, i64)>) -> BTreeMap<String, i64> {
        let mut map: BTreeMap<String, i64> = known.iter().map(|s| (s.to_string(), 0)).collect();
        for (status, count) in rows {
            *map.entry(status).or_insert(0) += count;
        }
        map
    }
}

/// Admin view of the user list; includes emails and balances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectProductRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustPointsRequest {
    pub delta: i64,
    pub reason: Option<String>,
}

/// Query string of the moderation queues
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModerationQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserListQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesQuery {
    pub months: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_map_keeps_missing_statuses() {
        let map = PlatformStats::status_map(
            &["pending", "approved", "rejected"],
            vec![("approved".to_string(), 4)],
        );

        assert_eq!(map.get("pending"), Some(&0));
        assert_eq!(map.get("approved"), Some(&4));
        assert_eq!(map.get("rejected"), Some(&0));
    }

    #[test]
    fn test_set_role_request_parses_lowercase() {
        let request: SetRoleRequest = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert_eq!(request.role, Role::Admin);
    }
}
