//! Admin dashboard analytics, computed client-side from the first page of users.

use serde::{Deserialize, Serialize};
use tracing::error;

use super::users::{list_users, UserSummary};
use crate::client::ApiClient;
use crate::identity::SUPER_ADMIN;

pub const ANALYTICS_PAGE_SIZE: u32 = 100;
pub const RECENT_USERS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_admins: u64,
    pub total_organizations: u64,
    pub total_regular_users: u64,
    pub verified_accounts: u64,
    pub pending_accounts: u64,
    pub locked_accounts: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardAnalytics {
    pub stats: DashboardStats,
    pub recent_users: Vec<UserSummary>,
}

/// Stats over `users`; `total_count` from paging metadata wins when non-zero.
pub fn compute_stats(users: &[UserSummary], total_count: u64) -> DashboardStats {
    let count = |pred: &dyn Fn(&UserSummary) -> bool| users.iter().filter(|u| pred(u)).count() as u64;
    DashboardStats {
        total_users: if total_count > 0 { total_count } else { users.len() as u64 },
        total_admins: count(&|u: &UserSummary| u.has_role(SUPER_ADMIN)),
        total_organizations: count(&|u: &UserSummary| u.has_role("Organization")),
        total_regular_users: count(&|u: &UserSummary| u.primary_role().map(|r| r == "User").unwrap_or(true)),
        verified_accounts: count(&|u: &UserSummary| u.email_confirmed),
        pending_accounts: count(&|u: &UserSummary| !u.email_confirmed),
        locked_accounts: count(&|u: &UserSummary| u.lockout_end.is_some()),
    }
}

/// Never fails: a backend error is logged and yields zeroed stats so the
/// dashboard still renders.
pub async fn dashboard_analytics(client: &ApiClient) -> DashboardAnalytics {
    match list_users(client, 1, ANALYTICS_PAGE_SIZE, None).await {
        Ok(page) => {
            let stats = compute_stats(&page.items, page.total_count);
            let recent_users = page.items.into_iter().take(RECENT_USERS).collect();
            DashboardAnalytics { stats, recent_users }
        }
        Err(e) => {
            error!(target: "nyc360::admin", "dashboard analytics unavailable: {}", e);
            DashboardAnalytics::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, role: Option<&str>, confirmed: bool, locked: bool) -> UserSummary {
        UserSummary {
            id,
            email: format!("u{}@b.com", id),
            role: role.map(str::to_string),
            email_confirmed: confirmed,
            lockout_end: locked.then(|| "2030-01-01T00:00:00Z".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn stats_over_sample() {
        let users = vec![
            user(1, Some("SuperAdmin"), true, false),
            user(2, Some("Organization"), true, false),
            user(3, Some("User"), false, true),
            user(4, None, false, false),
        ];
        let s = compute_stats(&users, 40);
        assert_eq!(s.total_users, 40);
        assert_eq!(s.total_admins, 1);
        assert_eq!(s.total_organizations, 1);
        assert_eq!(s.total_regular_users, 2);
        assert_eq!(s.verified_accounts, 2);
        assert_eq!(s.pending_accounts, 2);
        assert_eq!(s.locked_accounts, 1);
    }

    #[test]
    fn total_falls_back_to_sample_size() {
        let users = vec![user(1, Some("User"), true, false)];
        assert_eq!(compute_stats(&users, 0).total_users, 1);
        assert_eq!(compute_stats(&[], 0), DashboardStats::default());
    }

    #[test]
    fn roles_list_shape_counts_too() {
        let mut u = user(9, None, true, false);
        u.roles = vec!["SuperAdmin".into()];
        let s = compute_stats(&[u], 0);
        assert_eq!(s.total_admins, 1);
        assert_eq!(s.total_regular_users, 0);
    }
}
