//! Console views and the access guard evaluated before entering one.
//!
//! Each protected route may name the permission it requires. The guard checks
//! sign-in first, then that permission; routes with no requirement only need a
//! session. Paths that match no route fall through to the public not-found view.

use tracing::{debug, warn};

use crate::identity::{permissions, SessionManager};

pub const LOGIN_PATH: &str = "/Login";
pub const HOME_PATH: &str = "/";
pub const ACCESS_DENIED_NOTICE: &str = "Access Denied: You do not have permission to view this page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    /// `/`-separated pattern; `:name` segments match any single segment.
    pub pattern: &'static str,
    pub protected: bool,
    pub required_permission: Option<&'static str>,
}

impl RouteSpec {
    pub const fn public(pattern: &'static str) -> Self {
        Self { pattern, protected: false, required_permission: None }
    }

    pub const fn signed_in(pattern: &'static str) -> Self {
        Self { pattern, protected: true, required_permission: None }
    }

    pub const fn gated(pattern: &'static str, permission: &'static str) -> Self {
        Self { pattern, protected: true, required_permission: Some(permission) }
    }

    pub fn matches(&self, path: &str) -> bool {
        let want: Vec<&str> = split_path(self.pattern);
        let got: Vec<&str> = split_path(path);
        want.len() == got.len()
            && want.iter().zip(got.iter()).all(|(w, g)| w.starts_with(':') || w.eq_ignore_ascii_case(g))
    }
}

fn split_path(p: &str) -> Vec<&str> {
    let p = p.split(['?', '#']).next().unwrap_or("");
    p.split('/').filter(|s| !s.is_empty()).collect()
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteSpec>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteSpec>) -> Self { Self { routes } }

    /// The console's views.
    pub fn console() -> Self {
        Self::new(vec![
            RouteSpec::public("/"),
            RouteSpec::public("/about"),
            RouteSpec::public("/Login"),
            RouteSpec::public("/Signup"),
            RouteSpec::public("/forgot-password"),
            RouteSpec::public("/reset-password"),
            RouteSpec::public("/verify-otp"),
            RouteSpec::public("/auth/confirm-email"),
            RouteSpec::public("/profile/:username"),
            RouteSpec::signed_in("/profile/edit"),
            RouteSpec::gated("/admin/dashboard", permissions::DASHBOARD_VIEW),
            RouteSpec::gated("/admin/User", permissions::USERS_VIEW),
            RouteSpec::gated("/admin/Role", permissions::ROLES_VIEW),
            RouteSpec::gated("/admin/roles/create", permissions::ROLES_CREATE),
            RouteSpec::gated("/admin/roles/edit/:id", permissions::ROLES_EDIT),
            RouteSpec::gated("/admin/posts", permissions::POSTS_VIEW),
            RouteSpec::gated("/admin/posts/:id", permissions::POSTS_VIEW),
            RouteSpec::gated("/admin/rss", permissions::RSS_VIEW),
        ])
    }

    /// First route matching `path`. `/profile/edit` is listed after
    /// `/profile/:username`, so literal routes are preferred over patterns.
    pub fn resolve(&self, path: &str) -> Option<&RouteSpec> {
        self.routes
            .iter()
            .find(|r| !r.pattern.contains(':') && r.matches(path))
            .or_else(|| self.routes.iter().find(|r| r.matches(path)))
    }

    pub fn routes(&self) -> &[RouteSpec] { &self.routes }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Not signed in; send the user to the login view.
    RedirectToLogin,
    /// Signed in but lacking the route's permission; show `notice` and go home.
    Deny { notice: String },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool { matches!(self, GuardDecision::Allow) }

    /// Where navigation ends up after this decision, given the requested path.
    pub fn destination<'a>(&self, requested: &'a str) -> &'a str {
        match self {
            GuardDecision::Allow => requested,
            GuardDecision::RedirectToLogin => LOGIN_PATH,
            GuardDecision::Deny { .. } => HOME_PATH,
        }
    }
}

pub struct RouteGuard<'a> {
    session: &'a SessionManager,
    table: &'a RouteTable,
}

impl<'a> RouteGuard<'a> {
    pub fn new(session: &'a SessionManager, table: &'a RouteTable) -> Self { Self { session, table } }

    pub fn check(&self, path: &str) -> GuardDecision {
        let Some(route) = self.table.resolve(path) else {
            debug!(target: "nyc360::guard", "no route for {}; public not-found view", path);
            return GuardDecision::Allow;
        };
        if !route.protected {
            return GuardDecision::Allow;
        }
        check_route(self.session, route, path)
    }
}

/// Guard decision for a protected route.
pub fn check_route(session: &SessionManager, route: &RouteSpec, path: &str) -> GuardDecision {
    if !session.is_logged_in() {
        warn!(target: "nyc360::guard", "access denied to {}: not logged in", path);
        return GuardDecision::RedirectToLogin;
    }
    if let Some(required) = route.required_permission {
        if !session.has_permission(required) {
            warn!(target: "nyc360::guard", "access denied to {}: missing {}", path, required);
            return GuardDecision::Deny { notice: ACCESS_DENIED_NOTICE.to_string() };
        }
    }
    GuardDecision::Allow
}
