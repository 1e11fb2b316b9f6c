use super::principal::Identity;

/// Role that passes every permission check.
pub const SUPER_ADMIN: &str = "SuperAdmin";

/// Permission strings the console gates views on.
pub mod permissions {
    pub const DASHBOARD_VIEW: &str = "Permissions.Dashboard.View";
    pub const USERS_VIEW: &str = "Permissions.Users.View";
    pub const USERS_EDIT: &str = "Permissions.Users.Edit";
    pub const USERS_DELETE: &str = "Permissions.Users.Delete";
    pub const ROLES_VIEW: &str = "Permissions.Roles.View";
    pub const ROLES_CREATE: &str = "Permissions.Roles.Create";
    pub const ROLES_EDIT: &str = "Permissions.Roles.Edit";
    pub const ROLES_DELETE: &str = "Permissions.Roles.Delete";
    pub const POSTS_VIEW: &str = "Permissions.Posts.View";
    pub const POSTS_DELETE: &str = "Permissions.Posts.Delete";
    pub const RSS_VIEW: &str = "Permissions.Rss.View";
}

/// False without an identity; otherwise true when the role claim equals or contains `name`.
pub fn has_role(identity: Option<&Identity>, name: &str) -> bool {
    match identity {
        Some(id) => id.role.contains(name),
        None => false,
    }
}

/// False without an identity; SuperAdmin passes unconditionally; otherwise set membership.
pub fn has_permission(identity: Option<&Identity>, name: &str) -> bool {
    let Some(id) = identity else { return false; };
    if has_role(Some(id), SUPER_ADMIN) {
        return true;
    }
    id.permissions.contains(name)
}
