use super::RouteDef;
use crate::models::{PageId, RouteRequirement::RequiresAdmin};

/// Admin Route Module
///
/// Declared relative to the admin prefix and mounted with `RouteTable::nest`, so
/// the prefix stays a single configuration value shared with the layout selector.
///
/// Access Control:
/// Every route here requires the admin role. Signed-out visitors go to login; signed-in
/// members are sent to the not-authorized destination. Either way the admin shell is
/// still selected for the path, because layout never depends on the session.
pub fn admin_routes() -> Vec<RouteDef> {
    vec![
        // The admin dashboard owns the whole area, including its own sub-navigation
        // (/admin/users, /admin/stats, ...).
        RouteDef::new("/*", RequiresAdmin, PageId::AdminDashboard),
    ]
}
