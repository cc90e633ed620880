use super::RouteDef;
use crate::models::{PageId, RouteRequirement::Public};

/// Public Route Module
///
/// Marketing and gateway pages reachable by anyone, signed in or not. The login page
/// must stay in this list: it is where the guard sends signed-out users.
pub fn public_routes() -> Vec<RouteDef> {
    vec![
        // Landing page; tags the body with `is-home`.
        RouteDef::new("/", Public, PageId::Home),
        RouteDef::new("/about", Public, PageId::About),
        RouteDef::new("/services", Public, PageId::Services),
        // Contact form. Submission itself is handled by the page, not here.
        RouteDef::new("/contact", Public, PageId::Contact),
        RouteDef::new("/login", Public, PageId::Login),
        RouteDef::new("/register", Public, PageId::Register),
        // First-run admin bootstrap. Lives outside the admin prefix so it keeps the
        // standard chrome and is reachable before any admin exists.
        RouteDef::new("/setup/admin", Public, PageId::AdminSetup),
    ]
}
