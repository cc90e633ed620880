use super::RouteDef;
use crate::models::{PageId, RouteRequirement::RequiresAuth};

/// Authenticated Route Module
///
/// Client-portal pages. Any signed-in identity may open them; signed-out visitors are
/// redirected to the login page with the requested path as the return location, and
/// nothing renders while the session is still being determined.
pub fn authenticated_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("/dashboard", RequiresAuth, PageId::Dashboard),
        // E-signature flow. Only the gate is ours; the provider integration is not.
        RouteDef::new("/esign", RequiresAuth, PageId::ESign),
        RouteDef::new("/pricing", RequiresAuth, PageId::Pricing),
        RouteDef::new("/recommendations", RequiresAuth, PageId::Recommendations),
        // Role diagnostics page. Not under the admin prefix despite the name.
        RouteDef::new("/admin-check", RequiresAuth, PageId::AdminCheck),
        RouteDef::new("/profile", RequiresAuth, PageId::Profile),
        // Landing page after checkout.
        RouteDef::new("/payment-success", RequiresAuth, PageId::PaymentSuccess),
    ]
}
