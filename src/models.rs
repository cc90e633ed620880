use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Session Schemas ---

/// Role
///
/// The RBAC flag carried by a signed-in identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    /// Maps the free-form `role` column of a profile onto the two-level model.
    /// Anything that is not exactly `admin` is a member.
    pub fn from_profile_role(role: &str) -> Self {
        if role.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Member
        }
    }
}

/// Identity
///
/// What the session source knows about a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

/// AuthState
///
/// Owned by the session source and read-only to everything else. Once it has left
/// `Unknown` it only ever moves between `SignedOut` and `SignedIn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AuthState {
    Unknown,
    SignedOut,
    SignedIn(Identity),
}

impl AuthState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthState::Unknown)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Profile
///
/// Row of the `public.profiles` table, used to resolve the role behind a session token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    // 'member' or 'admin'.
    pub role: String,
}

impl Profile {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            role: Role::from_profile_role(&self.role),
        }
    }
}

// --- Routing Schemas ---

/// RouteRequirement
///
/// Static tag attached to each declared route at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RouteRequirement {
    Public,
    RequiresAuth,
    RequiresAdmin,
}

/// RedirectReason
///
/// Why the guard refused to render. Each reason maps to its own destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RedirectReason {
    /// No usable session: send to the login page.
    SignInRequired,
    /// Signed in, but the role is insufficient: send to the safe landing page.
    NotAuthorized,
}

/// GuardOutcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum GuardOutcome {
    Render,
    Pending,
    Redirect(RedirectReason),
}

/// LayoutKind
///
/// Which chrome wraps the page. Derived from the path alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LayoutKind {
    Standard,
    Admin,
}

/// PageTag
///
/// Mutually exclusive marker placed on the document-level render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PageTag {
    Home,
    Login,
    Register,
    None,
}

/// PageId
///
/// The page components the portal can mount. Their content is rendered elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PageId {
    Home,
    About,
    Services,
    Contact,
    Login,
    Register,
    AdminSetup,
    Dashboard,
    ESign,
    Pricing,
    Recommendations,
    AdminCheck,
    Profile,
    PaymentSuccess,
    AdminDashboard,
}

/// Content
///
/// What actually occupies the main area after gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Content {
    Page(PageId),
    /// Neutral placeholder while the session is still `Unknown`.
    Loading,
    NotFound,
    /// Nothing is mounted; a redirect has been issued.
    Redirecting,
}

/// ChromeFrame
///
/// Styling-level description of the chrome for one layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChromeFrame {
    pub layout: LayoutKind,
    pub show_nav: bool,
    pub show_footer: bool,
    /// Mirrors the scroll signal; only the navigation bar styling reads it.
    pub scrolled: bool,
    pub root_class: String,
    pub main_class: String,
}

/// ShellView
///
/// The full result of composing one navigation: chrome, guard decision and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ShellView {
    /// Normalized path (no query string, no trailing slash).
    pub path: String,
    pub layout: LayoutKind,
    pub outcome: GuardOutcome,
    pub content: Content,
    /// Location the navigation is being sent to when `outcome` is a redirect.
    pub redirect_to: Option<String>,
    pub page_tag: PageTag,
    pub chrome: ChromeFrame,
}

/// RouteSummary
///
/// Public description of one declared route (GET /shell/routes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteSummary {
    pub pattern: String,
    pub requirement: RouteRequirement,
    pub page: PageId,
}
