//! Route Table Module Index
//!
//! The portal's page routes are declared in three security-segregated modules, one per
//! access level, and merged into a single `RouteTable` at startup. Every declaration
//! carries its own access requirement.

/// Pages anyone may open.
pub mod public;

/// Pages that require a signed-in session.
pub mod authenticated;

/// Pages restricted to the admin role; nested under the configured admin prefix.
pub mod admin;

use crate::{
    config::RoutingConfig,
    error::ShellError,
    models::{PageId, RouteRequirement, RouteSummary},
    navigation::{is_under, normalize_path},
};

/// RouteDef
///
/// One declared route. `pattern` is either an exact path or `<base>/*`, which matches
/// `<base>` and everything beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDef {
    pub pattern: String,
    pub requirement: RouteRequirement,
    pub page: PageId,
}

impl RouteDef {
    pub fn new(pattern: &str, requirement: RouteRequirement, page: PageId) -> Self {
        Self {
            pattern: pattern.to_string(),
            requirement,
            page,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self.pattern.strip_suffix("/*") {
            Some(base) => is_under(path, base),
            None => self.pattern == path,
        }
    }
}

/// RouteTable
///
/// Static route configuration, loaded once. First matching declaration wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The portal's page map.
    pub fn standard(config: &RoutingConfig) -> Self {
        Self::new()
            .merge(public::public_routes())
            .merge(authenticated::authenticated_routes())
            .nest(&config.admin_prefix, admin::admin_routes())
    }

    pub fn route(mut self, pattern: &str, requirement: RouteRequirement, page: PageId) -> Self {
        self.routes.push(RouteDef::new(pattern, requirement, page));
        self
    }

    pub fn merge(mut self, routes: Vec<RouteDef>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// Mounts `routes` under `prefix`: `/*` under `/admin` becomes `/admin/*`.
    pub fn nest(mut self, prefix: &str, routes: Vec<RouteDef>) -> Self {
        let prefix = prefix.trim_end_matches('/');
        self.routes.extend(routes.into_iter().map(|route| RouteDef {
            pattern: if route.pattern == "/" {
                prefix.to_string()
            } else {
                format!("{prefix}{}", route.pattern)
            },
            ..route
        }));
        self
    }

    /// Finds the declaration for a location. Unmatched paths are reported, not fatal;
    /// the shell renders its not-found view for them.
    pub fn resolve(&self, location: &str) -> Result<&RouteDef, ShellError> {
        let path = normalize_path(location);
        self.routes
            .iter()
            .find(|route| route.matches(&path))
            .ok_or(ShellError::UnmatchedRoute(path))
    }

    /// Rejects redirect destinations that are themselves guarded.
    pub fn check_redirect_targets(&self, config: &RoutingConfig) -> Result<(), ShellError> {
        for target in [&config.login_path, &config.unauthorized_path] {
            if let Ok(route) = self.resolve(target) {
                if route.requirement != RouteRequirement::Public {
                    return Err(ShellError::RedirectTargetNotPublic(target.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.routes
            .iter()
            .map(|route| RouteSummary {
                pattern: route.pattern.clone(),
                requirement: route.requirement,
                page: route.page,
            })
            .collect()
    }
}
