//! Route table.
//!
//! # Responsibilities
//! - Store the application's routes
//! - Resolve a location to a route, and a route name to its path
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - Exact path match after stripping query, fragment and trailing slash
//! - Unknown paths resolve to no route rather than a silent default

use std::collections::HashMap;

use crate::config::RoutingConfig;
use crate::routing::NavigationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub path: String,
    pub requires_auth: bool,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_path: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    sign_in: usize,
    landing: usize,
}

impl RouteTable {
    pub fn from_config(config: &RoutingConfig) -> Result<Self, NavigationError> {
        let routes: Vec<Route> = config
            .routes
            .iter()
            .map(|r| Route {
                name: r.name.clone(),
                path: normalize(&r.path).to_string(),
                requires_auth: r.requires_auth,
            })
            .collect();

        let by_path = routes.iter().enumerate().map(|(i, r)| (r.path.clone(), i)).collect();
        let by_name: HashMap<String, usize> =
            routes.iter().enumerate().map(|(i, r)| (r.name.clone(), i)).collect();

        let lookup = |name: &str| {
            by_name
                .get(name)
                .copied()
                .ok_or_else(|| NavigationError::UnknownRoute(name.to_string()))
        };
        let sign_in = lookup(&config.sign_in_route)?;
        let landing = lookup(&config.landing_route)?;

        Ok(Self {
            routes,
            by_path,
            by_name,
            sign_in,
            landing,
        })
    }

    /// The route registered for `location`, ignoring query and fragment.
    pub fn match_path(&self, location: &str) -> Option<&Route> {
        self.by_path.get(normalize(location)).map(|&i| &self.routes[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    pub fn sign_in(&self) -> &Route {
        &self.routes[self.sign_in]
    }

    pub fn landing(&self) -> &Route {
        &self.routes[self.landing]
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

fn normalize(location: &str) -> &str {
    let end = location.find(&['?', '#'][..]).unwrap_or(location.len());
    let path = &location[..end];
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
