//! Navigation guard.
//!
//! # Transition Rules
//! ```text
//! → requires_auth route, no valid credential   ⇒ redirect to sign-in
//! → sign-in route, valid credential            ⇒ redirect to landing
//! → anything else                              ⇒ proceed
//! ```
//!
//! "Valid" is the buffered credential check, so every navigation may purge a
//! token that is about to expire.

use std::sync::Arc;

use crate::credentials::CredentialGuard;
use crate::routing::table::{Route, RouteTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Redirect(Route),
}

#[derive(Debug, Clone)]
pub struct NavigationGuard {
    table: Arc<RouteTable>,
    credentials: CredentialGuard,
}

impl NavigationGuard {
    pub fn new(table: Arc<RouteTable>, credentials: CredentialGuard) -> Self {
        Self { table, credentials }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide what happens when navigating to `location`.
    pub fn check(&self, location: &str) -> Decision {
        let authenticated = self.credentials.current_valid_token().is_some();
        let sign_in = self.table.sign_in();

        match self.table.match_path(location) {
            Some(route) if route.requires_auth && !authenticated => {
                Decision::Redirect(sign_in.clone())
            }
            Some(route) if route.name == sign_in.name && authenticated => {
                Decision::Redirect(self.table.landing().clone())
            }
            _ => Decision::Proceed,
        }
    }
}
