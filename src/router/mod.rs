// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Route table and the navigation guard in front of it.

mod guard;
mod routes;

use log::debug;

use crate::error::{self, Result};

pub use guard::{decide, Decision, Guard};
pub use routes::{
    default_routes, Route, RouteMeta, RouteRecord, ADMIN, AUTH_CALLBACK, LANDING, LOGIN, REPORTS,
    REQUESTS, SUBJECTS,
};

const MAX_REDIRECTS: usize = 8;

pub struct Router {
    routes: Vec<Route>,
    guard: Guard,
}

impl Router {
    pub fn new(guard: Guard) -> Self {
        Self::with_routes(&default_routes(), guard)
    }

    pub fn with_routes(records: &[RouteRecord], guard: Guard) -> Self {
        Self {
            routes: routes::flatten(records),
            guard,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the route for `path`, ignoring any query string, fragment or
    /// trailing slash.
    pub fn resolve(&self, path: &str) -> Result<&Route> {
        let normalized = normalize(path);
        self.routes
            .iter()
            .find(|route| route.path == normalized)
            .ok_or_else(|| error::Routing::NotFound(path.to_owned()).into())
    }

    pub fn by_name(&self, name: &str) -> Result<&Route> {
        self.routes
            .iter()
            .find(|route| route.name == Some(name))
            .ok_or_else(|| error::Routing::UnknownName(name.to_owned()).into())
    }

    /// Navigate to `path`, following static redirects and guard decisions,
    /// and return where the navigation ends up.
    pub async fn navigate(&self, path: &str, from: Option<&Route>) -> Result<&Route> {
        let mut target = self.resolve(path)?;

        for _ in 0..MAX_REDIRECTS {
            if let Some(redirect) = target.redirect {
                debug!("Route {} redirects to {}", target.path, redirect);
                target = self.resolve(redirect)?;
                continue;
            }

            match self.guard.check(target, from).await {
                Decision::Proceed => return Ok(target),
                Decision::Redirect(name) => target = self.by_name(name)?,
            }
        }

        Err(error::Routing::RedirectLoop {
            path: path.to_owned(),
            hops: MAX_REDIRECTS,
        }
        .into())
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
