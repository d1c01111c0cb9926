// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use crate::session::Role;

pub const LOGIN: &str = "login";
pub const AUTH_CALLBACK: &str = "auth-callback";
pub const REQUESTS: &str = "dashboard-solicitudes";
pub const SUBJECTS: &str = "dashboard-asignaturas";
pub const REPORTS: &str = "dashboard-informes";
pub const ADMIN: &str = "dashboard-admin";

/// Where authenticated users land by default.
pub const LANDING: &str = REQUESTS;

/// Static authorization requirements of a route.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    /// `None` places no restriction on the role.
    pub roles: Option<Vec<Role>>,
}

impl RouteMeta {
    pub const fn public() -> Self {
        Self {
            requires_auth: false,
            roles: None,
        }
    }

    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            roles: None,
        }
    }

    pub fn restricted_to(roles: &[Role]) -> Self {
        Self {
            requires_auth: false,
            roles: Some(roles.to_vec()),
        }
    }

    /// Metadata seen by a nested route: authentication requirements
    /// accumulate, the innermost role restriction wins.
    fn nested(&self, child: &Self) -> Self {
        Self {
            requires_auth: self.requires_auth || child.requires_auth,
            roles: child.roles.clone().or_else(|| self.roles.clone()),
        }
    }
}

/// A route as declared, possibly with children mounted below its path.
#[derive(Clone, Debug)]
pub struct RouteRecord {
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub meta: RouteMeta,
    pub redirect: Option<&'static str>,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub const fn new(path: &'static str, name: &'static str, meta: RouteMeta) -> Self {
        Self {
            path,
            name: Some(name),
            meta,
            redirect: None,
            children: Vec::new(),
        }
    }

    pub fn redirect(path: &'static str, target: &'static str) -> Self {
        Self {
            path,
            name: None,
            meta: RouteMeta::default(),
            redirect: Some(target),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }
}

/// A fully resolved route with inherited metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub name: Option<&'static str>,
    pub meta: RouteMeta,
    pub redirect: Option<&'static str>,
}

pub(super) fn flatten(records: &[RouteRecord]) -> Vec<Route> {
    fn walk(records: &[RouteRecord], prefix: &str, inherited: &RouteMeta, out: &mut Vec<Route>) {
        for record in records {
            let path = join(prefix, record.path);
            let meta = inherited.nested(&record.meta);
            if record.children.is_empty() || record.name.is_some() || record.redirect.is_some() {
                out.push(Route {
                    path: path.clone(),
                    name: record.name,
                    meta: meta.clone(),
                    redirect: record.redirect,
                });
            }
            walk(&record.children, &path, &meta, out);
        }
    }

    let mut out = Vec::new();
    walk(records, "", &RouteMeta::default(), &mut out);
    out
}

fn join(prefix: &str, segment: &str) -> String {
    match (prefix, segment) {
        (prefix, "") => prefix.to_owned(),
        (_, absolute) if absolute.starts_with('/') => absolute.to_owned(),
        (prefix, relative) => format!("{}/{}", prefix.trim_end_matches('/'), relative),
    }
}

/// The application's routes.
pub fn default_routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::new("/", LOGIN, RouteMeta::public()),
        RouteRecord::new("/auth/callback", AUTH_CALLBACK, RouteMeta::public()),
        RouteRecord {
            path: "/dashboard",
            name: None,
            meta: RouteMeta::authenticated(),
            redirect: None,
            children: Vec::new(),
        }
        .with_children(vec![
            RouteRecord::redirect("", "/dashboard/solicitudes"),
            RouteRecord::new("solicitudes", REQUESTS, RouteMeta::default()),
            RouteRecord::new("asignaturas", SUBJECTS, RouteMeta::default()),
            RouteRecord::new("informes", REPORTS, RouteMeta::default()),
            RouteRecord::new(
                "admin",
                ADMIN,
                RouteMeta::restricted_to(&[Role::Administrator]),
            ),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_inherit_authentication() {
        let routes = flatten(&default_routes());
        let admin = routes
            .iter()
            .find(|route| route.name == Some(ADMIN))
            .unwrap();

        assert_eq!(admin.path, "/dashboard/admin");
        assert!(admin.meta.requires_auth);
        assert_eq!(admin.meta.roles, Some(vec![Role::Administrator]));
    }

    #[test]
    fn dashboard_root_redirects() {
        let routes = flatten(&default_routes());
        let root = routes
            .iter()
            .find(|route| route.path == "/dashboard")
            .unwrap();

        assert_eq!(root.redirect, Some("/dashboard/solicitudes"));
        assert!(root.meta.requires_auth);
    }

    #[test]
    fn nested_roles_override_parent() {
        let parent = RouteMeta::restricted_to(&[Role::Director]);
        let child = RouteMeta::restricted_to(&[Role::Student]);

        assert_eq!(parent.nested(&child).roles, Some(vec![Role::Student]));
        assert_eq!(
            parent.nested(&RouteMeta::default()).roles,
            Some(vec![Role::Director])
        );
    }
}
