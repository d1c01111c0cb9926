// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use tabled::Tabled;

use super::Role;

#[derive(Clone, Debug, PartialEq, Eq, Tabled)]
pub struct SidebarLink {
    #[tabled(rename = "Title")]
    pub title: &'static str,
    #[tabled(rename = "Icon")]
    pub icon: &'static str,
    #[tabled(rename = "Path")]
    pub to: &'static str,
}

const REQUESTS: SidebarLink = SidebarLink {
    title: "Solicitudes",
    icon: "mdi-file-document-outline",
    to: "/dashboard/solicitudes",
};

const SUBJECTS: SidebarLink = SidebarLink {
    title: "Asignaturas",
    icon: "mdi-book-open-variant",
    to: "/dashboard/asignaturas",
};

const REPORTS: SidebarLink = SidebarLink {
    title: "Informes ANID",
    icon: "mdi-chart-bar",
    to: "/dashboard/informes",
};

const ADMINISTRATION: SidebarLink = SidebarLink {
    title: "Administración",
    icon: "mdi-cog",
    to: "/dashboard/admin",
};

/// Navigation entries visible to `role`. Each role sees everything the roles
/// below it see.
pub fn sidebar_links(role: Option<Role>) -> Vec<SidebarLink> {
    let Some(role) = role else {
        return Vec::new();
    };

    let mut links = vec![REQUESTS, SUBJECTS];
    if matches!(
        role,
        Role::Secretary | Role::Director | Role::Administrator
    ) {
        links.push(REPORTS);
    }
    if role == Role::Administrator {
        links.push(ADMINISTRATION);
    }
    links
}
