// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use constancias::{
    error::Result,
    session::{Role, Session},
};
use tabled::{settings::Style, Table, Tabled};

use super::Context;

/// Show the current session and the navigation it unlocks.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[derive(Tabled)]
struct Row<'session> {
    #[tabled(rename = "Name", display_with = "display_str")]
    name: Option<&'session str>,
    #[tabled(rename = "E-mail", display_with = "display_str")]
    email: Option<&'session str>,
    #[tabled(rename = "Role", display_with = "display_role")]
    role: Option<Role>,
    #[tabled(rename = "Logged In")]
    logged_in: bool,
}

fn display_str(value: &Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}

fn display_role(role: &Option<Role>) -> String {
    role.map_or_else(|| "-".to_owned(), |role| role.to_string())
}

pub(super) fn print(session: &Session) {
    let row = Row {
        name: session.user().and_then(|user| user.name.as_deref()),
        email: session.user().and_then(|user| user.email.as_deref()),
        role: session.role(),
        logged_in: session.is_logged_in(),
    };
    println!("{}", Table::new([row]).with(Style::rounded()));

    if let Some(message) = session.error_message() {
        eprintln!("Error: {message}");
    }
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let session = ctx.store.session().await;
        print(&session);

        let links = session.sidebar_links();
        if !links.is_empty() {
            println!("{}", Table::new(links).with(Style::rounded()));
        }
        println!(
            "Storage: {}",
            if ctx.store.is_persistent().await {
                "persistent"
            } else {
                "in memory (lost on exit)"
            }
        );
        println!("API: {}", ctx.store.config().api_base_url());
        Ok(())
    }
}
