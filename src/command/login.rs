// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use constancias::{
    error::Result,
    session::{Role, User},
};

use super::Context;

/// Sign in locally, without an identity provider.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// Display name of the user.
    #[arg(long)]
    name: Option<String>,

    /// E-mail address of the user.
    #[arg(long)]
    email: Option<String>,

    /// Role of the user: Estudiante, Secretaria, Director or Administrador.
    #[arg(long)]
    role: Option<Role>,

    /// The credential to store for this session.
    #[arg(long, env = "CONSTANCIAS_TOKEN", hide_env_values = true)]
    token: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let user = User {
            name: self.name,
            email: self.email,
            role: self.role,
        };
        ctx.store.login(user, &self.token).await;
        super::status::print(&ctx.store.session().await);
        Ok(())
    }
}
