// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use constancias::error::Result;

use super::Context;

/// Show where a navigation to a path would end up for the current session.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The page the navigation starts from.
    #[arg(long)]
    from: Option<String>,

    /// The path to navigate to, e.g. `/dashboard/admin`.
    #[clap()]
    path: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let from = self
            .from
            .as_deref()
            .map(|path| ctx.router.resolve(path))
            .transpose()?;
        let route = ctx.router.navigate(&self.path, from).await?;
        println!("{}", route.path);
        Ok(())
    }
}
