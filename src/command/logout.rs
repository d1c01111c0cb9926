// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use constancias::error::Result;

use super::Context;

/// Sign out of the identity provider, if configured, and forget the session.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &Context) -> Result<()> {
        ctx.store.logout(ctx.provider.as_deref()).await;
        Ok(())
    }
}
