// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{fs, io, path::PathBuf};

use async_trait::async_trait;
use clap::Parser;
use constancias::{error::Result, session::Identity};
use log::warn;
use serde_json::Value;

use super::Context;

/// Complete a provider sign-in from the identity payload it returned.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// Access token issued alongside the identity, if any.
    #[arg(long, env = "CONSTANCIAS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// JSON file with the identity payload, or `-` for standard input.
    #[arg(value_hint = clap::ValueHint::FilePath)]
    identity: PathBuf,
}

impl Command {
    fn read(&self) -> Result<Value> {
        if self.identity.as_os_str() == "-" {
            Ok(serde_json::from_reader(io::stdin().lock())?)
        } else {
            Ok(serde_json::from_reader(fs::File::open(&self.identity)?)?)
        }
    }
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let payload = match self.read() {
            Ok(payload) => payload,
            Err(e) => {
                ctx.store.capture_error(&e).await;
                return Err(e);
            }
        };

        let identity = Identity::from_value(payload);
        if identity.is_none() {
            warn!("The identity payload is not a JSON object; signing out");
        }

        ctx.store
            .establish_session(identity.as_ref(), self.token.as_deref())
            .await;
        super::status::print(&ctx.store.session().await);
        Ok(())
    }
}
