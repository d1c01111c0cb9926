// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_qualifications,
    unused_results,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::use_debug,
    clippy::future_not_send
)]

mod command;

use std::{process, sync::Arc};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use constancias::{
    config::Config,
    error::Result,
    metadata,
    provider::{IdentityProvider, Redirect},
    router::{Guard, Router},
    session::{Snapshot, Store},
    storage,
};
use log::{error, warn};

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Command),
    Callback(command::callback::Command),
    Logout(command::logout::Command),
    Status(command::status::Command),
    Navigate(command::navigate::Command),
}

#[async_trait]
impl command::Command for Command {
    async fn execute(self, ctx: &command::Context) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(ctx).await,
            Self::Callback(cmd) => cmd.execute(ctx).await,
            Self::Logout(cmd) => cmd.execute(ctx).await,
            Self::Status(cmd) => cmd.execute(ctx).await,
            Self::Navigate(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[command(flatten)]
    config: Config,

    /// Keep the session in memory only; nothing is read from or written to
    /// disk.
    #[arg(long)]
    no_persist_session: bool,

    #[clap(subcommand)]
    command: Command,
}

fn get_session_storage(args: &Args) -> Box<dyn storage::Storage<Snapshot>> {
    if !args.no_persist_session {
        match storage::File::new(metadata::SESSION_KEY) {
            Ok(file_storage) => return Box::new(file_storage),
            Err(e) => {
                warn!("We need to fall back to in-memory session storage: {}", e);
            }
        }
    }

    Box::new(storage::Memory::<Snapshot>::new())
}

fn get_identity_provider(config: &Config) -> Option<Box<dyn IdentityProvider>> {
    config.auth_domain.clone().map(|domain| {
        Box::new(Redirect::new(
            domain,
            config.auth_client_id.clone(),
            |url: &url::Url| {
                println!("{url}");
                Ok(())
            },
        )) as Box<dyn IdentityProvider>
    })
}

async fn run(args: Args) -> Result<()> {
    let storage = get_session_storage(&args);
    let provider = get_identity_provider(&args.config);

    let store = Arc::new(Store::new(storage, args.config));
    store.restore().await;

    let ctx = command::Context {
        router: Router::new(Guard::new(Arc::clone(&store))),
        store,
        provider,
    };

    command::Command::execute(args.command, &ctx).await
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("CONSTANCIAS_LOG", "warn")
        .write_style("CONSTANCIAS_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
