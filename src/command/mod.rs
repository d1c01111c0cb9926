// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use constancias::{error::Result, provider::IdentityProvider, router::Router, session::Store};

pub(crate) mod callback;
pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod navigate;
pub(crate) mod status;

/// Everything a command may touch. Built once at startup.
pub(crate) struct Context {
    pub(crate) store: Arc<Store>,
    pub(crate) router: Router,
    pub(crate) provider: Option<Box<dyn IdentityProvider>>,
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, ctx: &Context) -> Result<()>;
}
