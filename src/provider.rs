// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The external identity provider, as far as the session store needs it.

use async_trait::async_trait;
use log::debug;
use url::Url;

use crate::error::{self, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoutOptions {
    /// Where the provider should send the user once signed out.
    pub return_to: Url,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn logout(&self, options: LogoutOptions) -> Result<()>;
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for Box<T> {
    async fn logout(&self, options: LogoutOptions) -> Result<()> {
        (**self).logout(options).await
    }
}

/// Signs out of a hosted provider by sending the user to its logout
/// endpoint. `open` receives the fully built URL.
pub struct Redirect<F> {
    domain: Url,
    client_id: Option<String>,
    open: F,
}

impl<F> Redirect<F>
where
    F: Fn(&Url) -> Result<()> + Send + Sync,
{
    pub const fn new(domain: Url, client_id: Option<String>, open: F) -> Self {
        Self {
            domain,
            client_id,
            open,
        }
    }

    pub fn logout_url(&self, options: &LogoutOptions) -> Result<Url> {
        let mut url = self
            .domain
            .join("v2/logout")
            .map_err(|e| error::Provider::LogoutUrl(self.domain.clone(), e))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(client_id) = &self.client_id {
                _ = query.append_pair("client_id", client_id);
            }
            _ = query.append_pair("returnTo", options.return_to.as_str());
        }
        Ok(url)
    }
}

#[async_trait]
impl<F> IdentityProvider for Redirect<F>
where
    F: Fn(&Url) -> Result<()> + Send + Sync,
{
    async fn logout(&self, options: LogoutOptions) -> Result<()> {
        let url = self.logout_url(&options)?;
        debug!("Redirecting to identity provider logout at {}", url);
        (self.open)(&url)
    }
}
