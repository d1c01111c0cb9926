// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use clap::Args;
use once_cell::sync::Lazy;
use url::Url;

use crate::error::{self, Result};

const DEFAULT_API_BASE_URL: &str = "http://localhost:3020";
const API_PREFIX: &str = "/api/v1";

// LINT: The literal is a valid URL; failing here is a programming error.
#[allow(clippy::expect_used)]
static DEFAULT_ORIGIN: Lazy<Url> =
    Lazy::new(|| Url::parse("http://localhost:5173").expect("default origin is a valid URL"));

/// Settings consumed by the session store, the identity provider and the
/// API client.
#[derive(Clone, Debug, Args)]
pub struct Config {
    /// Name of the identity claim that carries the user's role. When unset,
    /// every identity is treated as having no role.
    #[arg(long, env = "CONSTANCIAS_ROLE_CLAIM")]
    pub role_claim: Option<String>,

    /// Where the identity provider should send the browser after signing out.
    /// Defaults to the application origin.
    #[arg(long, env = "CONSTANCIAS_LOGOUT_URL", value_parser = Url::parse)]
    pub logout_url: Option<Url>,

    /// Origin the application is served from.
    #[arg(long, env = "CONSTANCIAS_ORIGIN", default_value = "http://localhost:5173", value_parser = Url::parse)]
    pub origin: Url,

    /// Base URL of the backend API. A trailing `/api/v1` is accepted and
    /// removed.
    #[arg(long, env = "CONSTANCIAS_API_URL")]
    pub api_url: Option<String>,

    /// Supabase URL. In production, the API is assumed to live on the same
    /// origin when no API URL is given.
    #[arg(long, env = "CONSTANCIAS_SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Whether this is a production deployment.
    #[arg(long, env = "CONSTANCIAS_PRODUCTION")]
    pub production: bool,

    /// Hosted identity provider domain, e.g. `https://tenant.auth0.com`.
    #[arg(long, env = "CONSTANCIAS_AUTH_DOMAIN", value_parser = Url::parse)]
    pub auth_domain: Option<Url>,

    /// Client identifier registered with the identity provider.
    #[arg(long, env = "CONSTANCIAS_AUTH_CLIENT_ID")]
    pub auth_client_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            role_claim: None,
            logout_url: None,
            origin: DEFAULT_ORIGIN.clone(),
            api_url: None,
            supabase_url: None,
            production: false,
            auth_domain: None,
            auth_client_id: None,
        }
    }
}

impl Config {
    pub fn with_role_claim(mut self, claim: &str) -> Self {
        self.role_claim = Some(claim.to_owned());
        self
    }

    pub fn with_logout_url(mut self, url: &str) -> Result<Self> {
        self.logout_url = Some(parse_url(url)?);
        Ok(self)
    }

    /// The role claim key, ignoring an empty value.
    pub fn role_claim(&self) -> Option<&str> {
        self.role_claim
            .as_deref()
            .filter(|claim| !claim.is_empty())
    }

    pub fn logout_return_to(&self) -> &Url {
        self.logout_url.as_ref().unwrap_or(&self.origin)
    }

    /// Server origin of the backend API, without the `/api/v1` prefix and
    /// without trailing slashes.
    pub fn api_base_url(&self) -> String {
        let mut raw = trimmed(self.api_url.as_deref()).to_owned();

        if raw.is_empty() && self.production {
            let supabase = trimmed(self.supabase_url.as_deref());
            if !supabase.is_empty() {
                raw = Url::parse(supabase)
                    .map(|url| url.origin().ascii_serialization())
                    .unwrap_or_default();
            }
        }

        if raw.is_empty() {
            raw = DEFAULT_API_BASE_URL.to_owned();
        }

        strip_api_prefix(&raw).trim_end_matches('/').to_owned()
    }
}

fn trimmed(value: Option<&str>) -> &str {
    value.map_or("", str::trim)
}

fn strip_api_prefix(raw: &str) -> &str {
    let body = raw.strip_suffix('/').unwrap_or(raw);
    let Some(start) = body.len().checked_sub(API_PREFIX.len()) else {
        return raw;
    };
    match body.get(start..) {
        Some(tail) if tail.eq_ignore_ascii_case(API_PREFIX) => &body[..start],
        _ => raw,
    }
}

pub(crate) fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| error::Config::InvalidUrl(url.to_owned(), e).into())
}
