// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{io, result};

use thiserror::Error;

pub type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("storage error: {0}")]
    Storage(#[from] Storage),
    #[error("identity provider error: {0}")]
    Provider(#[from] Provider),
    #[error("configuration error: {0}")]
    Config(#[from] Config),
    #[error("routing error: {0}")]
    Routing(#[from] Routing),
    #[error("command execution failed")]
    Command,
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

#[derive(Error, Debug)]
pub enum Storage {
    #[error("no data directory is available on this system")]
    NoDataDirectory,
}

#[derive(Error, Debug)]
pub enum Provider {
    #[error("could not build the logout URL from {0}: {1}")]
    LogoutUrl(url::Url, url::ParseError),
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum Config {
    #[error("could not parse URL {0:?}: {1}")]
    InvalidUrl(String, url::ParseError),
}

#[derive(Error, Debug)]
pub enum Routing {
    #[error(r#"no route matches the path "{}""#, .0.escape_default())]
    NotFound(String),
    #[error(r#"no route is named "{}""#, .0.escape_default())]
    UnknownName(String),
    #[error(r#"navigation to "{}" did not settle after {} redirects"#, .path.escape_default(), .hops)]
    RedirectLoop { path: String, hops: usize },
}
