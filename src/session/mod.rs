// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Who is signed in, with what role, and under which credential.

mod identity;
mod links;
mod store;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use identity::Identity;
pub use links::{sidebar_links, SidebarLink};
pub use store::{Store, GENERIC_ERROR_MESSAGE};

/// Permission level of a user. Wire names are the ones used by the identity
/// provider and the persisted snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Role {
    Student,
    Secretary,
    Director,
    Administrator,
}

impl Role {
    pub const ALL: [Self; 4] = [
        Self::Student,
        Self::Secretary,
        Self::Director,
        Self::Administrator,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "Estudiante",
            Self::Secretary => "Secretaria",
            Self::Director => "Director",
            Self::Administrator => "Administrador",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownRole;

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown role")
    }
}

impl std::error::Error for UnknownRole {}

impl From<Role> for &'static str {
    fn from(role: Role) -> Self {
        role.as_str()
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or(UnknownRole)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
}

/// Roles this build does not know about read back as no role.
fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Role>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|role| role.parse().ok()))
}

/// The persisted form of a session.
///
/// `is_logged_in` is written for readers of the stored document; it is not
/// trusted on restore, where the token alone decides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub is_logged_in: bool,
}

impl Snapshot {
    fn new(user: User, token: String) -> Self {
        Self {
            user: Some(user),
            is_logged_in: !token.is_empty(),
            token: Some(token),
        }
    }
}

/// In-memory session state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
    initialized: bool,
    error_message: Option<String>,
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(|user| user.role)
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().map_or(false, |token| !token.is_empty())
    }

    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn sidebar_links(&self) -> Vec<SidebarLink> {
        sidebar_links(self.role())
    }

    fn set_credentials(&mut self, user: User, token: String) {
        self.user = Some(user);
        self.token = Some(token);
    }

    fn clear_credentials(&mut self) {
        self.user = None;
        self.token = None;
    }

    /// Adopt a restored snapshot. Half-populated snapshots are dropped so user
    /// and token never diverge.
    fn adopt(&mut self, snapshot: Snapshot) -> bool {
        match snapshot {
            Snapshot {
                user: Some(user),
                token: Some(token),
                ..
            } if !token.is_empty() => {
                self.set_credentials(user, token);
                true
            }
            _ => {
                self.clear_credentials();
                false
            }
        }
    }
}
