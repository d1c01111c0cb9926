// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Role, User};

/// Token used when the provider gives neither a credential nor a subject.
pub(crate) const FALLBACK_TOKEN: &str = "auth0-session";

/// Identity payload as handed over by the external provider.
///
/// The payload is an arbitrary JSON object; nothing about its shape is
/// trusted beyond what the accessors check.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Map<String, Value>);

impl Identity {
    pub const fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Accepts only JSON objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(claims) => Some(Self(claims)),
            _ => None,
        }
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.string("name")
    }

    pub fn email(&self) -> Option<&str> {
        self.string("email")
    }

    pub fn subject(&self) -> Option<&str> {
        self.string("sub")
    }

    /// Role carried by `claim_key`. Array claims contribute their first
    /// entry; anything that is not a known role name yields `None`.
    pub fn role(&self, claim_key: Option<&str>) -> Option<Role> {
        let claim = self.0.get(claim_key?)?;
        let normalized = match claim {
            Value::Array(values) => values.first()?,
            other => other,
        };
        normalized.as_str()?.parse().ok()
    }

    pub(crate) fn to_user(&self, claim_key: Option<&str>) -> User {
        User {
            name: self.name().map(str::to_owned),
            email: self.email().map(str::to_owned),
            role: self.role(claim_key),
        }
    }

    /// Explicit non-empty token, then the subject, then [`FALLBACK_TOKEN`].
    pub(crate) fn resolve_token(&self, explicit: Option<&str>) -> String {
        explicit
            .filter(|token| !token.is_empty())
            .or_else(|| self.subject())
            .unwrap_or(FALLBACK_TOKEN)
            .to_owned()
    }
}
