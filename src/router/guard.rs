// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use log::debug;

use crate::session::{Session, Store};

use super::routes::{Route, LANDING, LOGIN};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    /// Navigate to the named route instead.
    Redirect(&'static str),
}

/// Decides every navigation against the session store.
///
/// This gates the UI only. Anything that matters must also be enforced by
/// the backend.
#[derive(Clone)]
pub struct Guard {
    store: Arc<Store>,
}

impl Guard {
    pub const fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Waits for the store to finish restoring before deciding, so a reload
    /// never looks logged out.
    pub async fn check(&self, to: &Route, from: Option<&Route>) -> Decision {
        self.store.ready().await;
        let decision = decide(to, &self.store.session().await);
        debug!(
            "Navigation from {} to {}: {:?}",
            from.map_or("<start>", |route| route.path.as_str()),
            to.path,
            decision
        );
        decision
    }
}

/// First matching rule wins:
///
/// 1. protected route while logged out goes to the login page;
/// 2. the login page while logged in goes to the landing page;
/// 3. a known role outside the route's role list goes to the landing page;
/// 4. everything else proceeds.
///
/// A logged-in session without a recognized role is not stopped by rule 3.
pub fn decide(to: &Route, session: &Session) -> Decision {
    let logged_in = session.is_logged_in();

    if to.meta.requires_auth && !logged_in {
        return Decision::Redirect(LOGIN);
    }

    if to.name == Some(LOGIN) && logged_in {
        return Decision::Redirect(LANDING);
    }

    if let (Some(roles), Some(role)) = (&to.meta.roles, session.role()) {
        if !roles.is_empty() && !roles.contains(&role) {
            return Decision::Redirect(LANDING);
        }
    }

    Decision::Proceed
}
