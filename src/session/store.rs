// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{any::Any, error::Error as StdError, io};

use futures_util::lock::Mutex;
use log::{debug, error, info, warn};
use tokio::sync::watch;

use crate::{
    config::Config,
    error::{self, Error},
    provider::{IdentityProvider, LogoutOptions},
    storage::{IsPersistent, Storage},
};

use super::{Identity, Role, Session, SidebarLink, Snapshot, User};

/// Message stored when a captured value carries no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Ocurrió un error inesperado.";

struct Inner {
    session: Session,
    storage: Box<dyn Storage<Snapshot>>,
}

impl Inner {
    /// Write the current credentials through to storage. This is the only
    /// place the store touches storage after `restore`.
    async fn commit(&mut self) {
        let result = match (&self.session.user, &self.session.token) {
            (Some(user), Some(token)) if !token.is_empty() => {
                self.storage
                    .update(&Snapshot::new(user.clone(), token.clone()))
                    .await
            }
            _ => self.storage.clear().await,
        };

        if let Err(e) = result {
            warn!("We could not persist the session: {}", e);
        }
    }
}

/// Owner of the current [`Session`].
///
/// Every mutation goes through one of the operations below, each of which is
/// serialized on an internal lock and persists its outcome before returning.
/// Overlapping callers are resolved in lock order; the last one to finish
/// determines the final state.
pub struct Store {
    config: Config,
    inner: Mutex<Inner>,
    ready: watch::Sender<bool>,
}

impl Store {
    pub fn new(storage: Box<dyn Storage<Snapshot>>, config: Config) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            config,
            inner: Mutex::new(Inner {
                session: Session::default(),
                storage,
            }),
            ready,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Load the persisted snapshot, if any, and mark the store initialized.
    ///
    /// Missing or unreadable data leaves the session empty.
    pub async fn restore(&self) {
        let mut inner = self.inner.lock().await;

        match inner.storage.get().await {
            Ok(Some(snapshot)) => {
                if inner.session.adopt(snapshot) {
                    debug!("Restored persisted session");
                } else {
                    debug!("Ignoring persisted session without both user and token");
                }
            }
            Ok(None) => inner.session.clear_credentials(),
            Err(e) => {
                warn!("Discarding unreadable persisted session: {}", e);
                inner.session.clear_credentials();
            }
        }

        inner.session.initialized = true;
        drop(inner);
        _ = self.ready.send_replace(true);
    }

    /// Resolves once [`Store::restore`] has completed at least once.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        _ = rx.wait_for(|ready| *ready).await;
    }

    /// Start a session for an identity returned by the provider. `None`
    /// clears the session instead.
    pub async fn establish_session(&self, identity: Option<&Identity>, token: Option<&str>) {
        let Some(identity) = identity else {
            debug!("Provider returned no identity; clearing session");
            return self.clear_session().await;
        };

        let user = identity.to_user(self.config.role_claim());
        if user.role.is_none() {
            info!("Identity carries no recognized role");
        }
        let token = identity.resolve_token(token);

        let mut inner = self.inner.lock().await;
        inner.session.set_credentials(user, token);
        inner.session.error_message = None;
        inner.commit().await;
    }

    /// Set credentials directly, without a provider round trip.
    pub async fn login(&self, user: User, token: &str) {
        if token.is_empty() {
            warn!("Refusing to log in with an empty token");
            return self.clear_session().await;
        }

        let mut inner = self.inner.lock().await;
        inner.session.set_credentials(user, token.to_owned());
        inner.commit().await;
    }

    pub async fn clear_session(&self) {
        let mut inner = self.inner.lock().await;
        inner.session.clear_credentials();
        inner.session.error_message = None;
        inner.commit().await;
    }

    /// Sign out of the provider, if there is one, then clear the local
    /// session whatever the provider said.
    pub async fn logout(&self, provider: Option<&dyn IdentityProvider>) {
        if let Some(provider) = provider {
            let options = LogoutOptions {
                return_to: self.config.logout_return_to().clone(),
            };
            if let Err(e) = provider.logout(options).await {
                error!("Signing out of the identity provider failed: {}", e);
            }
        }

        self.clear_session().await;
    }

    /// Record the message of `err` for display.
    pub async fn capture_error(&self, err: &(dyn StdError + Send + Sync + 'static)) {
        self.record_error(Some(err.to_string())).await;
    }

    /// Record a message for an arbitrary failure value. Values that are not
    /// errors get [`GENERIC_ERROR_MESSAGE`].
    pub async fn capture_value(&self, value: &(dyn Any + Send + Sync)) {
        self.record_error(describe(value)).await;
    }

    async fn record_error(&self, message: Option<String>) {
        match &message {
            Some(m) => error!("{}", m),
            None => error!("Captured a value that is not an error"),
        }

        self.inner.lock().await.session.error_message =
            Some(message.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_owned()));
    }

    pub async fn clear_error(&self) {
        self.inner.lock().await.session.error_message = None;
    }

    pub async fn session(&self) -> Session {
        self.inner.lock().await.session.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.lock().await.session.user.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.lock().await.session.token.clone()
    }

    pub async fn error_message(&self) -> Option<String> {
        self.inner.lock().await.session.error_message.clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.lock().await.session.initialized
    }

    /// Whether the session survives a restart.
    pub async fn is_persistent(&self) -> bool {
        self.inner.lock().await.storage.is_persistent()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.lock().await.session.is_logged_in()
    }

    pub async fn role(&self) -> Option<Role> {
        self.inner.lock().await.session.role()
    }

    pub async fn sidebar_links(&self) -> Vec<SidebarLink> {
        self.inner.lock().await.session.sidebar_links()
    }
}

fn describe(value: &(dyn Any + Send + Sync)) -> Option<String> {
    fn message<E: StdError + 'static>(value: &(dyn Any + Send + Sync)) -> Option<String> {
        value.downcast_ref::<E>().map(ToString::to_string)
    }

    message::<Error>(value)
        .or_else(|| message::<error::Storage>(value))
        .or_else(|| message::<error::Provider>(value))
        .or_else(|| message::<error::Config>(value))
        .or_else(|| message::<error::Routing>(value))
        .or_else(|| message::<io::Error>(value))
        .or_else(|| message::<serde_json::Error>(value))
        .or_else(|| message::<url::ParseError>(value))
        .or_else(|| {
            value
                .downcast_ref::<Box<dyn StdError + Send + Sync>>()
                .map(ToString::to_string)
        })
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Arc};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{
        error::{self, Result},
        storage::{File, Memory},
    };

    const CLAIM: &str = "https://constancias.ufro.cl/roles";

    fn ana() -> User {
        User {
            name: Some("Ana".to_owned()),
            email: Some("ana@ufro.cl".to_owned()),
            role: Some(Role::Director),
        }
    }

    fn store_with(storage: &Memory<Snapshot>) -> Store {
        Store::new(
            Box::new(storage.clone()),
            Config::default().with_role_claim(CLAIM),
        )
    }

    async fn stored(storage: &Memory<Snapshot>) -> Option<Snapshot> {
        storage.clone().get().await.unwrap()
    }

    struct FailingProvider;

    #[async_trait]
    impl IdentityProvider for FailingProvider {
        async fn logout(&self, _: LogoutOptions) -> Result<()> {
            Err(error::Provider::Rejected("network down".to_owned()).into())
        }
    }

    #[derive(Default)]
    struct RecordingProvider {
        calls: std::sync::Mutex<Vec<LogoutOptions>>,
    }

    #[async_trait]
    impl IdentityProvider for RecordingProvider {
        async fn logout(&self, options: LogoutOptions) -> Result<()> {
            self.calls.lock().unwrap().push(options);
            Ok(())
        }
    }

    #[tokio::test]
    async fn restore_without_data() {
        let store = store_with(&Memory::new());
        assert!(!store.session().await.is_initialized());

        store.restore().await;

        let session = store.session().await;
        assert!(session.is_initialized());
        assert!(!session.is_logged_in());
        assert_eq!(session.user(), None);
    }

    #[tokio::test]
    async fn restore_corrupt_data() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("auth.json");
        fs::write(&path, r#"{"user": {"name": "#)?;
        let store = Store::new(Box::new(File::at(&path)), Config::default());

        store.restore().await;

        let session = store.session().await;
        assert!(session.is_initialized());
        assert!(!session.is_logged_in());
        assert_eq!(session.user(), None);
        assert_eq!(session.error_message(), None);
        Ok(())
    }

    #[tokio::test]
    async fn restore_reproduces_snapshot() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("auth.json");
        fs::write(
            &path,
            json!({
                "user": { "name": "Ana", "email": "ana@ufro.cl", "role": "Director" },
                "token": "eyJhbGciOi.payload.sig",
                "isLoggedIn": true,
            })
            .to_string(),
        )?;
        let store = Store::new(Box::new(File::at(&path)), Config::default());

        store.restore().await;

        let session = store.session().await;
        assert!(session.is_logged_in());
        assert_eq!(session.user(), Some(&ana()));
        assert_eq!(session.token(), Some("eyJhbGciOi.payload.sig"));
        Ok(())
    }

    #[tokio::test]
    async fn restore_twice_keeps_initialized() {
        let storage = Memory::with_value(Snapshot::new(ana(), "t".to_owned()));
        let store = store_with(&storage);

        store.restore().await;
        store.restore().await;

        let session = store.session().await;
        assert!(session.is_initialized());
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn ready_waits_for_restore() {
        let store = Arc::new(store_with(&Memory::new()));
        let waiter = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.ready().await;
                store.session().await.is_initialized()
            })
        };

        store.restore().await;

        assert!(waiter.await.unwrap());
        // Already ready; must not block.
        store.ready().await;
    }

    #[tokio::test]
    async fn establish_session_with_array_claim() {
        let storage = Memory::new();
        let store = store_with(&storage);
        let identity = Identity::from_value(json!({
            "name": "Ana",
            "email": "ana@ufro.cl",
            "sub": "auth0|42",
            CLAIM: ["Director"],
        }))
        .unwrap();

        store.establish_session(Some(&identity), None).await;

        let session = store.session().await;
        assert_eq!(session.role(), Some(Role::Director));
        assert_eq!(session.token(), Some("auth0|42"));
        assert_eq!(
            stored(&storage).await,
            Some(Snapshot {
                user: Some(ana()),
                token: Some("auth0|42".to_owned()),
                is_logged_in: true,
            })
        );
    }

    #[tokio::test]
    async fn establish_session_with_unknown_role() {
        let store = store_with(&Memory::new());
        let identity = Identity::from_value(json!({ CLAIM: "Rector" })).unwrap();

        store.establish_session(Some(&identity), Some("jwt")).await;

        let session = store.session().await;
        assert!(session.is_logged_in());
        assert_eq!(session.role(), None);
        assert_eq!(session.token(), Some("jwt"));
        assert!(session.sidebar_links().is_empty());
    }

    #[tokio::test]
    async fn establish_session_clears_previous_error() {
        let store = store_with(&Memory::new());
        store.capture_value(&"boom").await;

        store
            .establish_session(Some(&Identity::default()), None)
            .await;

        let session = store.session().await;
        assert_eq!(session.error_message(), None);
        assert_eq!(session.token(), Some("auth0-session"));
    }

    #[tokio::test]
    async fn establish_session_without_identity_clears() {
        let storage = Memory::with_value(Snapshot::new(ana(), "t".to_owned()));
        let store = store_with(&storage);
        store.restore().await;

        store.establish_session(None, Some("jwt")).await;

        assert!(!store.is_logged_in().await);
        assert_eq!(stored(&storage).await, None);
    }

    #[tokio::test]
    async fn clear_session_clears_user_and_token_together() {
        let storage = Memory::new();
        let store = store_with(&storage);
        store.login(ana(), "t").await;
        assert!(stored(&storage).await.is_some());

        store.clear_session().await;
        store.clear_session().await;

        let session = store.session().await;
        assert_eq!(session.user(), None);
        assert_eq!(session.token(), None);
        assert_eq!(stored(&storage).await, None);
    }

    #[tokio::test]
    async fn login_persists_snapshot() {
        let storage = Memory::new();
        let store = store_with(&storage);

        store.login(ana(), "local-token").await;

        assert!(store.is_logged_in().await);
        assert_eq!(
            stored(&storage).await,
            Some(Snapshot::new(ana(), "local-token".to_owned()))
        );
    }

    #[tokio::test]
    async fn login_with_empty_token_is_not_a_session() {
        let storage = Memory::new();
        let store = store_with(&storage);

        store.login(ana(), "").await;

        assert!(!store.is_logged_in().await);
        assert_eq!(store.session().await.user(), None);
        assert_eq!(stored(&storage).await, None);
    }

    #[tokio::test]
    async fn logout_survives_provider_failure() {
        let storage = Memory::new();
        let store = store_with(&storage);
        store.login(ana(), "t").await;

        store.logout(Some(&FailingProvider)).await;

        assert!(!store.is_logged_in().await);
        assert_eq!(stored(&storage).await, None);
    }

    #[tokio::test]
    async fn logout_sends_return_address() -> Result<()> {
        let store = Store::new(
            Box::new(Memory::new()),
            Config::default().with_logout_url("https://constancias.ufro.cl/")?,
        );
        store.login(ana(), "t").await;
        let provider = RecordingProvider::default();

        store.logout(Some(&provider)).await;

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].return_to.as_str(), "https://constancias.ufro.cl/");
        assert!(!store.is_logged_in().await);
        Ok(())
    }

    #[tokio::test]
    async fn logout_without_provider() {
        let store = store_with(&Memory::new());
        store.login(ana(), "t").await;

        store.logout(None).await;

        assert!(!store.is_logged_in().await);
    }

    #[tokio::test]
    async fn capture_error_messages() {
        let store = store_with(&Memory::new());

        store
            .capture_error(&io::Error::new(io::ErrorKind::Other, "disk full"))
            .await;
        assert_eq!(store.session().await.error_message(), Some("disk full"));

        store.capture_error(&Error::Command).await;
        assert_eq!(
            store.session().await.error_message(),
            Some("command execution failed")
        );

        store.capture_value(&42_u32).await;
        assert_eq!(
            store.session().await.error_message(),
            Some(GENERIC_ERROR_MESSAGE)
        );

        store.clear_error().await;
        assert_eq!(store.session().await.error_message(), None);
    }

    #[tokio::test]
    async fn capture_error_keeps_messages_of_every_error() {
        let store = store_with(&Memory::new());

        store
            .capture_error(&error::Routing::NotFound("/nowhere".to_owned()))
            .await;
        assert_eq!(
            store.error_message().await.as_deref(),
            Some(r#"no route matches the path "/nowhere""#)
        );

        store
            .capture_error(&error::Provider::Rejected("network down".to_owned()))
            .await;
        assert_eq!(
            store.error_message().await.as_deref(),
            Some("identity provider rejected the request: network down")
        );

        store.capture_error(&url::ParseError::RelativeUrlWithoutBase).await;
        assert_eq!(
            store.error_message().await.as_deref(),
            Some("relative URL without a base")
        );
    }

    #[tokio::test]
    async fn capture_value_recognizes_errors() {
        let store = store_with(&Memory::new());

        store
            .capture_value(&error::Routing::UnknownName("perfil".to_owned()))
            .await;
        assert_eq!(
            store.error_message().await.as_deref(),
            Some(r#"no route is named "perfil""#)
        );

        store.capture_value(&url::ParseError::EmptyHost).await;
        assert_eq!(store.error_message().await.as_deref(), Some("empty host"));

        store.capture_value(&"not an error").await;
        assert_eq!(
            store.error_message().await.as_deref(),
            Some(GENERIC_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn accessors_mirror_session() {
        let store = store_with(&Memory::new());
        assert!(!store.is_initialized().await);
        store.restore().await;
        assert!(store.is_initialized().await);

        store.login(ana(), "local-token").await;
        store.capture_value(&7_i32).await;

        assert_eq!(store.user().await, Some(ana()));
        assert_eq!(store.token().await.as_deref(), Some("local-token"));
        assert_eq!(
            store.error_message().await.as_deref(),
            Some(GENERIC_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn restore_keeps_session_with_unknown_role() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("auth.json");
        fs::write(
            &path,
            json!({
                "user": { "name": "Ana", "email": "ana@ufro.cl", "role": "Rector" },
                "token": "t",
                "isLoggedIn": true,
            })
            .to_string(),
        )?;
        let store = Store::new(Box::new(File::at(&path)), Config::default());

        store.restore().await;

        assert!(store.is_logged_in().await);
        assert_eq!(store.role().await, None);
        assert_eq!(
            store.user().await.and_then(|user| user.name).as_deref(),
            Some("Ana")
        );
        Ok(())
    }

    #[tokio::test]
    async fn persistence_depends_on_storage() -> Result<()> {
        assert!(!store_with(&Memory::new()).is_persistent().await);

        let dir = tempfile::tempdir()?;
        let store = Store::new(
            Box::new(File::at(dir.path().join("auth.json"))),
            Config::default(),
        );
        assert!(store.is_persistent().await);
        Ok(())
    }

    #[tokio::test]
    async fn sidebar_links_follow_role() {
        let store = store_with(&Memory::new());
        assert!(store.sidebar_links().await.is_empty());

        store
            .login(
                User {
                    role: Some(Role::Administrator),
                    ..User::default()
                },
                "t",
            )
            .await;

        let titles: Vec<_> = store
            .sidebar_links()
            .await
            .into_iter()
            .map(|link| link.title)
            .collect();
        assert_eq!(
            titles,
            ["Solicitudes", "Asignaturas", "Informes ANID", "Administración"]
        );
    }
}
