// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session manager: authentication state, persistence and restore.
//!
//! The manager is constructed once at the application root and shared by
//! reference. State is published through a `watch` channel; every change to
//! storage and the matching state update happen together under
//! `commit_lock`, so the persisted record and the published state never
//! disagree. Network calls are made outside the lock.
//!
//! None of the public operations return errors. Failures are logged and
//! turn into `false` (login, credential updates) or leave the previous
//! state in place (refresh).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    CredentialFlags, IntegrationCredentials, PersistedSession, Session, SessionPhase,
    SessionSnapshot, Tenant, User,
};
use crate::services::api::ApiClient;
use crate::services::demo;
use crate::services::token::generate_session_token;
use crate::storage::{keys, KeyValueStore};

/// Owns the session and exposes it to the rest of the application.
pub struct SessionManager {
    storage: Arc<dyn KeyValueStore>,
    api: ApiClient,
    demo_accounts_enabled: bool,
    state: watch::Sender<SessionSnapshot>,
    /// Serializes storage writes with the state updates they belong to.
    commit_lock: Mutex<()>,
    /// Restore/login calls currently running (drives `loading`).
    in_flight: AtomicUsize,
}

impl SessionManager {
    pub fn new(config: &Config, storage: Arc<dyn KeyValueStore>, api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            storage,
            api,
            demo_accounts_enabled: config.demo_accounts_enabled,
            state,
            commit_lock: Mutex::new(()),
            in_flight: AtomicUsize::new(0),
        }
    }

    // ─── State Access ────────────────────────────────────────────────────────

    /// Receive every future state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn tenant(&self) -> Option<Tenant> {
        self.state.borrow().tenant().cloned()
    }

    pub fn credentials(&self) -> Option<CredentialFlags> {
        self.state.borrow().credentials().copied()
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// Load the persisted session, if any. Call once at startup.
    ///
    /// Missing or malformed data tears the session down completely.
    pub async fn restore(&self) {
        self.begin_loading();
        // An established session stays visible while a repeated restore runs
        self.state.send_if_modified(|s| {
            if s.phase != SessionPhase::Uninitialized {
                return false;
            }
            s.phase = SessionPhase::Restoring;
            true
        });

        {
            let _guard = self.commit_lock.lock().await;
            match self.load_persisted() {
                Ok(Some(session)) => {
                    tracing::info!(
                        user_id = %session.user.id,
                        tenant_id = %session.tenant.id,
                        "Session restored"
                    );
                    self.state
                        .send_modify(|s| s.phase = SessionPhase::Authenticated(session));
                }
                Ok(None) => {
                    tracing::debug!("No persisted session");
                    self.state
                        .send_modify(|s| s.phase = SessionPhase::Unauthenticated);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to restore session, clearing it");
                    self.teardown_locked();
                }
            }
        }

        self.end_loading();
    }

    /// Sign in. Returns whether a session was established.
    ///
    /// Demo accounts are checked first; anything else goes to the backend.
    /// A failed attempt leaves the current state and storage untouched.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.begin_loading();

        let established = match self.authenticate(email, password).await {
            Ok(Some(session)) => match self.commit_session(session).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(email, error = %e, "Failed to persist session");
                    false
                }
            },
            Ok(None) => {
                tracing::info!(email, "Login denied");
                false
            }
            Err(e) => {
                tracing::error!(email, error = %e, "Login failed");
                false
            }
        };

        self.end_loading();
        established
    }

    /// Clear the session from memory and storage. Always succeeds.
    pub async fn logout(&self) {
        let _guard = self.commit_lock.lock().await;
        self.teardown_locked();
        tracing::info!("Logged out");
    }

    // ─── Integration Credentials ─────────────────────────────────────────────

    /// Send new configuration for one integration, then re-read the flags.
    ///
    /// Returns false (with no local change) on validation or backend failure.
    pub async fn update_credentials(&self, credentials: &IntegrationCredentials) -> bool {
        let integration = credentials.integration();

        if let Err(e) = credentials.validate() {
            tracing::warn!(%integration, error = %e, "Rejected integration credentials");
            return false;
        }

        let bearer = self.stored_token();
        match self
            .api
            .update_credentials(bearer.as_deref(), credentials)
            .await
        {
            Ok(()) => {
                tracing::info!(%integration, "Integration credentials updated");
                self.refresh_credential_flags().await;
                true
            }
            Err(e) => {
                tracing::warn!(%integration, error = %e, "Failed to update integration credentials");
                false
            }
        }
    }

    /// Replace the credential flags with the backend's current set.
    ///
    /// Failures are logged and the previous flags kept. Flags fetched while
    /// no session is active, or for a session that has since been replaced,
    /// are discarded.
    pub async fn refresh_credential_flags(&self) {
        let bearer = self.stored_token();
        let flags = match self.api.get_credential_flags(bearer.as_deref()).await {
            Ok(flags) => flags,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch credential flags");
                return;
            }
        };

        let _guard = self.commit_lock.lock().await;

        let Some(mut session) = self.state.borrow().session().cloned() else {
            tracing::debug!("No active session, discarding credential flags");
            return;
        };
        if bearer.as_deref() != Some(session.token.as_str()) {
            tracing::debug!("Session changed during fetch, discarding credential flags");
            return;
        }
        session.credentials = flags;

        if let Err(e) = self.persist(&session) {
            tracing::warn!(error = %e, "Failed to persist credential flags");
            return;
        }

        tracing::info!(
            configured = flags.configured_count(),
            "Credential flags refreshed"
        );
        self.state
            .send_modify(|s| s.phase = SessionPhase::Authenticated(session));
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    /// Resolve credentials to a session: demo list first, then the backend.
    ///
    /// `Ok(None)` means the credentials were not accepted.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<Session>, AppError> {
        if self.demo_accounts_enabled {
            if let Some(account) = demo::find(email, password) {
                let token = generate_session_token("demo")?;
                tracing::info!(email, "Demo account login");
                return Ok(Some(Session {
                    user: account.user(),
                    tenant: account.tenant(),
                    credentials: CredentialFlags::ALL_ENABLED,
                    token,
                }));
            }
        }

        let bearer = self.stored_token();
        match self.api.login(bearer.as_deref(), email, password).await {
            Ok(response) => Ok(response.into_session()),
            Err(e) => {
                tracing::info!(email, error = %e, "Backend login unavailable or rejected");
                Ok(None)
            }
        }
    }

    /// Persist and publish a new session.
    async fn commit_session(&self, session: Session) -> Result<(), AppError> {
        let _guard = self.commit_lock.lock().await;
        self.persist(&session)?;

        tracing::info!(
            user_id = %session.user.id,
            tenant_id = %session.tenant.id,
            "Session established"
        );
        self.state
            .send_modify(|s| s.phase = SessionPhase::Authenticated(session));
        Ok(())
    }

    fn persist(&self, session: &Session) -> Result<(), AppError> {
        let record = PersistedSession::from(session);
        let json = serde_json::to_string(&record)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize session: {}", e)))?;
        self.storage.set(keys::SESSION, &json)
    }

    /// Remove every session key and publish the absent state.
    /// Caller must hold `commit_lock`.
    fn teardown_locked(&self) {
        let all_keys = std::iter::once(keys::SESSION).chain(keys::legacy::ALL);
        for key in all_keys {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove session key");
            }
        }
        self.state
            .send_modify(|s| s.phase = SessionPhase::Unauthenticated);
    }

    /// Read the persisted session, migrating the legacy layout if found.
    fn load_persisted(&self) -> Result<Option<Session>, AppError> {
        if let Some(raw) = self.storage.get(keys::SESSION)? {
            let record: PersistedSession = serde_json::from_str(&raw)
                .map_err(|e| AppError::CorruptSession(format!("session record: {}", e)))?;
            if record.token.is_empty() {
                return Err(AppError::CorruptSession("empty token".to_string()));
            }
            return Ok(Some(record.into()));
        }

        let Some(session) = self.load_legacy()? else {
            return Ok(None);
        };

        self.persist(&session)?;
        for key in keys::legacy::ALL {
            self.storage.remove(key)?;
        }
        tracing::info!("Migrated legacy session keys");
        Ok(Some(session))
    }

    /// Read the four-key layout. All required keys must be present together.
    fn load_legacy(&self) -> Result<Option<Session>, AppError> {
        let token = self.storage.get(keys::legacy::TOKEN)?;
        let user = self.storage.get(keys::legacy::USER)?;
        let client = self.storage.get(keys::legacy::CLIENT)?;
        let credentials = self.storage.get(keys::legacy::CREDENTIALS)?;

        match (token, user, client) {
            (None, None, None) => Ok(None),
            (Some(token), Some(user), Some(client)) if !token.is_empty() => {
                let user: User = serde_json::from_str(&user)
                    .map_err(|e| AppError::CorruptSession(format!("{}: {}", keys::legacy::USER, e)))?;
                let tenant: Tenant = serde_json::from_str(&client).map_err(|e| {
                    AppError::CorruptSession(format!("{}: {}", keys::legacy::CLIENT, e))
                })?;
                let credentials = match credentials {
                    Some(raw) => serde_json::from_str::<Option<CredentialFlags>>(&raw)
                        .map_err(|e| {
                            AppError::CorruptSession(format!(
                                "{}: {}",
                                keys::legacy::CREDENTIALS,
                                e
                            ))
                        })?
                        .unwrap_or_default(),
                    None => CredentialFlags::default(),
                };
                Ok(Some(Session {
                    user,
                    tenant,
                    credentials,
                    token,
                }))
            }
            _ => Err(AppError::CorruptSession(
                "incomplete legacy session".to_string(),
            )),
        }
    }

    /// Bearer token for backend calls, as currently persisted.
    fn stored_token(&self) -> Option<String> {
        let raw = self.storage.get(keys::SESSION).ok().flatten()?;
        serde_json::from_str::<PersistedSession>(&raw)
            .ok()
            .map(|record| record.token)
            .filter(|token| !token.is_empty())
    }

    fn begin_loading(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.sync_loading();
    }

    fn end_loading(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.sync_loading();
    }

    /// Publish `loading` from the in-flight count, under the channel's lock.
    fn sync_loading(&self) {
        self.state.send_if_modified(|s| {
            let loading = self.in_flight.load(Ordering::SeqCst) > 0;
            std::mem::replace(&mut s.loading, loading) != loading
        });
    }
}
