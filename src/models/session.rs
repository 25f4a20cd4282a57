// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state and its persisted form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CredentialFlags, Tenant, User};

/// An authenticated session. All four parts are always present together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub tenant: Tenant,
    pub credentials: CredentialFlags,
    /// Opaque bearer token
    pub token: String,
}

/// The session as written to storage: one record, one key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    pub user: User,
    #[serde(rename = "client")]
    pub tenant: Tenant,
    /// Absent means no integration is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialFlags>,
    pub saved_at: DateTime<Utc>,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            user: session.user.clone(),
            tenant: session.tenant.clone(),
            credentials: Some(session.credentials),
            saved_at: Utc::now(),
        }
    }
}

impl From<PersistedSession> for Session {
    fn from(record: PersistedSession) -> Self {
        Self {
            user: record.user,
            tenant: record.tenant,
            credentials: record.credentials.unwrap_or_default(),
            token: record.token,
        }
    }
}

/// Lifecycle of the session held by a `SessionManager`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    Restoring,
    Authenticated(Session),
    Unauthenticated,
}

/// Point-in-time view of the session, as published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// True while restore or login is in progress
    pub loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            loading: true,
        }
    }
}

impl SessionSnapshot {
    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            SessionPhase::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        self.session().map(|s| &s.tenant)
    }

    pub fn credentials(&self) -> Option<&CredentialFlags> {
        self.session().map(|s| &s.credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Plan, Role};

    #[test]
    fn test_record_without_credentials_restores_with_none_configured() {
        let json = r#"{
            "token": "tok",
            "user": {"id":"1","email":"a@b.test","name":"A","role":"viewer"},
            "client": {"id":"1","name":"B","email":"a@b.test","plan_type":"pro"},
            "saved_at": "2026-01-01T00:00:00Z"
        }"#;
        let record: PersistedSession = serde_json::from_str(json).unwrap();
        let session = Session::from(record);

        assert_eq!(session.user.role, Role::Viewer);
        assert_eq!(session.tenant.plan, Plan::Pro);
        assert_eq!(session.credentials, CredentialFlags::default());
    }

    #[test]
    fn test_default_snapshot_is_loading_and_unauthenticated() {
        let snapshot = SessionSnapshot::default();
        assert!(snapshot.loading);
        assert!(!snapshot.is_authenticated());
        assert!(snapshot.user().is_none());
    }
}
