// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the session client.

pub mod credentials;
pub mod session;
pub mod user;

pub use credentials::{
    CredentialFlags, EvolutionApiCredentials, GoogleCalendarCredentials, GoogleMeetCredentials,
    Integration, IntegrationCredentials, N8nCredentials, SupabaseCredentials, WhatsAppCredentials,
};
pub use session::{PersistedSession, Session, SessionPhase, SessionSnapshot};
pub use user::{Plan, Role, Tenant, User};
