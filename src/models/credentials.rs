// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Integration credential models.
//!
//! [`CredentialFlags`] only signals which integrations are configured; the
//! secret material travels once, as an [`IntegrationCredentials`] payload,
//! and is never stored locally.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::AppError;

/// An external service the dashboard can be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Integration {
    GoogleCalendar,
    GoogleMeet,
    WhatsApp,
    EvolutionApi,
    Supabase,
    N8n,
}

impl Integration {
    /// All integrations, in display order.
    pub const ALL: [Integration; 6] = [
        Integration::GoogleCalendar,
        Integration::GoogleMeet,
        Integration::WhatsApp,
        Integration::EvolutionApi,
        Integration::Supabase,
        Integration::N8n,
    ];

    /// Path segment used by `PUT /credentials/{type}`.
    pub fn slug(self) -> &'static str {
        match self {
            Integration::GoogleCalendar => "google_calendar",
            Integration::GoogleMeet => "google_meet",
            Integration::WhatsApp => "whatsapp",
            Integration::EvolutionApi => "evolution_api",
            Integration::Supabase => "supabase",
            Integration::N8n => "n8n",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Integration::GoogleCalendar => "Google Calendar",
            Integration::GoogleMeet => "Google Meet",
            Integration::WhatsApp => "WhatsApp Business",
            Integration::EvolutionApi => "Evolution API",
            Integration::Supabase => "Supabase",
            Integration::N8n => "n8n",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Integration::GoogleCalendar => "Meeting scheduling through Google Calendar",
            Integration::GoogleMeet => "Automatic Google Meet links for meetings",
            Integration::WhatsApp => "Client messaging over WhatsApp",
            Integration::EvolutionApi => "WhatsApp automation API",
            Integration::Supabase => "Database backend",
            Integration::N8n => "Workflow automation webhooks",
        }
    }
}

impl std::fmt::Display for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for Integration {
    type Err = AppError;

    /// Accepts the slug, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Integration::ALL
            .into_iter()
            .find(|i| i.slug() == normalized)
            .ok_or_else(|| AppError::Validation(format!("Unknown integration: {}", s)))
    }
}

/// Which integrations are configured for the tenant.
///
/// Missing fields deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CredentialFlags {
    pub google_calendar: bool,
    pub google_meet: bool,
    pub whatsapp: bool,
    pub evolution_api: bool,
    pub supabase_configured: bool,
    pub n8n_configured: bool,
}

impl CredentialFlags {
    /// Every integration enabled (granted to demo accounts).
    pub const ALL_ENABLED: CredentialFlags = CredentialFlags {
        google_calendar: true,
        google_meet: true,
        whatsapp: true,
        evolution_api: true,
        supabase_configured: true,
        n8n_configured: true,
    };

    pub fn is_configured(&self, integration: Integration) -> bool {
        match integration {
            Integration::GoogleCalendar => self.google_calendar,
            Integration::GoogleMeet => self.google_meet,
            Integration::WhatsApp => self.whatsapp,
            Integration::EvolutionApi => self.evolution_api,
            Integration::Supabase => self.supabase_configured,
            Integration::N8n => self.n8n_configured,
        }
    }

    /// Configuration status of every integration, in display order.
    pub fn statuses(&self) -> impl Iterator<Item = (Integration, bool)> + '_ {
        Integration::ALL
            .into_iter()
            .map(move |i| (i, self.is_configured(i)))
    }

    pub fn configured_count(&self) -> usize {
        self.statuses().filter(|(_, on)| *on).count()
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct GoogleCalendarCredentials {
    #[validate(length(min = 1, message = "client_id is required"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "client_secret is required"))]
    pub client_secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct GoogleMeetCredentials {
    #[validate(length(min = 1, message = "client_id is required"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "client_secret is required"))]
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct WhatsAppCredentials {
    #[validate(length(min = 1, message = "api_key is required"))]
    pub api_key: String,
    #[validate(length(min = 8, max = 20, message = "phone_number looks invalid"))]
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "webhook_url must be a URL"))]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct EvolutionApiCredentials {
    #[validate(url(message = "base_url must be a URL"))]
    pub base_url: String,
    #[validate(length(min = 1, message = "api_key is required"))]
    pub api_key: String,
    #[validate(length(min = 1, message = "instance_name is required"))]
    pub instance_name: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct SupabaseCredentials {
    #[validate(url(message = "url must be a URL"))]
    pub url: String,
    #[validate(length(min = 1, message = "anon_key is required"))]
    pub anon_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_role_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct N8nCredentials {
    #[validate(url(message = "webhook_url must be a URL"))]
    pub webhook_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Provider-specific configuration sent to `PUT /credentials/{type}`.
///
/// Serializes as the bare field set of the variant.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IntegrationCredentials {
    GoogleCalendar(GoogleCalendarCredentials),
    GoogleMeet(GoogleMeetCredentials),
    WhatsApp(WhatsAppCredentials),
    EvolutionApi(EvolutionApiCredentials),
    Supabase(SupabaseCredentials),
    N8n(N8nCredentials),
}

impl IntegrationCredentials {
    pub fn integration(&self) -> Integration {
        match self {
            IntegrationCredentials::GoogleCalendar(_) => Integration::GoogleCalendar,
            IntegrationCredentials::GoogleMeet(_) => Integration::GoogleMeet,
            IntegrationCredentials::WhatsApp(_) => Integration::WhatsApp,
            IntegrationCredentials::EvolutionApi(_) => Integration::EvolutionApi,
            IntegrationCredentials::Supabase(_) => Integration::Supabase,
            IntegrationCredentials::N8n(_) => Integration::N8n,
        }
    }

    /// Check required fields and URL formats before anything is sent.
    pub fn validate(&self) -> Result<(), AppError> {
        let result = match self {
            IntegrationCredentials::GoogleCalendar(c) => c.validate(),
            IntegrationCredentials::GoogleMeet(c) => c.validate(),
            IntegrationCredentials::WhatsApp(c) => c.validate(),
            IntegrationCredentials::EvolutionApi(c) => c.validate(),
            IntegrationCredentials::Supabase(c) => c.validate(),
            IntegrationCredentials::N8n(c) => c.validate(),
        };
        result.map_err(|e| AppError::Validation(format!("{}: {}", self.integration(), e)))
    }
}
