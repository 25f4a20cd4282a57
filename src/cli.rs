//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};

use crate::models::{
    EvolutionApiCredentials, GoogleCalendarCredentials, GoogleMeetCredentials,
    IntegrationCredentials, N8nCredentials, SupabaseCredentials, WhatsAppCredentials,
};

#[derive(Parser)]
#[command(name = "executive-session")]
#[command(version = "0.1")]
#[command(about = "ExecutiveAI Pro session client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Shows the current session and integration status
    Status,
    /// Signs in with email and password
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Signs out and clears the stored session
    Logout,
    /// Re-reads the integration flags from the backend
    Refresh,
    /// Configures an integration
    Configure {
        #[command(subcommand)]
        integration: ConfigureCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigureCommands {
    /// Google Calendar OAuth client
    GoogleCalendar(GoogleCalendarArgs),
    /// Google Meet OAuth client
    GoogleMeet(GoogleMeetArgs),
    /// WhatsApp Business API
    #[command(name = "whatsapp")]
    WhatsApp(WhatsAppArgs),
    /// Evolution API instance
    EvolutionApi(EvolutionApiArgs),
    /// Supabase project
    Supabase(SupabaseArgs),
    /// n8n workflow webhook
    N8n(N8nArgs),
}

#[derive(Args)]
pub struct GoogleCalendarArgs {
    #[arg(long)]
    pub client_id: String,
    #[arg(long)]
    pub client_secret: String,
    #[arg(long)]
    pub refresh_token: Option<String>,
    #[arg(long)]
    pub calendar_id: Option<String>,
}

#[derive(Args)]
pub struct GoogleMeetArgs {
    #[arg(long)]
    pub client_id: String,
    #[arg(long)]
    pub client_secret: String,
}

#[derive(Args)]
pub struct WhatsAppArgs {
    #[arg(long)]
    pub api_key: String,
    #[arg(long)]
    pub phone_number: String,
    #[arg(long)]
    pub webhook_url: Option<String>,
    #[arg(long)]
    pub instance_id: Option<String>,
}

#[derive(Args)]
pub struct EvolutionApiArgs {
    #[arg(long)]
    pub base_url: String,
    #[arg(long)]
    pub api_key: String,
    #[arg(long)]
    pub instance_name: String,
}

#[derive(Args)]
pub struct SupabaseArgs {
    #[arg(long)]
    pub url: String,
    #[arg(long)]
    pub anon_key: String,
    #[arg(long)]
    pub service_role_key: Option<String>,
}

#[derive(Args)]
pub struct N8nArgs {
    #[arg(long)]
    pub webhook_url: String,
    #[arg(long)]
    pub api_key: Option<String>,
}

impl From<ConfigureCommands> for IntegrationCredentials {
    fn from(command: ConfigureCommands) -> Self {
        match command {
            ConfigureCommands::GoogleCalendar(a) => {
                IntegrationCredentials::GoogleCalendar(GoogleCalendarCredentials {
                    client_id: a.client_id,
                    client_secret: a.client_secret,
                    refresh_token: a.refresh_token,
                    calendar_id: a.calendar_id,
                })
            }
            ConfigureCommands::GoogleMeet(a) => {
                IntegrationCredentials::GoogleMeet(GoogleMeetCredentials {
                    client_id: a.client_id,
                    client_secret: a.client_secret,
                })
            }
            ConfigureCommands::WhatsApp(a) => IntegrationCredentials::WhatsApp(WhatsAppCredentials {
                api_key: a.api_key,
                phone_number: a.phone_number,
                webhook_url: a.webhook_url,
                instance_id: a.instance_id,
            }),
            ConfigureCommands::EvolutionApi(a) => {
                IntegrationCredentials::EvolutionApi(EvolutionApiCredentials {
                    base_url: a.base_url,
                    api_key: a.api_key,
                    instance_name: a.instance_name,
                })
            }
            ConfigureCommands::Supabase(a) => IntegrationCredentials::Supabase(SupabaseCredentials {
                url: a.url,
                anon_key: a.anon_key,
                service_role_key: a.service_role_key,
            }),
            ConfigureCommands::N8n(a) => IntegrationCredentials::N8n(N8nCredentials {
                webhook_url: a.webhook_url,
                api_key: a.api_key,
            }),
        }
    }
}
