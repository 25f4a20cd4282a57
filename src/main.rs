// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ExecutiveAI Pro session CLI
//!
//! Restores the locally stored session, runs one command against it and
//! prints the resulting state.

use clap::Parser;
use executive_session::{
    cli::{Cli, Commands},
    config::Config,
    models::{IntegrationCredentials, SessionSnapshot},
    storage::FileStore,
    AppState,
};
use std::io::BufRead;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing::debug!(api = %config.api_base_url, store = %config.store_path.display(), "Configuration loaded");

    let storage = Arc::new(FileStore::open(&config.store_path)?);
    let state = AppState::new(config, storage);
    state.sessions.restore().await;

    let ok = match cli.command {
        Commands::Status => true,
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let ok = state.sessions.login(&email, &password).await;
            if !ok {
                eprintln!("Invalid email or password");
            }
            ok
        }
        Commands::Logout => {
            state.sessions.logout().await;
            true
        }
        Commands::Refresh => {
            if !state.sessions.is_authenticated() {
                eprintln!("Not signed in");
                return Ok(ExitCode::FAILURE);
            }
            state.sessions.refresh_credential_flags().await;
            true
        }
        Commands::Configure { integration } => {
            if !state.sessions.is_authenticated() {
                eprintln!("Not signed in");
                return Ok(ExitCode::FAILURE);
            }
            let credentials = IntegrationCredentials::from(integration);
            let ok = state.sessions.update_credentials(&credentials).await;
            if !ok {
                eprintln!(
                    "Could not save {} settings, try again",
                    credentials.integration().display_name()
                );
            }
            ok
        }
    };

    print_status(&state.sessions.snapshot());
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_status(snapshot: &SessionSnapshot) {
    let Some(session) = snapshot.session() else {
        println!("Not signed in");
        return;
    };

    println!(
        "Signed in as {} <{}> ({:?})",
        session.user.name, session.user.email, session.user.role
    );
    println!("Company: {} ({:?} plan)", session.tenant.name, session.tenant.plan);
    println!("Integrations:");
    for (integration, configured) in session.credentials.statuses() {
        let mark = if configured { "configured" } else { "not configured" };
        println!("  {:<18} {}", integration.display_name(), mark);
    }
}

/// Initialize logging to stderr: JSON when `LOG_FORMAT=json`, compact otherwise.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("executive_session=info,warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
