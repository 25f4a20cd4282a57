// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! ExecutiveAI Pro session client.
//!
//! This crate provides the authentication and session core of the
//! ExecutiveAI Pro dashboard: demo and backend login, session persistence
//! in local key-value storage, and integration credential management.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

use config::Config;
use services::{ApiClient, SessionManager};
use std::sync::Arc;
use storage::KeyValueStore;

/// Shared application state, built once at startup.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionManager,
}

impl AppState {
    /// Wire the session manager to `storage` and the configured backend.
    pub fn new(config: Config, storage: Arc<dyn KeyValueStore>) -> Self {
        let api = ApiClient::new(&config);
        let sessions = SessionManager::new(&config, storage, api);
        Self { config, sessions }
    }
}
