// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session logic and backend access.

pub mod api;
pub mod demo;
pub mod session;
pub mod token;

pub use api::{ApiClient, LoginResponse};
pub use demo::{DemoAccount, DEMO_ACCOUNTS};
pub use session::SessionManager;
pub use token::generate_session_token;
