// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Built-in demo accounts.
//!
//! These sign in locally, without contacting the backend. They can be
//! switched off with `DEMO_ACCOUNTS_ENABLED=false`.

use subtle::ConstantTimeEq;

use crate::models::{Plan, Role, Tenant, User};

/// A fixed demo login and the identity it maps to.
#[derive(Debug, Clone, Copy)]
pub struct DemoAccount {
    pub email: &'static str,
    password: &'static str,
    id: &'static str,
    user_name: &'static str,
    role: Role,
    tenant_name: &'static str,
    plan: Plan,
}

pub const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        email: "admin@empresaa.com",
        password: "123456",
        id: "1",
        user_name: "Admin Empresa A",
        role: Role::Admin,
        tenant_name: "Empresa A",
        plan: Plan::Enterprise,
    },
    DemoAccount {
        email: "gestor@empresab.com",
        password: "senha123",
        id: "2",
        user_name: "Gestor Empresa B",
        role: Role::Viewer,
        tenant_name: "Empresa B",
        plan: Plan::Pro,
    },
    DemoAccount {
        email: "executivo@empresa.com",
        password: "123456",
        id: "3",
        user_name: "Executivo Demo",
        role: Role::Admin,
        tenant_name: "Empresa Demo",
        plan: Plan::Starter,
    },
];

impl DemoAccount {
    pub fn user(&self) -> User {
        User {
            id: self.id.to_string(),
            email: self.email.to_string(),
            name: self.user_name.to_string(),
            role: self.role,
        }
    }

    pub fn tenant(&self) -> Tenant {
        Tenant {
            id: self.id.to_string(),
            name: self.tenant_name.to_string(),
            email: self.email.to_string(),
            plan: self.plan,
        }
    }

    /// Exact, case-sensitive match on both fields.
    fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && bool::from(self.password.as_bytes().ct_eq(password.as_bytes()))
    }
}

/// Find the demo account for an (email, password) pair.
pub fn find(email: &str, password: &str) -> Option<&'static DemoAccount> {
    DEMO_ACCOUNTS.iter().find(|a| a.matches(email, password))
}
