// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Integration credential update and flag refresh tests.

use executive_session::models::{
    CredentialFlags, IntegrationCredentials, N8nCredentials, PersistedSession,
    SupabaseCredentials, WhatsAppCredentials,
};
use executive_session::storage::{keys, KeyValueStore, MemoryStore};
use std::sync::atomic::Ordering;
use std::time::Duration;

mod common;
use common::{session_manager, MockBackend};

fn n8n() -> IntegrationCredentials {
    IntegrationCredentials::N8n(N8nCredentials {
        webhook_url: "https://acme.app.n8n.cloud/webhook/leads".to_string(),
        api_key: Some("n8n-key".to_string()),
    })
}

fn stored_flags(store: &MemoryStore) -> Option<CredentialFlags> {
    let raw = store.get(keys::SESSION).unwrap()?;
    let record: PersistedSession = serde_json::from_str(&raw).unwrap();
    record.credentials
}

#[tokio::test]
async fn test_update_then_refresh_replaces_flags_wholesale() {
    let backend = MockBackend::start().await;
    let store = MemoryStore::new();
    let sessions = session_manager(&backend.config(), &store);

    assert!(sessions.login("admin@empresaa.com", "123456").await);
    assert_eq!(sessions.credentials(), Some(CredentialFlags::ALL_ENABLED));

    assert!(sessions.update_credentials(&n8n()).await);

    let expected = CredentialFlags {
        n8n_configured: true,
        ..CredentialFlags::default()
    };
    assert_eq!(sessions.credentials(), Some(expected));
    assert_eq!(stored_flags(&store), Some(expected));
    assert!(sessions.is_authenticated());
}

#[tokio::test]
async fn test_update_sends_payload_with_stored_bearer() {
    let backend = MockBackend::start().await;
    let store = MemoryStore::new();
    let sessions = session_manager(&backend.config(), &store);

    assert!(sessions.login(common::BACKEND_EMAIL, common::BACKEND_PASSWORD).await);
    assert!(sessions.update_credentials(&n8n()).await);

    let puts = backend.puts();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].integration, "n8n");
    assert_eq!(puts[0].bearer.as_deref(), Some(common::BACKEND_TOKEN));
    assert_eq!(
        puts[0].body,
        serde_json::json!({
            "webhook_url": "https://acme.app.n8n.cloud/webhook/leads",
            "api_key": "n8n-key"
        })
    );
}

#[tokio::test]
async fn test_invalid_payload_is_not_sent() {
    let backend = MockBackend::start().await;
    let store = MemoryStore::new();
    let sessions = session_manager(&backend.config(), &store);
    assert!(sessions.login("admin@empresaa.com", "123456").await);

    let payload = IntegrationCredentials::WhatsApp(WhatsAppCredentials {
        api_key: String::new(),
        phone_number: "+5511999990000".to_string(),
        webhook_url: None,
        instance_id: None,
    });

    assert!(!sessions.update_credentials(&payload).await);
    assert!(backend.puts().is_empty());
    assert_eq!(sessions.credentials(), Some(CredentialFlags::ALL_ENABLED));
}

#[tokio::test]
async fn test_backend_rejection_leaves_flags_unchanged() {
    let backend = MockBackend::start().await;
    let store = MemoryStore::new();
    let sessions = session_manager(&backend.config(), &store);
    assert!(sessions.login(common::BACKEND_EMAIL, common::BACKEND_PASSWORD).await);
    let before = sessions.credentials();

    let payload = IntegrationCredentials::Supabase(SupabaseCredentials {
        url: "https://acme.supabase.co".to_string(),
        anon_key: "anon".to_string(),
        service_role_key: None,
    });

    assert!(!sessions.update_credentials(&payload).await);
    assert_eq!(sessions.credentials(), before);
    assert_eq!(backend.state.credential_gets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_retries_transient_failures() {
    let backend = MockBackend::start().await;
    let store = MemoryStore::new();
    // test_default allows two retries
    let sessions = session_manager(&backend.config(), &store);
    assert!(sessions.login("admin@empresaa.com", "123456").await);

    let flags = CredentialFlags {
        google_meet: true,
        ..CredentialFlags::default()
    };
    backend.set_flags(flags);
    backend.state.failing_gets.store(2, Ordering::SeqCst);

    sessions.refresh_credential_flags().await;

    assert_eq!(backend.state.credential_gets.load(Ordering::SeqCst), 3);
    assert_eq!(sessions.credentials(), Some(flags));
}

#[tokio::test]
async fn test_refresh_failure_keeps_previous_flags() {
    let backend = MockBackend::start().await;
    let store = MemoryStore::new();
    let sessions = session_manager(&backend.config(), &store);
    assert!(sessions.login("admin@empresaa.com", "123456").await);

    backend.state.failing_gets.store(10, Ordering::SeqCst);
    sessions.refresh_credential_flags().await;

    assert_eq!(backend.state.credential_gets.load(Ordering::SeqCst), 3);
    assert_eq!(sessions.credentials(), Some(CredentialFlags::ALL_ENABLED));
    assert_eq!(stored_flags(&store), Some(CredentialFlags::ALL_ENABLED));
}

#[tokio::test]
async fn test_refresh_without_token_is_not_retried() {
    let backend = MockBackend::start().await;
    let store = MemoryStore::new();
    let sessions = session_manager(&backend.config(), &store);
    sessions.restore().await;

    sessions.refresh_credential_flags().await;

    // 401 is an auth error: exactly one attempt
    assert_eq!(backend.state.credential_gets.load(Ordering::SeqCst), 1);
    assert!(!sessions.is_authenticated());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_refresh_spanning_a_new_login_keeps_new_session_flags() {
    let backend = MockBackend::start().await;
    let store = MemoryStore::new();
    let sessions = session_manager(&backend.config(), &store);
    assert!(sessions.login("admin@empresaa.com", "123456").await);

    backend.delay_credential_reads(Duration::from_millis(300));

    let (_, switched) = tokio::join!(sessions.refresh_credential_flags(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        sessions.login("gestor@empresab.com", "senha123").await
    });

    assert!(switched);
    assert_eq!(backend.state.credential_gets.load(Ordering::SeqCst), 1);
    let user = sessions.user().unwrap();
    assert_eq!(user.email, "gestor@empresab.com");
    assert_eq!(sessions.credentials(), Some(CredentialFlags::ALL_ENABLED));
    assert_eq!(stored_flags(&store), Some(CredentialFlags::ALL_ENABLED));
}
