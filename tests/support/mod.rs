#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use fitplan::auth::{Credentials, MemoryCredentialStore};
use fitplan::session::{SessionEvent, SessionManager};
use reqwest::Url;
use serde_json::{json, Value};
use wiremock::MockServer;

/// JWT-shaped token with the given payload and a junk signature.
pub fn jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

pub fn alice_token() -> String {
    jwt(json!({ "username": "alice", "user_id": 1, "token_type": "access" }))
}

pub fn base_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api/", server.uri())).expect("mock server url")
}

pub fn empty_store() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::new())
}

pub fn seeded_store(access: &str, refresh: &str) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_credentials(Credentials::new(
        access, refresh,
    )))
}

pub fn manager(server: &MockServer, store: Arc<MemoryCredentialStore>) -> SessionManager {
    SessionManager::with_client(reqwest::Client::new(), base_url(server), store)
}

/// Collects every event the manager publishes.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn attach(session: &SessionManager) -> Self {
        let log = Self::default();
        let sink = log.events.clone();
        session.on_event(Arc::new(move |event: &SessionEvent| {
            sink.lock().expect("event log poisoned").push(event.clone());
        }));
        log
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().expect("event log poisoned").clone()
    }

    pub fn redirected_to(&self, route: &str) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, SessionEvent::Redirect { to } if to == route))
    }
}

pub fn plan_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "created_at": "2024-05-01T08:30:00Z",
        "exercises": [{
            "id": 100 + id,
            "exercise": {
                "id": 1,
                "name": "Squat",
                "description": "Barbell back squat",
                "muscle_group": "Legs",
                "sets": 5,
                "reps": 5
            },
            "custom_sets": null,
            "custom_reps": 8
        }]
    })
}
