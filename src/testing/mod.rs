use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::client::{BearerToken, ClientError};
use crate::database::{CharacterStore, InMemoryCharacterStore};
use crate::rbac::{RbacError, Role, RoleChecker};
use crate::state::AppState;

pub const TEST_TOKEN: &str = "test-token";

enum StubOutcome {
    Allow,
    Deny,
    Fail(u16, String),
}

/// Role checker with a fixed answer that records every role it was asked about.
pub struct StubRoleChecker {
    outcome: StubOutcome,
    seen: Mutex<Vec<String>>,
}

impl StubRoleChecker {
    fn with(outcome: StubOutcome) -> Self {
        Self { outcome, seen: Mutex::new(Vec::new()) }
    }

    pub fn allow() -> Self {
        Self::with(StubOutcome::Allow)
    }

    pub fn deny() -> Self {
        Self::with(StubOutcome::Deny)
    }

    /// Fail as if the role service answered `status` with `{"error": message}`.
    pub fn fail(status: u16, message: &str) -> Self {
        Self::with(StubOutcome::Fail(status, message.to_string()))
    }

    pub fn roles_seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoleChecker for StubRoleChecker {
    async fn perform_rbac_check(&self, token: &BearerToken, roles: &[Role]) -> Result<bool, RbacError> {
        assert_eq!(token.as_str(), TEST_TOKEN);
        self.seen.lock().unwrap().extend(roles.iter().map(|r| r.name.clone()));
        match &self.outcome {
            StubOutcome::Allow => Ok(true),
            StubOutcome::Deny => Ok(false),
            StubOutcome::Fail(status, message) => Err(RbacError::Client(ClientError::Remote {
                status: *status,
                message: message.clone(),
            })),
        }
    }
}

/// Router over an in-memory store with handles kept for assertions.
pub struct TestApp {
    pub store: Arc<InMemoryCharacterStore>,
    pub rbac: Arc<StubRoleChecker>,
    pub router: Router,
}

impl TestApp {
    pub fn new(rbac: StubRoleChecker) -> Self {
        Self::with_store(Arc::new(InMemoryCharacterStore::new()), rbac)
    }

    pub fn with_store(store: Arc<InMemoryCharacterStore>, rbac: StubRoleChecker) -> Self {
        let rbac = Arc::new(rbac);
        let router = router_with(store.clone(), rbac.clone());
        Self { store, rbac, router }
    }
}

pub fn router_with(store: Arc<dyn CharacterStore>, rbac: Arc<dyn RoleChecker>) -> Router {
    crate::app(AppState::new(store, rbac))
}

/// Authenticated request with an optional JSON body.
pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let body = body.map(|v| v.to_string()).unwrap_or_default();
    raw_request(method, uri, &body)
}

/// Authenticated request with a verbatim body.
pub fn raw_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", TEST_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn anonymous_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

pub async fn oneshot(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    oneshot(app.router.clone(), request).await
}
