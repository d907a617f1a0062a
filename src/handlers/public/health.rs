// handlers/public/health.rs - GET /ping and GET /health

use axum::{extract::State, http::StatusCode, response::Response};
use serde::{Deserialize, Serialize};

use crate::middleware::respond_with_json;
use crate::state::AppState;

/// Version of the api and whether or not the store is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub api_version: String,
    pub db_error: String,
}

/// GET /ping - Always 200 with `OK, <version>`
pub async fn ping(State(state): State<AppState>) -> (StatusCode, String) {
    (StatusCode::OK, format!("OK, {}", state.version))
}

/// GET /health - 200 when the store answers a ping, 424 carrying its error otherwise
pub async fn health(State(state): State<AppState>) -> Response {
    let db_result = state.store.ping().await;
    let status = if db_result.is_ok() { StatusCode::OK } else { StatusCode::FAILED_DEPENDENCY };

    let response = HealthCheckResponse {
        api_version: state.version.clone(),
        db_error: db_result.err().map(|e| e.to_string()).unwrap_or_default(),
    };
    respond_with_json(status, response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{CharacterStore, StoreError};
    use crate::database::models::ForceCharacterSheet;
    use crate::filter::QueryFilter;
    use crate::testing::{anonymous_request, oneshot, router_with, send, StubRoleChecker, TestApp};
    use crate::types::ObjectId;
    use async_trait::async_trait;
    use axum::http::Method;
    use std::sync::Arc;
    use std::time::Duration;

    /// Store whose backing database never answers.
    struct DownStore;

    #[async_trait]
    impl CharacterStore for DownStore {
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Timeout(Duration::from_secs(1)))
        }
        async fn insert(&self, _: &ForceCharacterSheet) -> Result<(), StoreError> {
            unreachable!()
        }
        async fn find_all(&self, _: &QueryFilter) -> Result<Vec<ForceCharacterSheet>, StoreError> {
            unreachable!()
        }
        async fn find_by_id(&self, _: &ObjectId) -> Result<ForceCharacterSheet, StoreError> {
            unreachable!()
        }
        async fn update_by_id(&self, _: &ForceCharacterSheet, _: &ObjectId) -> Result<(), StoreError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn ping_reports_version() {
        let app = TestApp::new(StubRoleChecker::deny());
        let (status, bytes) = send(&app, anonymous_request(Method::GET, "/ping")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(bytes).unwrap(), format!("OK, {}", env!("CARGO_PKG_VERSION")));
    }

    #[tokio::test]
    async fn health_ok_with_empty_db_error() {
        let app = TestApp::new(StubRoleChecker::deny());
        let (status, bytes) = send(&app, anonymous_request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::OK);
        let body: HealthCheckResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.db_error, "");
        assert_eq!(body.api_version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn health_failed_dependency_when_store_down() {
        let router = router_with(Arc::new(DownStore), Arc::new(StubRoleChecker::deny()));
        let (status, bytes) = oneshot(router, anonymous_request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["dbError"].as_str().unwrap().contains("time limit"));
        assert!(body["apiVersion"].is_string());
    }
}
