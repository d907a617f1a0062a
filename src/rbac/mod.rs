use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::{handle, ApiClient, BearerToken, ClientError};
use crate::config::RbacConfig;

pub const CHECK_ROLE_PATH: &str = "/check-role";

/// Body the role service returns when the caller lacks every requested role.
pub const MISSING_ROLES: &str = "User does not have the required roles";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Error)]
pub enum RbacError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("unable to encode roles: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait RoleChecker: Send + Sync {
    /// Whether `token` grants one of `roles`.
    async fn perform_rbac_check(&self, token: &BearerToken, roles: &[Role]) -> Result<bool, RbacError>;
}

/// Role checks delegated to the external token decoder service.
pub struct RoleClient {
    client: ApiClient,
}

impl RoleClient {
    pub fn new(config: &RbacConfig) -> Result<Self, ClientError> {
        let client = ApiClient::new(&config.base_url, config.user_agent.clone(), Some(config.timeout()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RoleChecker for RoleClient {
    async fn perform_rbac_check(&self, token: &BearerToken, roles: &[Role]) -> Result<bool, RbacError> {
        debug!("BEGIN - perform_rbac_check");
        let body = serde_json::to_vec(roles)?;
        let result = handle(self.client.post(Some(token), CHECK_ROLE_PATH, body).await);

        match result.error {
            Some(err) if result.code == 404 => return Err(err.into()),
            Some(err @ (ClientError::Transport(_) | ClientError::Timeout(_) | ClientError::MissingCredential)) => {
                return Err(err.into())
            }
            Some(err) => {
                // Any other failed exchange counts as a denial.
                warn!("role check returned {}: {}; treating as not authorized", result.code, err);
                return Ok(false);
            }
            None => {}
        }

        match serde_json::from_slice::<String>(&result.raw) {
            Ok(user) => Ok(user != MISSING_ROLES),
            Err(e) => {
                warn!("role check response is not a JSON string ({}); treating as not authorized", e);
                Ok(false)
            }
        }
    }
}
