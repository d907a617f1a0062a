use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::client::BearerToken;
use crate::database::StoreError;
use crate::error::ApiError;
use crate::middleware::{extract_bearer_token, respond_with_json};
use crate::rbac::{RbacError, Role};
use crate::state::AppState;
use crate::types::{ObjectId, ObjectIdError};

pub const ROLE_GAMEMASTER: &str = "gamemaster";
pub const ROLE_PLAYER: &str = "player";
pub const ROLE_VIEWER: &str = "viewer";

pub const MISSING_TOKEN: &str = "User is not authorized to make this request";
pub const NOT_AUTHORIZED: &str = "User is not authorized to access this resource";
pub const INVALID_PAYLOAD: &str = "Invalid Request Payload";

/// Why a sheet request stopped short of a success response.
#[derive(Debug)]
pub enum Rejection {
    Error(ApiError),
    /// The role service answered and the caller lacks the role. Sent as a
    /// bare JSON string rather than an error document.
    NotAuthorized,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::Error(err) => err.into_response(),
            Rejection::NotAuthorized => respond_with_json(StatusCode::UNAUTHORIZED, NOT_AUTHORIZED),
        }
    }
}

impl From<ApiError> for Rejection {
    fn from(err: ApiError) -> Self {
        Rejection::Error(err)
    }
}

impl From<StoreError> for Rejection {
    fn from(err: StoreError) -> Self {
        Rejection::Error(err.into())
    }
}

impl From<RbacError> for Rejection {
    fn from(err: RbacError) -> Self {
        Rejection::Error(err.into())
    }
}

impl From<ObjectIdError> for Rejection {
    fn from(err: ObjectIdError) -> Self {
        Rejection::Error(err.into())
    }
}

pub type SheetResult = Result<Response, Rejection>;

/// Check the caller's bearer token against `role` with the role service.
pub async fn authorize(state: &AppState, headers: &HeaderMap, role: &str) -> Result<(), Rejection> {
    let token = extract_bearer_token(headers)
        .map(BearerToken::new)
        .ok_or_else(|| ApiError::unauthorized(MISSING_TOKEN))?;

    if state.rbac.perform_rbac_check(&token, &[Role::new(role)]).await? {
        Ok(())
    } else {
        Err(Rejection::NotAuthorized)
    }
}

pub fn parse_id(raw: &str) -> Result<ObjectId, Rejection> {
    Ok(ObjectId::parse_user_id(raw)?)
}
