// handlers/protected/sheet/record.rs - GET/PUT/DELETE /force-character-sheet/:id

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
};
use tracing::info;

use crate::database::models::ForceCharacterSheet;
use crate::database::Capability;
use crate::error::ApiError;
use crate::middleware::{respond_no_content, respond_with_json};
use crate::state::AppState;

use super::utils::{authorize, parse_id, SheetResult, ROLE_GAMEMASTER, ROLE_PLAYER, ROLE_VIEWER};

/// GET /force-character-sheet/:id - Fetch one sheet
pub async fn get(State(state): State<AppState>, Path(id): Path<String>, uri: Uri, headers: HeaderMap) -> SheetResult {
    info!("find_force_character_sheet_by_id invoked with url: {}", uri);
    authorize(&state, &headers, ROLE_VIEWER).await?;

    let id = parse_id(&id)?;
    let sheet = state.store.find_by_id(&id).await?;
    Ok(respond_with_json(StatusCode::OK, sheet))
}

/// PUT /force-character-sheet/:id - Overwrite a sheet's fields, responding with the id
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> SheetResult {
    info!("update_force_character_sheet_by_id invoked with url: {}", uri);
    authorize(&state, &headers, ROLE_PLAYER).await?;

    let id = parse_id(&id)?;
    let sheet: ForceCharacterSheet =
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;

    state.store.update_by_id(&sheet, &id).await?;
    Ok(respond_with_json(StatusCode::OK, id))
}

/// DELETE /force-character-sheet/:id - Remove a sheet, 204 with no body
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> SheetResult {
    info!("delete_force_character_sheet_by_id invoked with url: {}", uri);
    authorize(&state, &headers, ROLE_GAMEMASTER).await?;

    let id = parse_id(&id)?;
    if !state.store.capabilities().supports(Capability::Delete) {
        return Err(ApiError::not_implemented("delete is not supported by the configured storage backend").into());
    }

    state.store.delete_by_id(&id).await?;
    Ok(respond_no_content(StatusCode::NO_CONTENT))
}
