// handlers/protected/sheet/collection.rs - POST/GET /force-character-sheet

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode, Uri},
};
use tracing::info;

use crate::database::models::ForceCharacterSheet;
use crate::error::ApiError;
use crate::filter::build_filter;
use crate::middleware::respond_with_json;
use crate::state::AppState;
use crate::types::ObjectId;

use super::utils::{authorize, SheetResult, INVALID_PAYLOAD, ROLE_GAMEMASTER, ROLE_VIEWER};

/// POST /force-character-sheet - Create a sheet, responding 201 with its new id.
///
/// The identifier is always assigned here; any `_id` in the payload is
/// discarded. A missing or zero `version` is stored as 1.
pub async fn post(State(state): State<AppState>, uri: Uri, headers: HeaderMap, body: Bytes) -> SheetResult {
    info!("insert_force_character_sheet invoked with url: {}", uri);
    authorize(&state, &headers, ROLE_GAMEMASTER).await?;

    let mut sheet: ForceCharacterSheet =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request(INVALID_PAYLOAD))?;
    sheet.id = ObjectId::new();
    if sheet.version == 0 {
        sheet.version = 1;
    }

    state.store.insert(&sheet).await?;
    Ok(respond_with_json(StatusCode::CREATED, sheet.id))
}

/// GET /force-character-sheet - List sheets.
///
/// `pageNumber`, `pageCount` and `sort` shape the page; every other query
/// parameter is an equality filter on the named (optionally dotted) field.
pub async fn get(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> SheetResult {
    info!("get_force_character_sheets invoked with url: {}", uri);
    authorize(&state, &headers, ROLE_VIEWER).await?;

    let params: Vec<(String, String)> = query
        .as_deref()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let filter = build_filter(&params);

    let sheets = state.store.find_all(&filter).await?;
    Ok(respond_with_json(StatusCode::OK, sheets))
}
