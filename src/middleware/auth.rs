use axum::http::{header, HeaderMap};

/// Extract the bearer token from the Authorization header.
///
/// A leading `Bearer` prefix and surrounding spaces are removed; a header
/// holding only the bare token is accepted as-is. Missing or blank tokens
/// yield `None`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim();
    let token = token.strip_prefix("Bearer").unwrap_or(token).trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
