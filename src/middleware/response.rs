use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Serialize `payload` as the JSON body of a response with status `code`.
pub fn respond_with_json<T: Serialize>(code: StatusCode, payload: T) -> Response {
    match serde_json::to_value(&payload) {
        Ok(value) => (code, Json(value)).into_response(),
        Err(e) => {
            tracing::error!("Error in respond_with_json marshal: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Failed to serialize response data" })))
                .into_response()
        }
    }
}

/// `{"error": msg}` with double quotes removed from `msg`.
pub fn respond_with_error(code: StatusCode, msg: &str) -> Response {
    respond_with_json(code, json!({ "error": msg.replace('"', "") }))
}

pub fn respond_no_content(code: StatusCode) -> Response {
    (code, [(header::CONTENT_LENGTH, "0")]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[tokio::test]
    async fn error_body_has_quotes_stripped() {
        let response = respond_with_error(StatusCode::BAD_REQUEST, r#"bad "field""#);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body, json!({ "error": "bad field" }));
    }

    #[tokio::test]
    async fn json_string_payload_is_quoted() {
        let response = respond_with_json(StatusCode::CREATED, "abc");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_of(response).await, b"\"abc\"");
    }

    #[tokio::test]
    async fn no_content_has_empty_body() {
        let response = respond_no_content(StatusCode::NO_CONTENT);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_of(response).await.is_empty());
    }
}
