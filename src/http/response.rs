//! JSON response encoding.
//!
//! Handlers hand a serializable value to [`encode_response`] (200) or
//! [`encode_post_response`] (201). Serialization failures come back to the
//! handler as [`EncodeError`]; returning it with `?` yields a 500.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// The value could not be serialized.
#[derive(Debug, Error)]
#[error("failed to encode response body: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

impl IntoResponse for EncodeError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Response encoding failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// Encode `value` as a `200 OK` JSON response.
pub fn encode_response<T: Serialize + ?Sized>(value: &T) -> Result<Response, EncodeError> {
    encode_with_status(StatusCode::OK, value)
}

/// Encode `value` as a `201 Created` JSON response.
pub fn encode_post_response<T: Serialize + ?Sized>(value: &T) -> Result<Response, EncodeError> {
    encode_with_status(StatusCode::CREATED, value)
}

fn encode_with_status<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Response, EncodeError> {
    let mut body = serde_json::to_vec(value)?;
    body.push(b'\n');

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}
