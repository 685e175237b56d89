// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP error responses.
//!
//! Reconciliation failures are never HTTP errors: they travel inside the
//! snapshot as `status: "failed"`. `ApiError` only covers requests the
//! service rejects before doing any chain work.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::AmountError;

/// A rejected request, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Malformed path or body, e.g. an invalid account address.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Well-formed request whose values cannot be used, e.g. a bad amount.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl From<AmountError> for ApiError {
    fn from(err: AmountError) -> Self {
        Self::unprocessable(format!("Invalid amount: {err}"))
    }
}

impl From<rust_decimal::Error> for ApiError {
    fn from(err: rust_decimal::Error) -> Self {
        Self::unprocessable(format!("Invalid amount: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!(status = self.status.as_u16(), message = %self.message, "Request rejected");
        let body = Json(ErrorBody {
            error: &self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::str::FromStr;

    async fn body_of(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn bad_request_renders_error_body() {
        let (status, body) = body_of(ApiError::bad_request("Address must start with 0x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"Address must start with 0x"}"#);
    }

    #[tokio::test]
    async fn amount_errors_are_unprocessable() {
        let (status, body) = body_of(AmountError::TooPrecise(6).into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            r#"{"error":"Invalid amount: too many decimal places (max 6)"}"#
        );

        let parse_err = rust_decimal::Decimal::from_str("12,5").unwrap_err();
        let err = ApiError::from(parse_err);
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message.starts_with("Invalid amount: "));
    }
}
