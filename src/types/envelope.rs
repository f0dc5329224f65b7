use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Response metadata shared by every envelope
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Meta {
    pub code: u16,
    pub status: &'static str,
    pub message: String,
}

/// Uniform response wrapper: `{ meta: { code, status, message }, data }`.
///
/// `meta.code` always mirrors the HTTP status the envelope is sent with.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub meta: Meta,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    /// 200 OK envelope
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            meta: Meta {
                code: StatusCode::OK.as_u16(),
                status: "success",
                message: message.into(),
            },
            data,
        }
    }

    /// Error envelope for the given status
    pub fn error(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            meta: Meta {
                code: status.as_u16(),
                status: "error",
                message: message.into(),
            },
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.meta.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
