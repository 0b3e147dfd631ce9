use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ApiError;

/// `{ success, data | message }` envelope shared by every endpoint.
#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    fn with_status(status: StatusCode, data: T) -> Self {
        ApiResponse {
            status,
            body: Envelope {
                success: true,
                data: Some(data),
                message: None,
            },
        }
    }

    /// Success without a payload, e.g. after a delete.
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            status: StatusCode::OK,
            body: Envelope {
                success: true,
                data: None,
                message: Some(message.into()),
            },
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: Envelope {
                success: false,
                data: None,
                message: Some(message.into()),
            },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// JSON body extractor whose rejections come back inside the envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Payload<T>(pub T);
