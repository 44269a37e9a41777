use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Success envelope: `{ data?, message }` with an optional non-200 status.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize = ()> {
    data: Option<T>,
    message: String,
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a data payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
            status: StatusCode::OK,
        }
    }

    /// 201 Created with a data payload.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
            status: StatusCode::CREATED,
        }
    }
}

impl ApiResponse<()> {
    /// 200 OK, message only.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            status: StatusCode::OK,
        }
    }

    /// 201 Created, message only.
    pub fn created_message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            status: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut body = json!({ "message": self.message });

        if let Some(data) = self.data {
            match serde_json::to_value(&data) {
                Ok(value) => {
                    body["data"] = value;
                }
                Err(e) => {
                    tracing::error!("failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "message": self.message,
                            "error": "Failed to serialize response data",
                        })),
                    )
                        .into_response();
                }
            }
        }

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_only_omits_data() {
        let res = ApiResponse::message("Successfully deleted board");
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.data.is_none());
    }

    #[test]
    fn created_uses_201() {
        let res = ApiResponse::created("Successfully added collaborator", json!({"id": 1}));
        assert_eq!(res.status, StatusCode::CREATED);
        assert!(res.data.is_some());
    }
}
