//! Uniform response envelope
//!
//! Every data endpoint answers with the same JSON shape:
//! `{ success, data?, message?, error?, total?, pagination? }`. Application
//! outcomes (invalid id, not found, validation, duplicate, unsupported
//! operation) answer HTTP 200 with `success:false`; only infrastructure
//! failures use error statuses.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::types::AnnuaireError;

/// Body type shared by every handler
pub type ApiBody = Full<Bytes>;

/// Pagination block for list responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            ((total as f64) / (limit as f64)).ceil() as u32
        };

        Self {
            page,
            limit,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
}

fn respond<T: Serialize>(status: StatusCode, envelope: &Envelope<T>) -> Response<ApiBody> {
    let body = serde_json::to_string(envelope)
        .unwrap_or_else(|_| r#"{"success":false,"message":"Serialization failed"}"#.to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Successful response carrying data
pub fn data<T: Serialize>(value: T) -> Response<ApiBody> {
    respond(
        StatusCode::OK,
        &Envelope {
            success: true,
            data: Some(value),
            message: None,
            error: None,
            total: None,
            pagination: None,
        },
    )
}

/// Successful response carrying data and an item count
pub fn data_total<T: Serialize>(value: T, total: u64) -> Response<ApiBody> {
    respond(
        StatusCode::OK,
        &Envelope {
            success: true,
            data: Some(value),
            message: None,
            error: None,
            total: Some(total),
            pagination: None,
        },
    )
}

/// Successful response carrying data and a message
pub fn data_message<T: Serialize>(value: T, message: &str) -> Response<ApiBody> {
    respond(
        StatusCode::OK,
        &Envelope {
            success: true,
            data: Some(value),
            message: Some(message.to_string()),
            error: None,
            total: None,
            pagination: None,
        },
    )
}

/// Successful paginated list response
pub fn list<T: Serialize>(items: Vec<T>, total: u64, pagination: Pagination) -> Response<ApiBody> {
    respond(
        StatusCode::OK,
        &Envelope {
            success: true,
            data: Some(items),
            message: None,
            error: None,
            total: Some(total),
            pagination: Some(pagination),
        },
    )
}

/// Successful response carrying only a message
pub fn message(message: &str) -> Response<ApiBody> {
    respond(
        StatusCode::OK,
        &Envelope::<()> {
            success: true,
            data: None,
            message: Some(message.to_string()),
            error: None,
            total: None,
            pagination: None,
        },
    )
}

/// Application failure: HTTP 200 with `success:false`
pub fn failure(message: impl Into<String>, code: &str) -> Response<ApiBody> {
    failure_status(StatusCode::OK, message, code)
}

/// Failure with an explicit HTTP status
pub fn failure_status(
    status: StatusCode,
    message: impl Into<String>,
    code: &str,
) -> Response<ApiBody> {
    respond(
        status,
        &Envelope::<()> {
            success: false,
            data: None,
            message: Some(message.into()),
            error: Some(code.to_string()),
            total: None,
            pagination: None,
        },
    )
}

/// Failure derived from a service error; detail stays in the logs
pub fn error(err: &AnnuaireError) -> Response<ApiBody> {
    failure_status(err.status(), err.public_message(), err.code())
}

/// Database not configured or unreachable
pub fn db_unavailable() -> Response<ApiBody> {
    failure_status(
        StatusCode::SERVICE_UNAVAILABLE,
        "Database not available",
        "DB_UNAVAILABLE",
    )
}

/// Unmatched method/path combination inside the API surface
pub fn unsupported() -> Response<ApiBody> {
    failure("Unsupported operation", "UNSUPPORTED")
}

/// CORS preflight response
pub fn preflight() -> Response<ApiBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(response: Response<ApiBody>) -> serde_json::Value {
        // Full<Bytes> exposes its content synchronously through the inner frame
        use http_body_util::BodyExt;
        let bytes = tokio_test::block_on(async {
            response.into_body().collect().await.unwrap().to_bytes()
        });
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_success_envelope_carries_data_only() {
        let json = body_json(data(serde_json::json!({"id": "abc"})));
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["id"], "abc");
        assert!(json.get("message").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("total").is_none());
    }

    #[test]
    fn test_failure_answers_200_with_success_false() {
        let response = failure("Invalid member identifier", "INVALID_ID");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid member identifier");
        assert_eq!(json["error"], "INVALID_ID");
    }

    #[test]
    fn test_list_envelope_carries_total_and_pagination() {
        let response = list(vec!["a", "b"], 12, Pagination::new(2, 2, 12));
        let json = body_json(response);
        assert_eq!(json["success"], true);
        assert_eq!(json["total"], 12);
        assert_eq!(json["pagination"]["page"], 2);
        assert_eq!(json["pagination"]["totalPages"], 6);
    }

    #[test]
    fn test_db_unavailable_is_503() {
        assert_eq!(
            db_unavailable().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_pagination_rounds_up() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 1).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
    }
}
