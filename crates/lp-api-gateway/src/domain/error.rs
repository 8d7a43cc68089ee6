//! Gateway error types and their HTTP rendering.
//!
//! Every error body is `{"message": "..."}` with the user-facing Vietnamese
//! text the public page displays verbatim.

use std::fmt;
use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use lp_pool_engine::{ClaimError, RejectReason};
use serde::Serialize;

/// User-facing messages
pub mod messages {
    pub const ORIGIN_ALREADY_USED: &str = "Mỗi IP chỉ được nhận lì xì một lần!";
    pub const POOL_EXHAUSTED: &str = "Đã hết lì xì! Chúc bạn may mắn lần sau!";
    pub const IDENTITY_ALREADY_CLAIMED: &str = "Bạn đã nhận lì xì rồi!";
    pub const MISSING_FIELDS: &str = "Vui lòng nhập đầy đủ tên, số tài khoản và ngân hàng!";
    pub const INVALID_BODY: &str = "Dữ liệu gửi lên không hợp lệ!";
    pub const PERSISTENCE_FAILURE: &str = "Không thể ghi nhận lì xì, vui lòng thử lại sau!";
    pub const INTERNAL: &str = "Lỗi máy chủ, vui lòng thử lại sau!";
    pub const GLOBAL_RATE_LIMITED: &str =
        "Quá nhiều yêu cầu từ IP của bạn, vui lòng thử lại sau 15 phút!";
    pub const CLAIM_RATE_LIMITED: &str = "Vui lòng đợi 1 phút trước khi thử lại!";
    pub const SUCCESS: &str = "Chúc mừng năm mới!";
}

/// Error returned by a handler or middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Seconds, for 429 responses
    pub retry_after: Option<u64>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, messages::INTERNAL)
    }

    /// A claim turned away by the engine.
    pub fn rejected(reason: RejectReason) -> Self {
        let message = match reason {
            RejectReason::OriginAlreadyUsed => messages::ORIGIN_ALREADY_USED,
            RejectReason::PoolExhausted => messages::POOL_EXHAUSTED,
            RejectReason::IdentityAlreadyClaimed => messages::IDENTITY_ALREADY_CLAIMED,
        };
        Self::bad_request(message)
    }

    pub fn rate_limited(message: &str, retry_after: Duration) -> Self {
        // Whole seconds, rounded up
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: message.to_string(),
            retry_after: Some(secs.max(1)),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Rejected(reason) => ApiError::rejected(reason),
            ClaimError::Persistence(_) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, messages::PERSISTENCE_FAILURE)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ErrorBody {
                message: &self.message,
            }),
        )
            .into_response();

        if let Some(secs) = self.retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (startup and serving, not per request)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    /// Server socket bind error
    #[error("server bind error on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
