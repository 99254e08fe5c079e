use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClockifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: invalid API key or insufficient permissions")]
    Unauthorized,

    #[error("Unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClockifyError>;

impl ClockifyError {
    /// 再試行で回復する可能性のあるエラーかどうかを返す。
    ///
    /// タイムアウト・接続エラー・429・5xx のみが対象。
    pub fn is_retryable(&self) -> bool {
        match self {
            ClockifyError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ClockifyError::Status { status, .. } => is_retryable_status(*status),
            ClockifyError::Unauthorized | ClockifyError::Decode(_) => false,
        }
    }
}

pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
