use reqwest::{Method, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Server { status: StatusCode, message: String },

    /// A success status with a body that is not the expected JSON.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Text suitable for a user-facing notification.
    pub fn message(&self) -> String {
        match self {
            Self::Network(_) => "서버에 연결할 수 없습니다.".to_string(),
            Self::Server { message, .. } => message.clone(),
            Self::Decode(_) => "응답을 해석할 수 없습니다.".to_string(),
            Self::Config(msg) => msg.clone(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Message used when a failed response carries no `message` field.
pub fn fallback_message(method: &Method) -> &'static str {
    match *method {
        Method::GET => "불러오기 실패",
        Method::PUT => "수정 실패",
        Method::DELETE => "삭제 실패",
        _ => "요청 실패",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_per_method() {
        assert_eq!(fallback_message(&Method::GET), "불러오기 실패");
        assert_eq!(fallback_message(&Method::POST), "요청 실패");
        assert_eq!(fallback_message(&Method::PUT), "수정 실패");
        assert_eq!(fallback_message(&Method::DELETE), "삭제 실패");
    }

    #[test]
    fn server_error_message_is_the_body_message() {
        let err = ClientError::Server {
            status: StatusCode::FORBIDDEN,
            message: "권한 없음".into(),
        };
        assert_eq!(err.message(), "권한 없음");
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    }
}
