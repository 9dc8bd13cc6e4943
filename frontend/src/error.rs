//! 错误类型模块
//!
//! 分层定义：
//! - `AuthError`: 登录/注册失败，按 HTTP 状态码分类
//! - `ApiError`: 业务数据请求失败
//! - `AppError`: 页面层统一的错误分类，负责生成展示给用户的文案
//!
//! 所有错误都可恢复，页面只展示文案，不会让应用崩溃。

use crate::validation::ValidationErrors;
use crate::web::http::{HttpError, HttpResponse};

/// 无法识别的错误统一使用的文案
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

// =========================================================
// AuthError
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// 没有拿到任何 HTTP 状态码
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    /// 400 / 401
    #[error("invalid credentials (status {0})")]
    InvalidCredentials(u16),
    /// 403
    #[error("account not activated")]
    AccountNotActivated,
    /// 404
    #[error("user not found")]
    UserNotFound,
    /// 5xx
    #[error("server error (status {0})")]
    ServerError(u16),
    /// 其他非 2xx 状态码
    #[error("unexpected status {0}")]
    Unexpected(u16),
    /// 2xx 但缺少 token 或用户信息
    #[error("malformed auth response: {0}")]
    MalformedResponse(String),
    /// 本地存储不可写，凭据无法保存
    #[error("token storage unavailable")]
    StorageUnavailable,
    /// 请求返回前已有更新的登录尝试
    #[error("superseded by a newer attempt")]
    Superseded,
}

impl AuthError {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 401 => Self::InvalidCredentials(status),
            403 => Self::AccountNotActivated,
            404 => Self::UserNotFound,
            500..=599 => Self::ServerError(status),
            _ => Self::Unexpected(status),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NetworkUnreachable(_) => {
                "Unable to reach the server. Check your connection and try again."
            }
            Self::InvalidCredentials(_) => "Invalid username or password.",
            Self::AccountNotActivated => {
                "Your account has not been activated yet. Please contact your administrator."
            }
            Self::UserNotFound => "No account was found for that username.",
            Self::ServerError(_) => "The server ran into a problem. Please try again later.",
            Self::StorageUnavailable => {
                "Your browser blocked local storage. Enable it to stay signed in."
            }
            Self::Superseded => "A newer sign-in attempt replaced this one.",
            Self::Unexpected(_) | Self::MalformedResponse(_) => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl From<HttpError> for AuthError {
    fn from(e: HttpError) -> Self {
        Self::NetworkUnreachable(e.to_string())
    }
}

// =========================================================
// ApiError
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("server error (status {status})")]
    Server { status: u16 },
    #[error("request rejected (status {status})")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// 将非 2xx 响应映射为错误
    pub fn from_response(resp: &HttpResponse) -> Self {
        match resp.status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500..=599 => Self::Server {
                status: resp.status,
            },
            status => Self::Rejected {
                status,
                message: resp.error_message(),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::Server { status } | Self::Rejected { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) | Self::Encode(_) => None,
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        Self::Network(e.to_string())
    }
}

// =========================================================
// AppError
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// 表单校验失败，从不发出请求
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Authentication(#[from] AuthError),
    #[error("access denied")]
    Authorization,
    #[error("network error: {0}")]
    Network(String),
    #[error("server error (status {0})")]
    Server(u16),
    #[error(transparent)]
    Request(ApiError),
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Network(msg) => Self::Network(msg),
            ApiError::Server { status } => Self::Server(status),
            ApiError::Forbidden => Self::Authorization,
            other => Self::Request(other),
        }
    }
}

impl AppError {
    /// 展示给用户的文案
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors
                .first_message()
                .unwrap_or("Please correct the highlighted fields.")
                .to_string(),
            Self::Authentication(e) => e.user_message().to_string(),
            Self::Authorization => "You do not have permission to do that.".to_string(),
            Self::Network(_) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            Self::Server(_) => GENERIC_ERROR_MESSAGE.to_string(),
            Self::Request(ApiError::Unauthorized) => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::Request(ApiError::NotFound) => "The requested record was not found.".to_string(),
            Self::Request(ApiError::Rejected {
                message: Some(message),
                ..
            }) => message.clone(),
            Self::Request(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// 是否应当提示重新登录
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Request(ApiError::Unauthorized))
    }
}
