use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// 缓存存储层错误
#[derive(Debug)]
pub enum CacheError {
    Redis(redis::RedisError),
    Codec(serde_json::Error),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Redis(e) => write!(f, "redis error: {}", e),
            CacheError::Codec(e) => write!(f, "codec error: {}", e),
        }
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Redis(e)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Codec(e)
    }
}

#[derive(Debug)]
pub enum GatewayError {
    /// 安装阶段外壳资源拉取失败，携带出错的路径
    InstallFailed(String),
    Upstream(reqwest::Error),
    Cache(CacheError),
    BadTarget(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::InstallFailed(path) => write!(f, "shell install failed at {}", path),
            GatewayError::Upstream(e) => write!(f, "upstream error: {}", e),
            GatewayError::Cache(e) => write!(f, "cache error: {}", e),
            GatewayError::BadTarget(t) => write!(f, "bad request target: {}", t),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Upstream(e)
    }
}

impl From<CacheError> for GatewayError {
    fn from(e: CacheError) -> Self {
        GatewayError::Cache(e)
    }
}

/// 统一的失败响应体，程序化调用方依赖这个形状
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub error: bool,
    pub message: String,
}

impl GatewayError {
    pub fn envelope(message: &str) -> Json<ErrorEnvelope> {
        Json(ErrorEnvelope {
            error: true,
            message: message.to_string(),
        })
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::InstallFailed(_) | GatewayError::Cache(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "内部服务器错误")
            }
            GatewayError::Upstream(_) => (StatusCode::SERVICE_UNAVAILABLE, "服务暂时不可用"),
            GatewayError::BadTarget(_) => (StatusCode::BAD_REQUEST, "请求目标无效"),
        };
        tracing::warn!("request failed: {}", self);
        (status, Self::envelope(message)).into_response()
    }
}
