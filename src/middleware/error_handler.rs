use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

use crate::cache::entry::CACHE_HEADER;

/// 把服务端错误响应体记进日志，再原样还给客户端
///
/// 503 的离线兜底信封是预期内的软失败，降到 debug 级别，
/// 免得断网期间日志被刷满。
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let expected_fallback = response.status() == StatusCode::SERVICE_UNAVAILABLE
        || response.headers().contains_key(CACHE_HEADER);

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, 1024).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to read error response body: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };
    let body_str = String::from_utf8_lossy(&bytes);

    if expected_fallback {
        debug!("Fallback served - Status: {}, Body: {}", parts.status, body_str);
    } else {
        error!(
            "Server error occurred - Status: {}, Body: {}",
            parts.status, body_str
        );
    }

    // 重置body以便重新构建响应
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
