use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::AppState;

/// 透传请求体的上限，超过的直接拒绝缓存层处理
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// 兜底路由：所有被拦截的站点请求都从这里进引擎
#[axum::debug_handler]
pub async fn serve(State(state): State<AppState>, req: Request<Body>) -> Response {
    let (parts, body) = req.into_parts();

    let accept = parts
        .headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    let target = match state.engine.resolve_target(&parts.uri) {
        Ok(target) => target,
        Err(e) => return e.into_response(),
    };

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!("failed to buffer request body: {}", e);
            return crate::error::GatewayError::BadTarget(parts.uri.to_string()).into_response();
        }
    };

    state
        .engine
        .serve(parts.method, target, accept.as_deref(), body)
        .await
}
