//! 离线兜底
//!
//! 网络与缓存双双落空时的最后出口：API 调用给 503 JSON 信封，
//! 导航给离线页（已知前端路由给根文档），静态资源给占位图。
//! 兜底资源优先取外壳分区里安装时写入的版本，连外壳都没有时
//! 退回内置的最小离线页/占位图，软失败的承诺不因此打折。

use axum::{
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::cache::{CacheStore, keys};
use crate::classify::{Decision, FallbackPlan};
use crate::config::Config;
use crate::error::GatewayError;
use crate::shell;
use reqwest::Url;

/// 内置的最小离线页
const BUILTIN_OFFLINE_HTML: &str = "<!doctype html>\
<html lang=\"zh\"><head><meta charset=\"utf-8\"><title>当前离线</title></head>\
<body><h1>当前处于离线状态</h1><p>网络恢复后刷新页面即可继续浏览。</p></body></html>";

/// 内置的占位图（单色 SVG）
const BUILTIN_PLACEHOLDER_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" \
width=\"400\" height=\"300\"><rect width=\"100%\" height=\"100%\" fill=\"#e5e7eb\"/></svg>";

/// 503 JSON 错误信封，给程序化调用方
pub fn service_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::envelope("服务暂时不可用，请检查网络后重试"),
    )
        .into_response()
}

/// 从外壳分区取安装时写入的资源
async fn shell_entry(store: &CacheStore, config: &Config, base: &Url, path: &str) -> Option<Response> {
    let url = base.join(path).ok()?;
    let key = keys::request_key(&Method::GET, &url);
    match store.get(&config.shell_partition(), &key).await {
        Ok(Some(entry)) => Some(entry.into_response("fallback")),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("shell fallback lookup failed for {}: {}", path, e);
            None
        }
    }
}

async fn offline_page(store: &CacheStore, config: &Config, base: &Url) -> Response {
    match shell_entry(store, config, base, shell::OFFLINE_PAGE_PATH).await {
        Some(response) => response,
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            BUILTIN_OFFLINE_HTML,
        )
            .into_response(),
    }
}

async fn root_document(store: &CacheStore, config: &Config, base: &Url) -> Response {
    match shell_entry(store, config, base, shell::ROOT_DOCUMENT_PATH).await {
        Some(response) => response,
        // 根文档也没有时只能给离线页
        None => offline_page(store, config, base).await,
    }
}

async fn placeholder_image(store: &CacheStore, config: &Config, base: &Url) -> Response {
    match shell_entry(store, config, base, shell::PLACEHOLDER_IMAGE_PATH).await {
        Some(response) => response,
        None => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/svg+xml")],
            BUILTIN_PLACEHOLDER_SVG,
        )
            .into_response(),
    }
}

/// 按分类结论挑选兜底响应
pub async fn resolve(
    store: &CacheStore,
    config: &Config,
    base: &Url,
    decision: &Decision,
    partition: &str,
    key: &str,
) -> Response {
    match decision.fallback {
        FallbackPlan::ApiEnvelope { navigation: false } => service_unavailable(),
        FallbackPlan::ApiEnvelope { navigation: true } => offline_page(store, config, base).await,
        FallbackPlan::Navigation { client_route: true } => root_document(store, config, base).await,
        FallbackPlan::Navigation { client_route: false } => offline_page(store, config, base).await,
        FallbackPlan::PlaceholderImage => placeholder_image(store, config, base).await,
        FallbackPlan::CachedOrOffline => {
            // 本请求有任意缓存副本就用它，否则离线页
            match store.get(partition, key).await {
                Ok(Some(entry)) => entry.into_response("fallback"),
                _ => offline_page(store, config, base).await,
            }
        }
    }
}

/// 兜底响应体是 JSON 错误信封时的反序列化形状，测试用
#[derive(Debug, serde::Deserialize)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
}
