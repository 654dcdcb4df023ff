use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde::{Deserialize, Serialize};

/// 缓存命中状态，写回响应头便于排查
pub const CACHE_HEADER: &str = "x-cache";
/// 捕获时间戳与有效期，毫秒整数的字符串编码
pub const CAPTURED_AT_HEADER: &str = "x-cache-captured-at";
pub const TTL_HEADER: &str = "x-cache-ttl";

/// 逐跳头不进缓存，正文长度由框架重新计算
const SKIPPED_HEADERS: &[&str] = &["connection", "keep-alive", "transfer-encoding", "content-length"];

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 缓存记录：完整响应加捕获时间与有效期
///
/// 浏览器缓存里只能靠往克隆响应上注头来伪造 TTL 元数据，
/// 这里直接落成显式字段，新鲜度判断不再依赖头解析。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub captured_at_ms: i64,
    pub ttl_ms: i64,
}

impl CacheEntry {
    /// 从上游响应的各部分捕获一条记录
    pub fn capture(status: u16, headers: &HeaderMap, body: Vec<u8>, ttl: Duration) -> Self {
        let headers = headers
            .iter()
            .filter(|(name, _)| !SKIPPED_HEADERS.contains(&name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        CacheEntry {
            status,
            headers,
            body,
            captured_at_ms: now_ms(),
            ttl_ms: ttl.as_millis() as i64,
        }
    }

    /// 当前时间减捕获时间小于有效期视为新鲜
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms - self.captured_at_ms < self.ttl_ms
    }

    /// 还原成 HTTP 响应，附带缓存元数据头
    pub fn into_response(self, disposition: &str) -> Response {
        let mut builder = Response::builder().status(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        );
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        builder = builder
            .header(CACHE_HEADER, disposition)
            .header(CAPTURED_AT_HEADER, self.captured_at_ms.to_string())
            .header(TTL_HEADER, self.ttl_ms.to_string());

        match builder.body(Body::from(self.body)) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("failed to rebuild cached response: {}", e);
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(captured_at_ms: i64, ttl_ms: i64) -> CacheEntry {
        CacheEntry {
            status: 200,
            headers: vec![("content-type".into(), "text/html".into())],
            body: b"<html></html>".to_vec(),
            captured_at_ms,
            ttl_ms,
        }
    }

    #[test]
    fn freshness_window() {
        let e = entry(1_000, 500);
        assert!(e.is_fresh(1_200));
        assert!(!e.is_fresh(1_500));
        assert!(!e.is_fresh(2_000));
    }

    #[test]
    fn capture_strips_hop_by_hop_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "image/png".parse().unwrap());
        headers.insert("transfer-encoding", "chunked".parse().unwrap());
        headers.insert("content-length", "4".parse().unwrap());

        let e = CacheEntry::capture(200, &headers, vec![1, 2, 3, 4], Duration::from_secs(60));
        assert_eq!(e.headers, vec![("content-type".to_string(), "image/png".to_string())]);
        assert_eq!(e.ttl_ms, 60_000);
        assert!(e.is_fresh(now_ms()));
    }

    #[test]
    fn response_carries_metadata_headers() {
        let resp = entry(1_000, 500).into_response("stale");
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[CACHE_HEADER], "stale");
        assert_eq!(resp.headers()[CAPTURED_AT_HEADER], "1000");
        assert_eq!(resp.headers()[TTL_HEADER], "500");
    }
}
