//! 缓存键的构造规则
//!
//! 请求身份 = 方法 + 完整 URL；Redis 里再加分区前缀，
//! 并为每个分区维护一个成员集合用于激活阶段的整分区清除。

use axum::http::Method;
use reqwest::Url;

/// 请求身份键
pub fn request_key(method: &Method, url: &Url) -> String {
    format!("{} {}", method, url)
}

/// 某条记录在 Redis 中的键
pub fn entry_key(partition: &str, key: &str) -> String {
    format!("voyage:cache:{}:{}", partition, key)
}

/// 分区的成员集合键
pub fn members_key(partition: &str) -> String {
    format!("voyage:cache:{}:__members", partition)
}

/// 全部已知分区的集合键
pub const PARTITIONS_KEY: &str = "voyage:cache:partitions";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_key_includes_method_and_url() {
        let url = Url::parse("https://voyage.example/destinations?page=2").unwrap();
        assert_eq!(
            request_key(&Method::GET, &url),
            "GET https://voyage.example/destinations?page=2"
        );
    }
}
