use axum::http::Method;
use reqwest::{Client, Response, Url};

use crate::config::Config;

/// 上游访问封装
///
/// 网关眼里托管后端只是一个不透明的 HTTP 源，超时交给客户端配置，
/// 不做重试，失败语义由调用方决定。
#[derive(Clone)]
pub struct Upstream {
    client: Client,
}

impl Upstream {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.upstream_timeout()).build()?;
        Ok(Self { client })
    }

    pub async fn get(&self, url: Url) -> Result<Response, reqwest::Error> {
        self.client.get(url).send().await
    }

    /// 透传任意方法与请求体，非 GET 请求不进缓存
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        body: Vec<u8>,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self.client.request(method, url);
        if !body.is_empty() {
            request = request.body(body);
        }
        request.send().await
    }

    /// 连通性探测：绕过所有缓存直打上游
    pub async fn probe(&self, base: Url) -> bool {
        match self
            .client
            .get(base)
            .header("cache-control", "no-cache")
            .send()
            .await
        {
            Ok(response) => !response.status().is_server_error(),
            Err(_) => false,
        }
    }
}
