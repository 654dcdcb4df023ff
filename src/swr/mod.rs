//! 陈旧可用、后台刷新的回源引擎
//!
//! 命中缓存立即返回（新鲜与否都返回），陈旧命中顺带触发一次
//! 后台刷新；首次请求没有可陈旧返回的数据，阻塞等网络。
//! 缓存写入尽力而为，永远不挡住应答路径。

pub mod upstream;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::http::{Method, Uri};
use axum::response::Response;
use reqwest::Url;
use tokio::sync::broadcast;

use crate::cache::{CacheEntry, CacheStore, keys, now_ms};
use crate::classify::{self, Decision, RequestClass};
use crate::config::Config;
use crate::error::GatewayError;
use crate::fallback;
use crate::messaging::{ConnectivityStatus, WorkerMessage};

pub use upstream::Upstream;

#[derive(Clone)]
pub struct Engine {
    config: Arc<Config>,
    base: Url,
    store: CacheStore,
    upstream: Upstream,
    online: Arc<AtomicBool>,
    events: broadcast::Sender<WorkerMessage>,
}

impl Engine {
    pub fn new(
        config: Arc<Config>,
        store: CacheStore,
        events: broadcast::Sender<WorkerMessage>,
    ) -> Result<Self, GatewayError> {
        let base = Url::parse(&config.upstream_url)
            .map_err(|_| GatewayError::BadTarget(config.upstream_url.clone()))?;
        let upstream = Upstream::new(&config)?;

        Ok(Engine {
            config,
            base,
            store,
            upstream,
            online: Arc::new(AtomicBool::new(true)),
            events,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// 把拦截到的请求行还原成绝对目标地址
    ///
    /// 代理形式的绝对 URI 原样解析（跨域请求走这条路），
    /// 普通的路径形式拼到上游地址上。
    pub fn resolve_target(&self, uri: &Uri) -> Result<Url, GatewayError> {
        if uri.authority().is_some() {
            return Url::parse(&uri.to_string())
                .map_err(|_| GatewayError::BadTarget(uri.to_string()));
        }
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        self.base
            .join(path_and_query)
            .map_err(|_| GatewayError::BadTarget(uri.to_string()))
    }

    /// 引擎入口：分类、查缓存、回源、兜底
    pub async fn serve(
        &self,
        method: Method,
        target: Url,
        accept: Option<&str>,
        body: Vec<u8>,
    ) -> Response {
        let decision = classify::classify(&method, &target, accept, &self.base, &self.config);

        // 非 GET 与绕过类不进缓存
        if method != Method::GET || decision.class == RequestClass::Bypass {
            return self.network_only(method, target, body, &decision).await;
        }

        let partition = decision.partition.name(&self.config);
        let key = keys::request_key(&method, &target);

        let cached = match self.store.get(&partition, &key).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("cache lookup failed for {}: {}", key, e);
                None
            }
        };

        match cached {
            Some(entry) => {
                let fresh = entry.is_fresh(now_ms());
                if !fresh {
                    // 陈旧命中：立即返回旧数据，后台刷新，刷新失败吞掉
                    let engine = self.clone();
                    let target = target.clone();
                    let partition = partition.clone();
                    let key = key.clone();
                    let ttl = decision.ttl;
                    tokio::spawn(async move {
                        if let Err(e) = engine.refresh(target, &partition, &key, ttl).await {
                            tracing::debug!("background revalidation failed for {}: {}", key, e);
                        }
                    });
                }
                entry.into_response(if fresh { "hit" } else { "stale" })
            }
            None => match self.refresh(target.clone(), &partition, &key, decision.ttl).await {
                Ok(entry) => entry.into_response("miss"),
                Err(e) => {
                    tracing::warn!("upstream fetch failed for {}: {}", target, e);
                    fallback::resolve(&self.store, &self.config, &self.base, &decision, &partition, &key)
                        .await
                }
            },
        }
    }

    /// 回源一次并在成功时写缓存（覆盖同键旧记录）
    async fn refresh(
        &self,
        target: Url,
        partition: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<CacheEntry, GatewayError> {
        let response = match self.upstream.get(target).await {
            Ok(response) => {
                self.note_connectivity(true);
                response
            }
            Err(e) => {
                self.note_connectivity(false);
                return Err(e.into());
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(GatewayError::Upstream)?;
        let entry = CacheEntry::capture(status.as_u16(), &headers, body.to_vec(), ttl);

        // 只缓存成功响应；写失败不影响应答
        if status.is_success() {
            if let Err(e) = self.store.put(partition, key, &entry).await {
                tracing::warn!("cache write failed for {}: {}", key, e);
            }
        }

        Ok(entry)
    }

    /// 纯透传路径，失败时仍按分类结论兜底
    async fn network_only(
        &self,
        method: Method,
        target: Url,
        body: Vec<u8>,
        decision: &Decision,
    ) -> Response {
        let key = keys::request_key(&method, &target);
        match self.upstream.send(method, target.clone(), body).await {
            Ok(response) => {
                self.note_connectivity(true);
                let status = response.status();
                let headers = response.headers().clone();
                match response.bytes().await {
                    Ok(bytes) => {
                        CacheEntry::capture(status.as_u16(), &headers, bytes.to_vec(), Duration::ZERO)
                            .into_response("bypass")
                    }
                    Err(e) => {
                        tracing::warn!("upstream body read failed for {}: {}", target, e);
                        fallback::service_unavailable()
                    }
                }
            }
            Err(e) => {
                self.note_connectivity(false);
                tracing::warn!("passthrough fetch failed for {}: {}", target, e);
                let partition = decision.partition.name(&self.config);
                fallback::resolve(&self.store, &self.config, &self.base, decision, &partition, &key)
                    .await
            }
        }
    }

    /// 安装阶段预取一个外壳资源，任何失败都让整个安装失败
    pub async fn prime(&self, path: &str) -> Result<(), GatewayError> {
        let url = self
            .base
            .join(path)
            .map_err(|_| GatewayError::InstallFailed(path.to_string()))?;

        let response = self
            .upstream
            .get(url.clone())
            .await
            .map_err(|_| GatewayError::InstallFailed(path.to_string()))?;
        if !response.status().is_success() {
            return Err(GatewayError::InstallFailed(path.to_string()));
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|_| GatewayError::InstallFailed(path.to_string()))?;

        let entry = CacheEntry::capture(status.as_u16(), &headers, body.to_vec(), self.config.shell_ttl());
        let key = keys::request_key(&Method::GET, &url);
        self.store
            .put(&self.config.shell_partition(), &key, &entry)
            .await?;

        Ok(())
    }

    /// 主动探测连通性并把结果回报给调用页面
    pub async fn probe_connectivity(&self) -> ConnectivityStatus {
        let online = self.upstream.probe(self.base.clone()).await;
        self.note_connectivity(online);
        ConnectivityStatus::from(online)
    }

    /// 状态翻转时广播给所有受控页面，无人监听是静默空操作
    fn note_connectivity(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            let status = ConnectivityStatus::from(online);
            tracing::info!("connectivity changed: {:?}", status);
            let _ = self
                .events
                .send(WorkerMessage::ConnectivityChange { status });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_engine() -> Engine {
        let config = Arc::new(Config {
            upstream_url: "https://voyage.example".into(),
            redis_url: "redis://localhost".into(),
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            worker_base: "/_worker".into(),
            cache_version: "v1".into(),
            shell_ttl_secs: 86400,
            dynamic_ttl_secs: 3600,
            api_ttl_secs: 300,
            upstream_timeout_secs: 10,
            external_api_hosts: vec![],
        });
        let (events, _) = broadcast::channel(8);
        Engine::new(config, CacheStore::memory(), events).unwrap()
    }

    #[test]
    fn relative_target_joins_upstream_base() {
        let engine = test_engine();
        let uri: Uri = "/destinations?page=2".parse().unwrap();
        assert_eq!(
            engine.resolve_target(&uri).unwrap().as_str(),
            "https://voyage.example/destinations?page=2"
        );
    }

    #[test]
    fn absolute_target_is_kept_as_is() {
        let engine = test_engine();
        let uri: Uri = "https://images.unsplash.com/photo-1".parse().unwrap();
        assert_eq!(
            engine.resolve_target(&uri).unwrap().as_str(),
            "https://images.unsplash.com/photo-1"
        );
    }

    #[test]
    fn connectivity_transition_broadcasts_once() {
        let engine = test_engine();
        let mut rx = engine.events.subscribe();

        engine.note_connectivity(true); // 已在线，无广播
        engine.note_connectivity(false);
        engine.note_connectivity(false); // 状态未变，无广播

        let msg = rx.try_recv().unwrap();
        assert_eq!(
            msg,
            WorkerMessage::ConnectivityChange {
                status: ConnectivityStatus::Offline
            }
        );
        assert!(rx.try_recv().is_err());
    }
}
