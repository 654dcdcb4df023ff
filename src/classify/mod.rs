//! 请求分类器
//!
//! 对每个被拦截的请求判定：走哪个缓存分区、新鲜度窗口多长、
//! 彻底失败时用哪种兜底。规则按序匹配，先中先得。
//! 跨域判定排在 API 判定之前，所以指向白名单 API 主机的跨域导航
//! 不会得到导航兜底，这是有意保留的行为（API 不产出 HTML）。

use std::time::Duration;

use axum::http::Method;
use reqwest::Url;

use crate::config::Config;
use crate::shell;

/// 请求类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Api,
    Navigation,
    StaticAsset,
    Default,
    /// 跨域且不在白名单内，完全绕过缓存
    Bypass,
}

/// 缓存分区
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Shell,
    Dynamic,
}

impl Partition {
    pub fn name(&self, config: &Config) -> String {
        match self {
            Partition::Shell => config.shell_partition(),
            Partition::Dynamic => config.dynamic_partition(),
        }
    }
}

/// 彻底失败（无缓存且网络不可达）时的兜底方案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPlan {
    /// 503 JSON 错误信封；导航型 API 请求改用离线页
    ApiEnvelope { navigation: bool },
    /// 离线页；已知前端路由改用缓存的根文档
    Navigation { client_route: bool },
    /// 缓存的占位图
    PlaceholderImage,
    /// 本请求的任意缓存副本，否则离线页
    CachedOrOffline,
}

/// 分类结论
#[derive(Debug, Clone)]
pub struct Decision {
    pub class: RequestClass,
    pub partition: Partition,
    pub ttl: Duration,
    pub fallback: FallbackPlan,
}

/// URL 是否命中 API 规则：路径含标记段，或主机名以 api. 开头
fn is_api_url(url: &Url) -> bool {
    if shell::API_MARKERS.iter().any(|m| url.path().contains(m)) {
        return true;
    }
    url.host_str().is_some_and(|h| h.starts_with("api."))
}

/// 外部主机是否在白名单内（内置 CDN 列表 + 配置追加）
fn is_whitelisted_host(url: &Url, config: &Config) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    shell::EXTERNAL_HOST_WHITELIST.contains(&host)
        || config.external_api_hosts.iter().any(|h| h == host)
}

fn same_origin(url: &Url, upstream: &Url) -> bool {
    url.host_str() == upstream.host_str()
        && url.port_or_known_default() == upstream.port_or_known_default()
        && url.scheme() == upstream.scheme()
}

/// 规则按序评估，与线上行为一一对应
pub fn classify(
    method: &Method,
    url: &Url,
    accept: Option<&str>,
    upstream: &Url,
    config: &Config,
) -> Decision {
    let navigation = *method == Method::GET
        && accept.is_some_and(|a| a.contains("text/html"));

    // 规则 1：跨域请求
    if !same_origin(url, upstream) {
        if is_api_url(url) || is_whitelisted_host(url, config) {
            return Decision {
                class: RequestClass::Default,
                partition: Partition::Dynamic,
                ttl: config.dynamic_ttl(),
                fallback: FallbackPlan::CachedOrOffline,
            };
        }
        return Decision {
            class: RequestClass::Bypass,
            partition: Partition::Dynamic,
            ttl: Duration::ZERO,
            fallback: FallbackPlan::ApiEnvelope { navigation },
        };
    }

    // 规则 2：同源 API
    if is_api_url(url) {
        return Decision {
            class: RequestClass::Api,
            partition: Partition::Dynamic,
            ttl: config.api_ttl(),
            fallback: FallbackPlan::ApiEnvelope { navigation },
        };
    }

    // 规则 3：页面导航
    if navigation {
        return Decision {
            class: RequestClass::Navigation,
            partition: Partition::Shell,
            ttl: config.shell_ttl(),
            fallback: FallbackPlan::Navigation {
                client_route: shell::is_client_route(url.path()),
            },
        };
    }

    // 规则 4：静态资源
    if shell::is_static_asset(url.path()) {
        return Decision {
            class: RequestClass::StaticAsset,
            partition: Partition::Shell,
            ttl: config.shell_ttl(),
            fallback: FallbackPlan::PlaceholderImage,
        };
    }

    // 规则 5：其余请求
    Decision {
        class: RequestClass::Default,
        partition: Partition::Dynamic,
        ttl: config.dynamic_ttl(),
        fallback: FallbackPlan::CachedOrOffline,
    }
}
