//! 应用外壳清单与路径规则
//!
//! 这里集中维护离线可用所需的固定资源列表，以及请求分类用的
//! 路径标记（API 前缀、静态资源扩展名、前端路由表）。

/// 外壳清单：安装阶段预取并写入外壳分区的固定资源
/// 任何一项拉取失败都会导致整个安装失败，不允许残缺外壳
pub const SHELL_MANIFEST: &[&str] = &[
    "/",
    "/offline.html",
    "/manifest.json",
    "/favicon.ico",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
    "/images/placeholder.png",
    "/assets/app.js",
    "/assets/app.css",
    "/destinations",
    "/packages",
    "/blog",
    "/about",
    "/contact",
];

/// 前端路由表：这些路径由页面内路由渲染，
/// 导航失败时回退到缓存的根文档而不是离线页
pub const CLIENT_ROUTES: &[&str] = &[
    "/",
    "/destinations",
    "/packages",
    "/blog",
    "/about",
    "/contact",
];

/// 离线页与占位图在外壳清单中的路径
pub const OFFLINE_PAGE_PATH: &str = "/offline.html";
pub const PLACEHOLDER_IMAGE_PATH: &str = "/images/placeholder.png";
pub const ROOT_DOCUMENT_PATH: &str = "/";

/// API 路径标记段，托管后端的表/认证/存储/函数接口
pub const API_MARKERS: &[&str] = &["/rest/v1", "/auth/v1", "/storage/v1", "/functions/v1", "/api/"];

/// 内置的外部主机白名单（字体与图片 CDN）
pub const EXTERNAL_HOST_WHITELIST: &[&str] = &[
    "fonts.googleapis.com",
    "fonts.gstatic.com",
    "images.unsplash.com",
];

/// 静态资源扩展名集合
pub const STATIC_EXTENSIONS: &[&str] = &[
    "js", "css", "png", "jpg", "jpeg", "svg", "gif", "webp", "ico", "woff", "woff2", "ttf",
    "json", "map",
];

/// 路径是否命中静态资源扩展名
pub fn is_static_asset(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| STATIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// 路径是否为已知的前端路由
pub fn is_client_route(path: &str) -> bool {
    let trimmed = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    CLIENT_ROUTES.contains(&trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_extension_matching() {
        assert!(is_static_asset("/assets/app.js"));
        assert!(is_static_asset("/images/bali.JPG"));
        assert!(!is_static_asset("/destinations"));
        assert!(!is_static_asset("/"));
    }

    #[test]
    fn client_route_matching() {
        assert!(is_client_route("/"));
        assert!(is_client_route("/destinations"));
        assert!(is_client_route("/destinations/"));
        assert!(!is_client_route("/admin"));
    }

    #[test]
    fn manifest_covers_fallback_assets() {
        assert!(SHELL_MANIFEST.contains(&OFFLINE_PAGE_PATH));
        assert!(SHELL_MANIFEST.contains(&PLACEHOLDER_IMAGE_PATH));
        assert!(SHELL_MANIFEST.contains(&ROOT_DOCUMENT_PATH));
    }
}
