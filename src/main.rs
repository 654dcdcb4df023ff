use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voyage_gateway::{
    AppState,
    cache::{CacheStore, redis::RedisStore},
    config::Config,
    lifecycle::Lifecycle,
    messaging::ClientRegistry,
    swr::Engine,
};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置 Redis 分区存储
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let store = CacheStore::Redis(RedisStore::new(Arc::new(redis_client)));

    // 广播通道：在线状态翻转推给所有受控页面
    let (events, _) = broadcast::channel(64);

    let config = Arc::new(config);
    let engine = Arc::new(
        Engine::new(config.clone(), store, events.clone()).expect("Failed to build cache engine"),
    );

    // 安装外壳缓存并激活；清单里任何一项失败都拒绝上线
    let mut lifecycle = Lifecycle::new();
    lifecycle
        .install(&engine)
        .await
        .expect("Shell install failed, refusing to start with a partial shell");
    lifecycle
        .activate(&engine)
        .await
        .expect("Activation failed");

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        engine,
        registry: Arc::new(ClientRegistry::new()),
        events,
    };

    let router = voyage_gateway::app(state.clone());

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Gateway listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
