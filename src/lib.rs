use std::sync::Arc;

use axum::{
    Router,
    routing::{any, get, post},
};
use tokio::sync::broadcast;

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod fallback;
pub mod lifecycle;
pub mod messaging;
pub mod middleware;
pub mod routes;
pub mod shell;
pub mod swr;

use config::Config;
use messaging::{ClientRegistry, WorkerMessage};
use swr::Engine;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<Engine>,
    pub registry: Arc<ClientRegistry>,
    pub events: broadcast::Sender<WorkerMessage>,
}

/// 组装路由：控制通道挂在 worker_base 下，其余请求全部进引擎
pub fn app(state: AppState) -> Router {
    let worker_routes = Router::new()
        .route("/message", post(routes::worker::handler::post_message))
        .route("/push", post(routes::worker::handler::push))
        .route("/notification-click", post(routes::worker::handler::notification_click))
        .route("/events", get(routes::worker::handler::events));

    Router::new()
        .nest(state.config.worker_base.as_str(), worker_routes)
        .route("/", any(routes::fetch::handler::serve))
        .route("/{*path}", any(routes::fetch::handler::serve))
        .layer(axum::middleware::from_fn(middleware::log_errors))
        .with_state(state)
}
