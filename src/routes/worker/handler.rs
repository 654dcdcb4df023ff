use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    Json,
};
use futures_util::Stream;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::AppState;
use crate::messaging::{ClickOutcome, ClientRegistry, Notification, PageMessage, WorkerMessage};

use super::model::{ClickRequest, ClickResponse, EventsQuery};

/// 页面到网关的消息通道；连通性探测的结果只回给发起页面
#[axum::debug_handler]
pub async fn post_message(
    State(state): State<AppState>,
    Json(message): Json<PageMessage>,
) -> Json<WorkerMessage> {
    match message {
        PageMessage::CheckConnectivity => {
            let status = state.engine.probe_connectivity().await;
            Json(WorkerMessage::ConnectivityChange { status })
        }
    }
}

/// 推送事件入口：解析载荷并展示通知
#[axum::debug_handler]
pub async fn push(State(_state): State<AppState>, body: Bytes) -> Json<Notification> {
    let notification = Notification::from_push(&body);
    tracing::info!(
        "displaying notification: {} - {}",
        notification.title,
        notification.body
    );
    Json(notification)
}

/// 通知点击：目标地址已有页面则聚焦，否则新开
#[axum::debug_handler]
pub async fn notification_click(
    State(state): State<AppState>,
    Json(click): Json<ClickRequest>,
) -> Json<ClickResponse> {
    let response = match state.registry.focus_or_open(&click.url) {
        ClickOutcome::Focused(id) => ClickResponse {
            action: "focused",
            client_id: id,
        },
        ClickOutcome::Opened(id) => ClickResponse {
            action: "opened",
            client_id: id,
        },
    };
    Json(response)
}

/// 连接断开时把页面从登记表里摘掉
struct PageGuard {
    registry: ClientRegistry,
    id: Uuid,
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}

/// 每个受控页面挂一条事件流，承载广播消息（在线状态翻转等）
#[axum::debug_handler]
pub async fn events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> impl IntoResponse {
    let page = query.page.unwrap_or_else(|| "/".to_string());
    let id = state.registry.register(&page);
    let guard = PageGuard {
        registry: (*state.registry).clone(),
        id,
    };
    let rx = state.events.subscribe();

    Sse::new(event_stream(rx, guard)).keep_alive(KeepAlive::default())
}

fn event_stream(
    rx: broadcast::Receiver<WorkerMessage>,
    guard: PageGuard,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures_util::stream::unfold((rx, guard), |(mut rx, guard)| async move {
        loop {
            match rx.recv().await {
                Ok(message) => match Event::default().json_data(&message) {
                    Ok(event) => return Some((Ok(event), (rx, guard))),
                    Err(e) => {
                        tracing::warn!("failed to encode worker event: {}", e);
                        continue;
                    }
                },
                // 落后的页面跳过积压消息继续听
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}
