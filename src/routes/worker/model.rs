use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 事件流连接参数，page 为页面当前地址
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub page: Option<String>,
}

/// 通知点击上报
#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ClickResponse {
    /// "focused" 或 "opened"
    pub action: &'static str,
    pub client_id: Uuid,
}
