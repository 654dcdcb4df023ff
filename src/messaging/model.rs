use serde::{Deserialize, Serialize};

/// 页面发往网关的消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageMessage {
    #[serde(rename = "CHECK_CONNECTIVITY")]
    CheckConnectivity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityStatus {
    Online,
    Offline,
}

impl From<bool> for ConnectivityStatus {
    fn from(online: bool) -> Self {
        if online {
            ConnectivityStatus::Online
        } else {
            ConnectivityStatus::Offline
        }
    }
}

/// 网关发往页面的消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerMessage {
    #[serde(rename = "CONNECTIVITY_CHANGE")]
    ConnectivityChange { status: ConnectivityStatus },
}

/// 推送载荷，三个字段都可缺省
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

pub const DEFAULT_PUSH_TITLE: &str = "Voyage 旅行";
pub const DEFAULT_PUSH_BODY: &str = "您有一条新消息";

/// 要展示的系统通知
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub url: Option<String>,
}

impl Notification {
    /// 解析推送载荷；非 JSON 或空载荷退回默认标题加原始文本
    pub fn from_push(raw: &[u8]) -> Notification {
        if raw.is_empty() {
            return Notification {
                title: DEFAULT_PUSH_TITLE.to_string(),
                body: DEFAULT_PUSH_BODY.to_string(),
                url: None,
            };
        }

        match serde_json::from_slice::<PushPayload>(raw) {
            Ok(payload) => Notification {
                title: payload.title.unwrap_or_else(|| DEFAULT_PUSH_TITLE.to_string()),
                body: payload.body.unwrap_or_else(|| DEFAULT_PUSH_BODY.to_string()),
                url: payload.url,
            },
            Err(_) => Notification {
                title: DEFAULT_PUSH_TITLE.to_string(),
                body: String::from_utf8_lossy(raw).into_owned(),
                url: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_payload_fills_notification() {
        let n = Notification::from_push(br#"{"title":"T","body":"B","url":"/x"}"#);
        assert_eq!(n.title, "T");
        assert_eq!(n.body, "B");
        assert_eq!(n.url.as_deref(), Some("/x"));
    }

    #[test]
    fn plain_text_payload_becomes_body() {
        let n = Notification::from_push(b"hello");
        assert_eq!(n.title, DEFAULT_PUSH_TITLE);
        assert_eq!(n.body, "hello");
        assert_eq!(n.url, None);
    }

    #[test]
    fn empty_payload_uses_defaults() {
        let n = Notification::from_push(b"");
        assert_eq!(n.title, DEFAULT_PUSH_TITLE);
        assert_eq!(n.body, DEFAULT_PUSH_BODY);
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let n = Notification::from_push(r#"{"title":"特价机票"}"#.as_bytes());
        assert_eq!(n.title, "特价机票");
        assert_eq!(n.body, DEFAULT_PUSH_BODY);
    }

    #[test]
    fn message_wire_shapes() {
        let msg: PageMessage = serde_json::from_str(r#"{"type":"CHECK_CONNECTIVITY"}"#).unwrap();
        assert_eq!(msg, PageMessage::CheckConnectivity);

        let out = WorkerMessage::ConnectivityChange {
            status: ConnectivityStatus::Offline,
        };
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"type":"CONNECTIVITY_CHANGE","status":"offline"}"#
        );
    }
}
