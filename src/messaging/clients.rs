use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// 当前受控页面的登记表
///
/// 事件流连接建立时登记页面地址，断开时注销；
/// 通知点击时据此决定聚焦已有页面还是新开页面。
#[derive(Clone, Default)]
pub struct ClientRegistry {
    pages: Arc<Mutex<HashMap<Uuid, String>>>,
}

/// 通知点击的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// 聚焦了已打开的页面
    Focused(Uuid),
    /// 没有匹配页面，新开一个
    Opened(Uuid),
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, page_url: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.pages
            .lock()
            .expect("client registry lock poisoned")
            .insert(id, page_url.to_string());
        tracing::debug!("page registered: {} -> {}", id, page_url);
        id
    }

    /// 注销不存在的页面是静默空操作
    pub fn unregister(&self, id: Uuid) {
        self.pages
            .lock()
            .expect("client registry lock poisoned")
            .remove(&id);
    }

    pub fn len(&self) -> usize {
        self.pages.lock().expect("client registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 有页面正显示目标地址就聚焦它，否则登记一个新页面
    pub fn focus_or_open(&self, target_url: &str) -> ClickOutcome {
        let existing = self
            .pages
            .lock()
            .expect("client registry lock poisoned")
            .iter()
            .find(|(_, url)| url.as_str() == target_url)
            .map(|(id, _)| *id);

        match existing {
            Some(id) => ClickOutcome::Focused(id),
            None => ClickOutcome::Opened(self.register(target_url)),
        }
    }
}
