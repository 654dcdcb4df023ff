use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cache::entry::CacheEntry;

/// 内存分区存储，进程内测试与单机运行用
///
/// 分区 -> 请求键 -> 记录，两层哈希表。锁内不做任何 IO。
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, HashMap<String, CacheEntry>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, partition: &str, key: &str) -> Option<CacheEntry> {
        self.inner
            .lock()
            .expect("memory store lock poisoned")
            .get(partition)
            .and_then(|entries| entries.get(key).cloned())
    }

    /// 覆盖写：同键的旧记录直接被替换
    pub fn put(&self, partition: &str, key: &str, entry: CacheEntry) {
        self.inner
            .lock()
            .expect("memory store lock poisoned")
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), entry);
    }

    pub fn partitions(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("memory store lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    pub fn delete_partition(&self, partition: &str) {
        self.inner
            .lock()
            .expect("memory store lock poisoned")
            .remove(partition);
    }
}
