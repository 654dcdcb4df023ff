use crate::cache::entry::CacheEntry;
use crate::cache::memory::MemoryStore;
use crate::cache::redis::RedisStore;
use crate::error::CacheError;

/// 注入给分类器与回源引擎的键值存储抽象
///
/// 分区内按请求身份键存取；put 为覆盖语义。平台侧保证
/// 单键操作原子，陈旧读与并发后台写竞争时以最新写入为准。
#[derive(Clone)]
pub enum CacheStore {
    Memory(MemoryStore),
    Redis(RedisStore),
}

impl CacheStore {
    pub fn memory() -> Self {
        CacheStore::Memory(MemoryStore::new())
    }

    pub async fn get(&self, partition: &str, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        match self {
            CacheStore::Memory(store) => Ok(store.get(partition, key)),
            CacheStore::Redis(store) => store.get(partition, key).await,
        }
    }

    pub async fn put(
        &self,
        partition: &str,
        key: &str,
        entry: &CacheEntry,
    ) -> Result<(), CacheError> {
        match self {
            CacheStore::Memory(store) => {
                store.put(partition, key, entry.clone());
                Ok(())
            }
            CacheStore::Redis(store) => store.put(partition, key, entry).await,
        }
    }

    pub async fn partitions(&self) -> Result<Vec<String>, CacheError> {
        match self {
            CacheStore::Memory(store) => Ok(store.partitions()),
            CacheStore::Redis(store) => store.partitions().await,
        }
    }

    pub async fn delete_partition(&self, partition: &str) -> Result<(), CacheError> {
        match self {
            CacheStore::Memory(store) => {
                store.delete_partition(partition);
                Ok(())
            }
            CacheStore::Redis(store) => store.delete_partition(partition).await,
        }
    }
}
