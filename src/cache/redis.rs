use std::sync::Arc;

use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::entry::CacheEntry;
use crate::cache::keys::{self, PARTITIONS_KEY};
use crate::error::CacheError;

/// Redis 分区存储，生产环境用
///
/// 记录序列化为 JSON 存字符串键；不设 Redis 过期时间，
/// 过期的记录仍要可作为陈旧内容返回，只在换版本时整分区删除。
#[derive(Clone)]
pub struct RedisStore {
    client: Arc<RedisClient>,
}

impl RedisStore {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self { client }
    }

    pub async fn get(&self, partition: &str, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(keys::entry_key(partition, key)).await?;
        match result {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn put(
        &self,
        partition: &str,
        key: &str,
        entry: &CacheEntry,
    ) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let json = serde_json::to_string(entry)?;
        let _: () = conn.set(keys::entry_key(partition, key), json).await?;
        let _: () = conn.sadd(keys::members_key(partition), key).await?;
        let _: () = conn.sadd(PARTITIONS_KEY, partition).await?;

        Ok(())
    }

    pub async fn partitions(&self) -> Result<Vec<String>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let names: Vec<String> = conn.smembers(PARTITIONS_KEY).await?;
        Ok(names)
    }

    pub async fn delete_partition(&self, partition: &str) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let members: Vec<String> = conn.smembers(keys::members_key(partition)).await?;
        let mut doomed: Vec<String> = members
            .iter()
            .map(|key| keys::entry_key(partition, key))
            .collect();
        doomed.push(keys::members_key(partition));

        let _: () = conn.del(doomed).await?;
        let _: () = conn.srem(PARTITIONS_KEY, partition).await?;

        Ok(())
    }
}
