// 缓存模块
// 缓存记录结构、键规则与两种分区存储实现

pub mod entry;
pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

// 重新导出常用类型，方便其他模块使用
pub use entry::{CacheEntry, now_ms};
pub use store::CacheStore;
