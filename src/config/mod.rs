use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub upstream_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub worker_base: String,
    pub cache_version: String,
    pub shell_ttl_secs: u64,
    pub dynamic_ttl_secs: u64,
    pub api_ttl_secs: u64,
    pub upstream_timeout_secs: u64,
    pub external_api_hosts: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let external_api_hosts = env::var("EXTERNAL_API_HOSTS")
            .unwrap_or_default()
            .split(',')
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();

        Ok(Config {
            upstream_url: env::var("UPSTREAM_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            worker_base: env::var("WORKER_BASE").unwrap_or_else(|_| "/_worker".into()),
            cache_version: env::var("CACHE_VERSION").unwrap_or_else(|_| "v1".into()),
            shell_ttl_secs: env::var("SHELL_TTL").map_or(86400, |v| v.parse().unwrap_or(86400)),
            dynamic_ttl_secs: env::var("DYNAMIC_TTL").map_or(3600, |v| v.parse().unwrap_or(3600)),
            api_ttl_secs: env::var("API_TTL").map_or(300, |v| v.parse().unwrap_or(300)),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT")
                .map_or(10, |v| v.parse().unwrap_or(10)),
            external_api_hosts,
        })
    }

    pub fn shell_ttl(&self) -> Duration {
        Duration::from_secs(self.shell_ttl_secs)
    }

    pub fn dynamic_ttl(&self) -> Duration {
        Duration::from_secs(self.dynamic_ttl_secs)
    }

    pub fn api_ttl(&self) -> Duration {
        Duration::from_secs(self.api_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// 应用外壳分区名，带版本后缀，升级后旧分区在激活阶段被清除
    pub fn shell_partition(&self) -> String {
        format!("shell-{}", self.cache_version)
    }

    /// 动态内容分区名
    pub fn dynamic_partition(&self) -> String {
        format!("dynamic-{}", self.cache_version)
    }

    /// 当前有效的分区白名单
    pub fn partition_whitelist(&self) -> [String; 2] {
        [self.shell_partition(), self.dynamic_partition()]
    }
}
