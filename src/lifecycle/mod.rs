//! 安装 / 激活生命周期
//!
//! installing → installed → activating → activated。
//! 安装阶段把外壳清单整体预取进外壳分区，任何一项失败整个安装
//! 失败，不允许带着残缺外壳上线；激活阶段清除白名单之外的历史
//! 分区，然后立即接管流量，不等页面重载。

use crate::error::GatewayError;
use crate::shell;
use crate::swr::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Installing,
    Installed,
    Activating,
    Activated,
}

pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Lifecycle {
            phase: Phase::Installing,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 预取外壳清单；成功即视为跳过等待阶段，可直接激活
    pub async fn install(&mut self, engine: &Engine) -> Result<(), GatewayError> {
        tracing::info!(
            "installing shell manifest into partition {}",
            engine.config().shell_partition()
        );

        for path in shell::SHELL_MANIFEST {
            engine.prime(path).await.inspect_err(|e| {
                tracing::error!("shell install aborted: {}", e);
            })?;
        }

        self.phase = Phase::Installed;
        tracing::info!("shell installed, {} entries", shell::SHELL_MANIFEST.len());
        Ok(())
    }

    /// 清除白名单外的历史分区并接管流量
    pub async fn activate(&mut self, engine: &Engine) -> Result<(), GatewayError> {
        self.phase = Phase::Activating;

        let whitelist = engine.config().partition_whitelist();
        for partition in engine.store().partitions().await? {
            if !whitelist.contains(&partition) {
                tracing::info!("sweeping stale cache partition {}", partition);
                engine.store().delete_partition(&partition).await?;
            }
        }

        self.phase = Phase::Activated;
        tracing::info!("gateway activated, claiming traffic immediately");
        Ok(())
    }
}
