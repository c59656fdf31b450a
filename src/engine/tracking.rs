// ==========================================
// 仓库扫码对账系统 - 占用流转跟踪器
// ==========================================
// 职责: 库存单元的占用(claim)与释放(release)
// 红线: 单次出站请求 + 有界等待;超时按失败处理,绝不当作最终成功
// 红线: 替换流程中 release 必须先于后续 claim 完成(见替换工作流)
// ==========================================

use crate::domain::unit::StockUnit;
use crate::engine::error::{ScanError, ScanResult};
use crate::gateway::{GatewayError, WarehouseGateway};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

// ==========================================
// TrackingTracker - 占用流转跟踪器
// ==========================================
pub struct TrackingTracker {
    gateway: Arc<dyn WarehouseGateway>,
    bound: Duration, // 有界等待(默认 10s)
}

impl TrackingTracker {
    pub fn new(gateway: Arc<dyn WarehouseGateway>, bound: Duration) -> Self {
        Self { gateway, bound }
    }

    /// 占用单元到明细行
    ///
    /// # 规则
    /// - 仅当单元占用引用为空或已等于目标行时合法
    /// - 他行占用属上游(解析器/校验器)应拦截的调用方缺陷: 报错,不静默修复
    /// - 后端 ClaimConflict 对本地快照具有权威性
    ///
    /// # 参数
    /// - unit: 最新库存单元快照
    /// - line_id: 目标明细行
    pub async fn claim(&self, unit: &StockUnit, line_id: &str) -> ScanResult<()> {
        if !unit.claimable_for(line_id) {
            warn!(
                unit_id = %unit.unit_id,
                line_id,
                current = ?unit.claiming_line_id,
                "占用前置校验失败: 单元已被他行占用"
            );
            return Err(ScanError::AlreadyClaimedElsewhere {
                unit_id: unit.unit_id.clone(),
            });
        }

        let call = self.gateway.claim_unit(line_id, &unit.unit_id);
        match timeout(self.bound, call).await {
            Ok(Ok(())) => {
                debug!(unit_id = %unit.unit_id, line_id, "占用确认");
                Ok(())
            }
            Ok(Err(GatewayError::ClaimConflict { unit_id, .. })) => {
                // 后端权威裁定,覆盖本地快照
                Err(ScanError::AlreadyClaimedElsewhere { unit_id })
            }
            Ok(Err(e)) => Err(ScanError::Gateway(e)),
            Err(_) => Err(ScanError::ClaimTimeout {
                unit_id: unit.unit_id.clone(),
            }),
        }
    }

    /// 释放单元占用
    ///
    /// # 规则
    /// - 未占用单元的释放为幂等空操作(成功返回)
    /// - 有界等待超时 → ReleaseTimeout,流程不得越过未确认的释放
    pub async fn release(&self, line_id: &str, unit: &StockUnit) -> ScanResult<()> {
        if !unit.is_claimed() {
            debug!(unit_id = %unit.unit_id, "单元未占用,释放视为空操作");
            return Ok(());
        }

        let call = self.gateway.release_unit(line_id, &unit.unit_id);
        match timeout(self.bound, call).await {
            Ok(Ok(())) => {
                debug!(unit_id = %unit.unit_id, line_id, "释放确认");
                Ok(())
            }
            Ok(Err(e)) => Err(ScanError::Gateway(e)),
            Err(_) => {
                warn!(unit_id = %unit.unit_id, bound_ms = self.bound.as_millis() as u64, "释放确认超时");
                Err(ScanError::ReleaseTimeout {
                    unit_id: unit.unit_id.clone(),
                })
            }
        }
    }
}
