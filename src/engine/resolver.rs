// ==========================================
// 仓库扫码对账系统 - 映射解析器
// ==========================================
// 职责: 把解码后的扫码内容解析到唯一明细行
// 红线: NOT_IN_DOCUMENT 为终态拒绝,不改动任何状态
// ==========================================

use crate::domain::document::Document;
use crate::engine::error::{ScanError, ScanResult};
use crate::engine::scan_mapping::ScanMapping;
use crate::gateway::{bounded, WarehouseGateway};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

// ==========================================
// ResolvedScan - 解析结果
// ==========================================
// known_mapping=false 标记"意外单元"场景,
// 调用方必须走替换流程的确认换件路径而非普通计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScan {
    pub line_id: String,
    pub known_mapping: bool,
}

// ==========================================
// MappingResolver - 映射解析器
// ==========================================
pub struct MappingResolver {
    gateway: Arc<dyn WarehouseGateway>,
    bound: Duration, // 出站查询的有界等待
}

impl MappingResolver {
    pub fn new(gateway: Arc<dyn WarehouseGateway>, bound: Duration) -> Self {
        Self { gateway, bound }
    }

    /// 解析扫码到明细行
    ///
    /// # 规则
    /// 1. 映射表命中 → 返回关联行,known_mapping=true
    /// 2. 未命中 → 拉取库存单元,找同商品明细行 → known_mapping=false
    /// 3. 无同商品明细行 → NotInDocument(终态,不改状态)
    /// 4. 已钉选目标行时,解析行不等于目标行 → 定向拒绝并报出目标商品
    ///
    /// # 参数
    /// - code: 扫码内容(单元 ID)
    /// - document: 当前单据快照
    /// - mapping: 扫码映射表
    /// - pinned_line_id: 出库/盘点流程钉选的目标行
    pub async fn resolve(
        &self,
        code: &str,
        document: &Document,
        mapping: &ScanMapping,
        pinned_line_id: Option<&str>,
    ) -> ScanResult<ResolvedScan> {
        // 规则 1: 映射命中
        if let Some(line_id) = mapping.line_for(code) {
            let resolved = ResolvedScan {
                line_id: line_id.to_string(),
                known_mapping: true,
            };
            return self.check_pinned(document, resolved, pinned_line_id);
        }

        // 规则 2: 回退到商品匹配
        debug!(code, "扫码未命中映射表,回退库存单元查询");
        let unit = bounded(self.bound, "fetch_unit_by_id", self.gateway.fetch_unit_by_id(code))
            .await
            .map_err(|e| match e {
                crate::gateway::GatewayError::NotFound { .. } => ScanError::NotInDocument {
                    code: code.to_string(),
                },
                other => ScanError::Gateway(other),
            })?;

        match document.line_by_product(&unit.product_id) {
            Some(line) => {
                let resolved = ResolvedScan {
                    line_id: line.line_id.clone(),
                    known_mapping: false,
                };
                self.check_pinned(document, resolved, pinned_line_id)
            }
            // 规则 3: 终态拒绝
            None => Err(ScanError::NotInDocument {
                code: code.to_string(),
            }),
        }
    }

    /// 钉选目标行校验
    fn check_pinned(
        &self,
        document: &Document,
        resolved: ResolvedScan,
        pinned_line_id: Option<&str>,
    ) -> ScanResult<ResolvedScan> {
        if let Some(pinned) = pinned_line_id {
            if resolved.line_id != pinned {
                let pinned_product = document
                    .line_by_id(pinned)
                    .map(|l| l.display_name().to_string())
                    .unwrap_or_else(|| pinned.to_string());
                return Err(ScanError::PinnedLineMismatch {
                    pinned_product,
                    scanned_line_id: resolved.line_id,
                });
            }
        }
        Ok(resolved)
    }
}
