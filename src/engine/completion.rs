// ==========================================
// 仓库扫码对账系统 - 完成探测器
// ==========================================
// 职责: 每次成功对账后的行/单据完成判定与下一步提示
// 红线: INTERNAL 权威口径 = 新拉取的行状态;
//       拉取失败才降级为件数比较,且降级路径必须在日志中可区分
// ==========================================

use crate::domain::document::Document;
use crate::domain::types::{DocumentType, LineStatus};
use crate::engine::error::{ScanError, ScanResult};
use crate::gateway::{bounded, WarehouseGateway};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

// ==========================================
// NextAction - 下一步提示
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    /// 存在未完成行: 提示操作员继续,接受后由编排器钉选该行
    ContinueLine {
        line_id: String,
        product_id: String,
    },
    /// 全部明细行完成: 本轮清点结束,退出到单据汇总
    DocumentComplete,
}

// ==========================================
// CountOutcome - 单次对账后的完成判定
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOutcome {
    pub line_complete: bool,
    /// true=权威口径(新拉取状态), false=降级口径(件数比较)
    pub authoritative: bool,
    /// 行完成时的下一步;行未完成为 None
    pub next: Option<NextAction>,
}

// ==========================================
// 完成判定纯函数
// ==========================================

/// 行完成判定
///
/// # 规则
/// - SELLING 口径: counted_qty ≥ expected_qty
/// - INTERNAL 口径: 新拉取状态 ∈ {COMPLETED, MATCH, EXCEED} 为权威;
///   fresh_status=None(拉取失败)时降级为件数比较
///
/// # 返回
/// - (complete, authoritative)
pub fn decide_line_complete(
    doc_type: DocumentType,
    fresh_status: Option<LineStatus>,
    counted_qty: i32,
    expected_qty: i32,
) -> (bool, bool) {
    match doc_type {
        DocumentType::Internal => match fresh_status {
            Some(status) => (status.is_internal_complete(), true),
            None => (counted_qty >= expected_qty, false),
        },
        // 其余类型统一走件数口径(权威)
        _ => (counted_qty >= expected_qty, true),
    }
}

// ==========================================
// CompletionDetector - 完成探测器
// ==========================================
pub struct CompletionDetector {
    gateway: Arc<dyn WarehouseGateway>,
    bound: Duration, // 行状态新拉取的有界等待
}

impl CompletionDetector {
    pub fn new(gateway: Arc<dyn WarehouseGateway>, bound: Duration) -> Self {
        Self { gateway, bound }
    }

    /// 对账成功后的完成判定
    ///
    /// # 流程
    /// 1. 判定当前行是否完成(INTERNAL 先新拉取行状态)
    /// 2. 行完成 → 扫描其余行找下一未完成行(INTERNAL 逐行新拉取)
    /// 3. 有未完成行 → ContinueLine;无 → DocumentComplete
    pub async fn after_count(
        &self,
        line_id: &str,
        document: &Document,
    ) -> ScanResult<CountOutcome> {
        let line = document
            .line_by_id(line_id)
            .ok_or_else(|| ScanError::NotInDocument {
                code: line_id.to_string(),
            })?;

        let fresh_status = self.fetch_fresh_status(document.doc_type, line_id).await;
        let (line_complete, authoritative) = decide_line_complete(
            document.doc_type,
            fresh_status,
            line.counted_qty,
            line.expected_qty,
        );

        if !authoritative {
            // 降级口径,可信度较低,需在遥测中与权威路径区分
            warn!(
                line_id,
                fallback = true,
                counted = line.counted_qty,
                expected = line.expected_qty,
                "行状态拉取失败,完成判定降级为件数比较"
            );
        }

        if !line_complete {
            return Ok(CountOutcome {
                line_complete: false,
                authoritative,
                next: None,
            });
        }

        info!(line_id, authoritative, "明细行完成");
        let next = self.find_next_incomplete(document, line_id).await;
        Ok(CountOutcome {
            line_complete: true,
            authoritative,
            next: Some(next),
        })
    }

    /// INTERNAL 单据的行状态新拉取(失败返回 None,触发降级口径)
    async fn fetch_fresh_status(
        &self,
        doc_type: DocumentType,
        line_id: &str,
    ) -> Option<LineStatus> {
        if doc_type != DocumentType::Internal {
            return None;
        }
        match bounded(self.bound, "fetch_line_by_id", self.gateway.fetch_line_by_id(line_id)).await
        {
            Ok(fresh) => Some(fresh.status),
            Err(e) => {
                debug!(line_id, error = %e, "行状态新拉取失败");
                None
            }
        }
    }

    /// 扫描其余明细行,返回下一未完成行或单据完成
    async fn find_next_incomplete(&self, document: &Document, current_line_id: &str) -> NextAction {
        for line in document.lines.iter().filter(|l| l.line_id != current_line_id) {
            let fresh_status = self
                .fetch_fresh_status(document.doc_type, &line.line_id)
                .await;
            let (complete, _) = decide_line_complete(
                document.doc_type,
                fresh_status,
                line.counted_qty,
                line.expected_qty,
            );
            if !complete {
                return NextAction::ContinueLine {
                    line_id: line.line_id.clone(),
                    product_id: line.product_id.clone(),
                };
            }
        }
        info!(document_id = %document.document_id, "单据全部明细行完成");
        NextAction::DocumentComplete
    }
}
