// ==========================================
// 仓库扫码对账系统 - 扫码编排器
// ==========================================
// 职责: 面向 UI 的对账主流程
//   扫码 → 防抖 → 解析 → (普通计数 | 替换提示) → 完成探测 → 提示
// 红线: 单一逻辑执行上下文,防抖器的在途互斥是唯一并发闸门;
//       取消只复位防抖与暂存,绝不补偿已生效的释放
// ==========================================

use crate::config::ScanConfig;
use crate::domain::document::Document;
use crate::domain::substitution::{PendingAction, SubstitutionMode, SubstitutionRecord};
use crate::domain::types::DocumentType;
use crate::engine::completion::{CompletionDetector, NextAction};
use crate::engine::debounce::{DebounceReject, ScanDebouncer, ScanVerdict};
use crate::engine::error::{ScanError, ScanResult};
use crate::engine::reconcile::ReconcileQueue;
use crate::engine::resolver::MappingResolver;
use crate::engine::scan_mapping::ScanMapping;
use crate::engine::substitution::{SubstitutionOutcome, SubstitutionWorkflow};
use crate::engine::tracking::TrackingTracker;
use crate::gateway::{bounded, WarehouseGateway};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

// ==========================================
// ScanOutcome - 单次扫码的最终结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// 普通计数成功
    Counted {
        line_id: String,
        unit_id: String,
        line_complete: bool,
        /// 完成判定是否走权威口径(降级路径须在遥测中可区分)
        authoritative: bool,
        /// 行完成时的下一步提示
        next: Option<NextAction>,
    },
    /// 意外单元: 需操作员确认转入替换流程(载荷随导航传递)
    SubstitutionPrompt { pending: PendingAction },
    /// 防抖层拒绝(时序,静默丢弃,不上屏)
    Debounced { reject: DebounceReject },
}

// ==========================================
// ScanSession - 单据级对账会话
// ==========================================
// 生命周期: 打开单据创建,离开单据丢弃
pub struct ScanSession {
    pub document: Document,
    pub mapping: ScanMapping,
    pub debouncer: ScanDebouncer,
    pub queue: ReconcileQueue,
    /// 钉选的目标行(上一行完成后操作员选择继续时设置)
    pub pinned_line_id: Option<String>,
    /// 跨界面待办载荷(意外单元/继续提示/超量确认),随导航传递
    pub staged: Option<PendingAction>,
    /// 已计数单元集(同一物理单元恰好计数一次)
    pub counted_units: HashSet<String>,
}

impl ScanSession {
    /// 打开单据,构建会话状态
    pub fn open(document: Document, config: &ScanConfig) -> Self {
        let mapping = ScanMapping::build(&document);
        Self {
            document,
            mapping,
            debouncer: ScanDebouncer::new(config),
            queue: ReconcileQueue::new(),
            pinned_line_id: None,
            staged: None,
            counted_units: HashSet::new(),
        }
    }
}

// ==========================================
// ScanOrchestrator - 扫码编排器
// ==========================================
pub struct ScanOrchestrator {
    gateway: Arc<dyn WarehouseGateway>,
    resolver: MappingResolver,
    tracker: Arc<TrackingTracker>,
    workflow: SubstitutionWorkflow,
    completion: CompletionDetector,
    bound: Duration, // 编排器自身出站查询的有界等待
}

impl ScanOrchestrator {
    /// 创建编排器
    pub fn new(gateway: Arc<dyn WarehouseGateway>, config: &ScanConfig) -> Self {
        // 占用流转与其余出站调用共用同一有界等待配置
        let bound = config.tracking_timeout();
        let tracker = Arc::new(TrackingTracker::new(gateway.clone(), bound));
        Self {
            resolver: MappingResolver::new(gateway.clone(), bound),
            workflow: SubstitutionWorkflow::new(gateway.clone(), tracker.clone(), bound),
            completion: CompletionDetector::new(gateway.clone(), bound),
            tracker,
            gateway,
            bound,
        }
    }

    /// 处理一次扫码事件
    ///
    /// # 流程
    /// 1. 防抖裁决(拒绝即静默丢弃)
    /// 2. 解析到明细行
    /// 3. known_mapping=false → 替换提示(暂存意外单元,计数不发生)
    /// 4. 普通计数: 单元唯一性 → SELLING 精确计量 → 占用 → 投机计数对账
    /// 5. 完成探测与下一步提示
    ///
    /// # 参数
    /// - clock: 注入时钟;提交与完成各取一次时刻,
    ///   安定窗口锚定在处理完成时刻而非提交时刻
    ///
    /// # 返回
    /// - Err 时防抖器已按失败完成回报,展示窗口结束后可立即重扫
    pub async fn on_scan(
        &self,
        session: &mut ScanSession,
        code: &str,
        clock: impl Fn() -> DateTime<Utc>,
    ) -> ScanResult<ScanOutcome> {
        // 步骤 1: 防抖
        match session.debouncer.submit(code, clock()) {
            ScanVerdict::Rejected(reject) => {
                debug!(code, ?reject, "防抖拒绝,静默丢弃");
                return Ok(ScanOutcome::Debounced { reject });
            }
            ScanVerdict::Accepted => {}
        }

        match self.process_scan(session, code).await {
            Ok(outcome) => {
                let success = matches!(outcome, ScanOutcome::Counted { .. });
                session.debouncer.complete(code, success, clock());
                Ok(outcome)
            }
            Err(e) => {
                session.debouncer.complete(code, false, clock());
                Err(e)
            }
        }
    }

    /// 扫码主体(防抖接受之后)
    async fn process_scan(&self, session: &mut ScanSession, code: &str) -> ScanResult<ScanOutcome> {
        // 步骤 2: 解析
        let resolved = self
            .resolver
            .resolve(
                code,
                &session.document,
                &session.mapping,
                session.pinned_line_id.as_deref(),
            )
            .await?;

        // 步骤 3: 意外单元 → 替换流程的确认换件路径
        if !resolved.known_mapping {
            let pending = PendingAction::SelectSubstitute {
                staged_unit_id: code.to_string(),
                line_id: resolved.line_id.clone(),
            };
            session.staged = Some(pending.clone());
            info!(code, line_id = %resolved.line_id, "扫到非映射单元,转入替换确认");
            return Ok(ScanOutcome::SubstitutionPrompt { pending });
        }

        // 步骤 4: 普通计数
        let line_id = resolved.line_id;

        // 同一物理单元恰好计数一次(冷却窗口之外的重扫在此拦截)
        if session.counted_units.contains(code) {
            return Err(ScanError::DuplicateUnit {
                unit_id: code.to_string(),
            });
        }

        let unit = bounded(self.bound, "fetch_unit_by_id", self.gateway.fetch_unit_by_id(code))
            .await?;

        // SELLING: 扫码单元的计量必须精确等于商品规范值,与配额无关
        if session.document.doc_type == DocumentType::Selling {
            let product = bounded(
                self.bound,
                "fetch_product_detail",
                self.gateway.fetch_product_detail(&unit.product_id),
            )
            .await?;
            if (unit.measure_value - product.measure_value).abs() > f64::EPSILON {
                return Err(ScanError::MeasureMismatch {
                    expected: product.measure_value,
                    actual: unit.measure_value,
                });
            }
        }

        // 投机计数登记 → 占用 → 对账/回滚
        let entry_id = session
            .queue
            .stage(&line_id, code, 1, unit.measure_value);
        match self.tracker.claim(&unit, &line_id).await {
            Ok(()) => {
                if let Some(line) = session.document.line_by_id_mut(&line_id) {
                    session.queue.confirm(&entry_id, line);
                    if !line.has_claimed_unit(code) {
                        line.claimed_unit_ids.push(code.to_string());
                    }
                }
                session.counted_units.insert(code.to_string());
            }
            Err(e) => {
                session.queue.rollback(&entry_id);
                return Err(e);
            }
        }

        // 步骤 5: 完成探测
        let outcome = self.completion.after_count(&line_id, &session.document).await?;
        match &outcome.next {
            // 继续提示的载荷随导航暂存,操作员接受时消费(见 on_continue_line)
            Some(NextAction::ContinueLine {
                line_id: next_line,
                product_id,
            }) => {
                session.staged = Some(PendingAction::ContinueLine {
                    line_id: next_line.clone(),
                    product_id: product_id.clone(),
                });
            }
            Some(NextAction::DocumentComplete) => {
                session.pinned_line_id = None;
            }
            None => {}
        }
        Ok(ScanOutcome::Counted {
            line_id,
            unit_id: code.to_string(),
            line_complete: outcome.line_complete,
            authoritative: outcome.authoritative,
            next: outcome.next,
        })
    }

    /// 提交一次人工替换
    ///
    /// # 参数
    /// - excess_confirmed: 操作员已确认超量(软校验二次提交)
    ///
    /// # 返回
    /// - ExcessConfirmRequired 时调用方取得确认后携 true 重新提交
    pub async fn on_substitution_submit(
        &self,
        session: &mut ScanSession,
        original_unit_id: &str,
        candidate_unit_id: &str,
        reason: &str,
        excess_confirmed: bool,
    ) -> ScanResult<SubstitutionOutcome> {
        // 候选为暂存的意外单元 → 多选路径(known_mapping=false)
        let staged_match = matches!(
            &session.staged,
            Some(PendingAction::SelectSubstitute { staged_unit_id, .. })
                if staged_unit_id == candidate_unit_id
        );

        // 目标行: 原单元映射优先,其次暂存载荷
        let line_id = match session.mapping.line_for(original_unit_id) {
            Some(line_id) => line_id.to_string(),
            None => match &session.staged {
                Some(PendingAction::SelectSubstitute { line_id, .. }) => line_id.clone(),
                _ => {
                    return Err(ScanError::NotInDocument {
                        code: original_unit_id.to_string(),
                    })
                }
            },
        };

        let record = SubstitutionRecord::new(
            original_unit_id,
            candidate_unit_id,
            reason,
            SubstitutionMode::Manual,
        );
        let outcome = self
            .workflow
            .execute(
                &mut session.document,
                &mut session.mapping,
                &line_id,
                &record,
                !staged_match,
                excess_confirmed,
            )
            .await?;

        match &outcome {
            SubstitutionOutcome::Committed { .. } => {
                // 在途替换记录随提交销毁;计数归属随占用集换人
                session.staged = None;
                if session.counted_units.remove(original_unit_id) {
                    session.counted_units.insert(candidate_unit_id.to_string());
                }
            }
            SubstitutionOutcome::ExcessConfirmRequired {
                line_id,
                original_unit_id,
                candidate_unit_id,
                excess,
            } => {
                // 确认对话框的载荷随导航暂存;
                // 多选路径保留暂存的意外单元,重新提交仍按多选口径校验
                if !staged_match {
                    session.staged = Some(PendingAction::ConfirmExcess {
                        original_unit_id: original_unit_id.clone(),
                        candidate_unit_id: candidate_unit_id.clone(),
                        line_id: line_id.clone(),
                        excess: *excess,
                    });
                }
            }
        }
        Ok(outcome)
    }

    /// 自动替换: 系统从本行单元池提名候选
    pub async fn on_auto_substitute(
        &self,
        session: &mut ScanSession,
        original_unit_id: &str,
        reason: &str,
    ) -> ScanResult<SubstitutionOutcome> {
        let line_id = session
            .mapping
            .line_for(original_unit_id)
            .ok_or_else(|| ScanError::NotInDocument {
                code: original_unit_id.to_string(),
            })?
            .to_string();

        let outcome = self
            .workflow
            .auto_substitute(
                &mut session.document,
                &mut session.mapping,
                &line_id,
                original_unit_id,
                reason,
            )
            .await?;

        if let SubstitutionOutcome::Committed {
            candidate_unit_id, ..
        } = &outcome
        {
            if session.counted_units.remove(original_unit_id) {
                session.counted_units.insert(candidate_unit_id.clone());
            }
        }
        Ok(outcome)
    }

    /// 行完成提示后操作员选择继续 → 钉选下一目标行
    pub fn on_continue_line(&self, session: &mut ScanSession, line_id: &str) {
        info!(line_id, "钉选目标行");
        session.pinned_line_id = Some(line_id.to_string());
        // 继续提示的暂存载荷随接受消费
        if matches!(&session.staged, Some(PendingAction::ContinueLine { .. })) {
            session.staged = None;
        }
    }

    /// 操作员取消对话框
    ///
    /// # 规则
    /// - 完全复位防抖器(清除在途标记),立即恢复可扫
    /// - 丢弃暂存的意外单元
    /// - 不补偿已生效的释放
    pub fn on_cancel(&self, session: &mut ScanSession) {
        session.debouncer.reset();
        session.staged = None;
    }
}
