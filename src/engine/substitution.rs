// ==========================================
// 仓库扫码对账系统 - 替换工作流
// ==========================================
// 职责: 编排"先释放-后换件"的替换序列(自动提名/人工指定两种入口)
// 红线: 释放未确认绝不发起换件;换件失败不自动重试,
//       释放已生效的部分失败如实上报(已知缺口,强制操作员重试)
// ==========================================

use crate::domain::document::Document;
use crate::domain::substitution::SubstitutionRecord;
use crate::domain::unit::StockUnit;
use crate::engine::error::{ScanError, ScanResult};
use crate::engine::scan_mapping::ScanMapping;
use crate::engine::substitution_core::{SubstitutionCore, SubstitutionVerdict};
use crate::engine::tracking::TrackingTracker;
use crate::gateway::{bounded, WarehouseGateway};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// ==========================================
// SubstitutionOutcome - 工作流结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum SubstitutionOutcome {
    /// 换件已提交并生效,映射表已原位改写
    Committed {
        line_id: String,
        original_unit_id: String,
        candidate_unit_id: String,
    },
    /// 超量软校验命中: 需操作员显式确认后携 excess_confirmed 重新提交
    /// (原单元此时已释放,重新提交从校验步骤继续)
    ExcessConfirmRequired {
        line_id: String,
        original_unit_id: String,
        candidate_unit_id: String,
        excess: f64,
    },
}

// ==========================================
// SubstitutionWorkflow - 替换工作流
// ==========================================
pub struct SubstitutionWorkflow {
    gateway: Arc<dyn WarehouseGateway>,
    tracker: Arc<TrackingTracker>,
    bound: Duration, // 查询与换件调用的有界等待
}

impl SubstitutionWorkflow {
    pub fn new(
        gateway: Arc<dyn WarehouseGateway>,
        tracker: Arc<TrackingTracker>,
        bound: Duration,
    ) -> Self {
        Self {
            gateway,
            tracker,
            bound,
        }
    }

    /// 执行一次替换(两种入口模式共用序列)
    ///
    /// # 流程
    /// 1. 拉取原单元最新占用状态
    /// 2. 原单元在占用中 → 先释放;释放失败/超时 → 整体中止,不碰换件
    /// 3. 校验候选(硬规则失败即中止;软超量未确认 → 返回待确认)
    /// 4. 后端换件(不自动重试;失败时释放已生效,按部分失败上报)
    /// 5. 换件成功 → 原位改写映射表条目与本地占用集
    ///
    /// # 参数
    /// - known_mapping: 触发本次替换的扫码是否命中映射表
    ///   (false + INTERNAL = 多选路径,商品校验对目标行)
    /// - excess_confirmed: 操作员是否已确认超量
    pub async fn execute(
        &self,
        document: &mut Document,
        mapping: &mut ScanMapping,
        line_id: &str,
        record: &SubstitutionRecord,
        known_mapping: bool,
        excess_confirmed: bool,
    ) -> ScanResult<SubstitutionOutcome> {
        if record.reason.trim().is_empty() {
            return Err(ScanError::EmptyReason);
        }
        let line = document
            .line_by_id(line_id)
            .ok_or_else(|| ScanError::NotInDocument {
                code: line_id.to_string(),
            })?
            .clone();

        // 步骤 1: 原单元最新占用状态
        let original = bounded(
            self.bound,
            "fetch_unit_by_id",
            self.gateway.fetch_unit_by_id(&record.original_unit_id),
        )
        .await?;

        // 步骤 2: 先释放(释放确认先于一切后续占用流转)
        if original.is_claimed() {
            self.tracker.release(line_id, &original).await?;
            info!(
                unit_id = %original.unit_id,
                line_id,
                "原单元释放确认,进入候选校验"
            );
        }

        // 步骤 3: 候选校验
        let candidate = bounded(
            self.bound,
            "fetch_unit_by_id",
            self.gateway.fetch_unit_by_id(&record.candidate_unit_id),
        )
        .await?;
        let product = bounded(
            self.bound,
            "fetch_product_detail",
            self.gateway.fetch_product_detail(&line.product_id),
        )
        .await?;
        let line_units = bounded(
            self.bound,
            "fetch_units_by_line",
            self.gateway.fetch_units_by_line(line_id),
        )
        .await?;

        // 本行其他已占用单元的计量合计(活快照)
        let claimed_units: Vec<StockUnit> = line_units
            .iter()
            .filter(|u| u.claiming_line_id.as_deref() == Some(line_id))
            .cloned()
            .collect();
        let other_sum =
            SubstitutionCore::other_claimed_measure_sum(&claimed_units, &original.unit_id);

        // 活占用集判定: 候选被同单据其他行占用
        let claimed_elsewhere = candidate
            .claiming_line_id
            .as_deref()
            .map(|l| l != line_id)
            .unwrap_or(false)
            || document.unit_claimed_by_other_line(&candidate.unit_id, line_id);

        match SubstitutionCore::validate(
            &original,
            &candidate,
            &line,
            document.doc_type,
            known_mapping,
            claimed_elsewhere,
            &product,
            other_sum,
        ) {
            SubstitutionVerdict::Reject(e) => Err(e),
            SubstitutionVerdict::AcceptWithExcessConfirm { excess } if !excess_confirmed => {
                Ok(SubstitutionOutcome::ExcessConfirmRequired {
                    line_id: line_id.to_string(),
                    original_unit_id: original.unit_id.clone(),
                    candidate_unit_id: candidate.unit_id.clone(),
                    excess,
                })
            }
            _ => {
                self.commit_swap(document, mapping, line_id, &original, &candidate, record)
                    .await
            }
        }
    }

    /// 自动模式: 从本行单元池提名候选并执行替换
    ///
    /// # 规则
    /// - 候选池 = 本行同商品、未被占用的单元(排除原单元)
    /// - 取首个通过全部硬规则的候选(软超量候选不自动提名)
    /// - 无合格候选 → NoCandidate
    pub async fn auto_substitute(
        &self,
        document: &mut Document,
        mapping: &mut ScanMapping,
        line_id: &str,
        original_unit_id: &str,
        reason: &str,
    ) -> ScanResult<SubstitutionOutcome> {
        let candidate_id = self.nominate(document, line_id, original_unit_id).await?;
        let record = SubstitutionRecord::new(
            original_unit_id,
            &candidate_id,
            reason,
            crate::domain::substitution::SubstitutionMode::Auto,
        );
        self.execute(document, mapping, line_id, &record, true, false)
            .await
    }

    /// 提名首个通过硬规则的未占用候选
    async fn nominate(
        &self,
        document: &Document,
        line_id: &str,
        original_unit_id: &str,
    ) -> ScanResult<String> {
        let line = document
            .line_by_id(line_id)
            .ok_or_else(|| ScanError::NotInDocument {
                code: line_id.to_string(),
            })?;
        let original = bounded(
            self.bound,
            "fetch_unit_by_id",
            self.gateway.fetch_unit_by_id(original_unit_id),
        )
        .await?;
        let product = bounded(
            self.bound,
            "fetch_product_detail",
            self.gateway.fetch_product_detail(&line.product_id),
        )
        .await?;
        let line_units = bounded(
            self.bound,
            "fetch_units_by_line",
            self.gateway.fetch_units_by_line(line_id),
        )
        .await?;

        let claimed_units: Vec<StockUnit> = line_units
            .iter()
            .filter(|u| u.claiming_line_id.as_deref() == Some(line_id))
            .cloned()
            .collect();
        let other_sum =
            SubstitutionCore::other_claimed_measure_sum(&claimed_units, original_unit_id);

        for candidate in line_units
            .iter()
            .filter(|u| !u.is_claimed() && u.unit_id != original_unit_id)
        {
            let verdict = SubstitutionCore::validate(
                &original,
                candidate,
                line,
                document.doc_type,
                true,
                false,
                &product,
                other_sum,
            );
            if matches!(verdict, SubstitutionVerdict::Accept) {
                info!(
                    line_id,
                    original_unit_id,
                    candidate_unit_id = %candidate.unit_id,
                    "自动提名替换候选"
                );
                return Ok(candidate.unit_id.clone());
            }
        }
        Err(ScanError::NoCandidate {
            line_id: line_id.to_string(),
        })
    }

    /// 步骤 4/5: 后端换件与本地状态改写
    async fn commit_swap(
        &self,
        document: &mut Document,
        mapping: &mut ScanMapping,
        line_id: &str,
        original: &StockUnit,
        candidate: &StockUnit,
        record: &SubstitutionRecord,
    ) -> ScanResult<SubstitutionOutcome> {
        // 换件同样有界等待: 释放已生效的窗口不允许无限悬挂
        if let Err(e) = bounded(
            self.bound,
            "swap_unit",
            self.gateway
                .swap_unit(&original.unit_id, &candidate.unit_id, &record.reason),
        )
        .await
        {
            // 释放已生效而换件失败: 单元暂时无占用,操作员重扫/重选重试
            warn!(
                original_unit_id = %original.unit_id,
                candidate_unit_id = %candidate.unit_id,
                error = %e,
                "换件失败,原单元处于已释放状态"
            );
            return Err(ScanError::SwapFailedAfterRelease {
                original_unit_id: original.unit_id.clone(),
                candidate_unit_id: candidate.unit_id.clone(),
                source: e,
            });
        }

        // 步骤 5: 原位改写(链式替换由此天然线性化:
        // 最近一次接受的替换成为下一次替换的"原单元")
        mapping.remap(&original.unit_id, &candidate.unit_id, line_id);
        if let Some(line) = document.line_by_id_mut(line_id) {
            line.swap_claimed_unit(&original.unit_id, &candidate.unit_id);
        }

        info!(
            line_id,
            original_unit_id = %original.unit_id,
            candidate_unit_id = %candidate.unit_id,
            mode = ?record.mode,
            "替换提交生效"
        );
        Ok(SubstitutionOutcome::Committed {
            line_id: line_id.to_string(),
            original_unit_id: original.unit_id.clone(),
            candidate_unit_id: candidate.unit_id.clone(),
        })
    }
}
