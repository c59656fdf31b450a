// ==========================================
// 仓库扫码对账系统 - 替换校验纯函数库
// ==========================================
// 职责: 替换候选的硬规则/软规则判定
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::document::DocumentLine;
use crate::domain::types::DocumentType;
use crate::domain::unit::{ProductDetail, StockUnit};
use crate::engine::error::ScanError;

// ==========================================
// SubstitutionVerdict - 校验裁决
// ==========================================
#[derive(Debug)]
pub enum SubstitutionVerdict {
    /// 全部硬规则通过
    Accept,
    /// 硬规则通过,但候选计量超出商品规范值(INTERNAL 软校验):
    /// 提交前必须取得操作员显式确认
    AcceptWithExcessConfirm { excess: f64 },
    /// 硬规则失败,携带具体原因
    Reject(ScanError),
}

impl SubstitutionVerdict {
    pub fn is_accept(&self) -> bool {
        !matches!(self, SubstitutionVerdict::Reject(_))
    }
}

// ==========================================
// SubstitutionCore - 纯函数工具类
// ==========================================
pub struct SubstitutionCore;

impl SubstitutionCore {
    /// 替换候选校验
    ///
    /// # 规则(按序判定,首败即停)
    /// 1. 同一性: 候选 ≠ 原单元
    /// 2. 商品匹配: 候选商品 == 原单元商品;
    ///    INTERNAL 且 known_mapping=false(多选路径)改为对目标行商品校验
    /// 3. 状态准入: 候选不得为 UNAVAILABLE / NEED_LIQUIDATION
    /// 4. 不重复占用: 候选不得已被同单据其他行占用(调用方按活占用集计算)
    /// 5. 计量充足(仅 INTERNAL,且候选计量 < 原单元计量):
    ///    Σ(本行其他已占用单元计量) + 候选计量 ≥ 行需求计量,缺口即硬拒
    /// 6. 计量精确匹配(仅 SELLING): 候选计量必须等于商品规范值,高低均拒
    /// 7. 超量软校验(仅 INTERNAL): 候选计量 > 商品规范值 → 需操作员确认
    ///
    /// # 参数
    /// - original: 被替换单元
    /// - candidate: 候选单元
    /// - line: 目标明细行
    /// - doc_type: 单据类型
    /// - known_mapping: 解析器是否命中映射表
    /// - claimed_by_other_line: 候选是否已被同单据其他行占用(活占用集)
    /// - product: 商品计量基准
    /// - other_claimed_sum: 本行除原单元外已占用单元的计量合计
    #[allow(clippy::too_many_arguments)]
    pub fn validate(
        original: &StockUnit,
        candidate: &StockUnit,
        line: &DocumentLine,
        doc_type: DocumentType,
        known_mapping: bool,
        claimed_by_other_line: bool,
        product: &ProductDetail,
        other_claimed_sum: f64,
    ) -> SubstitutionVerdict {
        // 规则 1: 同一性
        if candidate.unit_id == original.unit_id {
            return SubstitutionVerdict::Reject(ScanError::SameUnit {
                unit_id: candidate.unit_id.clone(),
            });
        }

        // 规则 2: 商品匹配
        let multi_select_path = doc_type == DocumentType::Internal && !known_mapping;
        let expected_product = if multi_select_path {
            line.product_id.as_str()
        } else {
            original.product_id.as_str()
        };
        if candidate.product_id != expected_product {
            return SubstitutionVerdict::Reject(ScanError::ProductMismatch {
                expected_product: expected_product.to_string(),
                actual_product: candidate.product_id.clone(),
            });
        }

        // 规则 3: 状态准入
        if !candidate.status.is_substitutable() {
            return SubstitutionVerdict::Reject(ScanError::UnitStatusIneligible {
                unit_id: candidate.unit_id.clone(),
                status: candidate.status.to_string(),
            });
        }

        // 规则 4: 不重复占用
        if claimed_by_other_line {
            return SubstitutionVerdict::Reject(ScanError::AlreadyClaimedElsewhere {
                unit_id: candidate.unit_id.clone(),
            });
        }

        // 规则 5: 计量充足(仅 INTERNAL,候选计量低于原单元时)
        if doc_type == DocumentType::Internal
            && candidate.measure_value < original.measure_value
        {
            let total = other_claimed_sum + candidate.measure_value;
            if total < line.expected_measure {
                return SubstitutionVerdict::Reject(ScanError::MeasureInsufficient {
                    required: line.expected_measure,
                    total,
                    shortfall: line.expected_measure - total,
                });
            }
        }

        // 规则 6: 计量精确匹配(仅 SELLING)
        if doc_type == DocumentType::Selling
            && (candidate.measure_value - product.measure_value).abs() > f64::EPSILON
        {
            return SubstitutionVerdict::Reject(ScanError::MeasureMismatch {
                expected: product.measure_value,
                actual: candidate.measure_value,
            });
        }

        // 规则 7: 超量软校验(仅 INTERNAL)
        if doc_type == DocumentType::Internal && candidate.measure_value > product.measure_value {
            return SubstitutionVerdict::AcceptWithExcessConfirm {
                excess: candidate.measure_value - product.measure_value,
            };
        }

        SubstitutionVerdict::Accept
    }

    /// 本行除指定单元外的已占用计量合计
    ///
    /// # 参数
    /// - claimed_units: 本行已占用单元的最新快照
    /// - except_unit_id: 排除的单元(被替换的原单元)
    pub fn other_claimed_measure_sum(claimed_units: &[StockUnit], except_unit_id: &str) -> f64 {
        claimed_units
            .iter()
            .filter(|u| u.unit_id != except_unit_id)
            .map(|u| u.measure_value)
            .sum()
    }
}
