// ==========================================
// 仓库扫码对账系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 瞬时 / 校验 / 时序 / 部分失败 四类口径
// 约定: 校验与部分失败错误必须携带可行动的比较值
// ==========================================

use crate::gateway::GatewayError;
use thiserror::Error;

// ==========================================
// ErrorCategory - 错误分类
// ==========================================
// 瞬时: 网络/超时,不自动重试,操作员重新触发
// 校验: 本次尝试终止,始终对操作员可见
// 时序: 防抖层静默丢弃,或解析层定向提示
// 部分失败: 释放成功但换件失败,单元暂时无占用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transient,
    Validation,
    Sequencing,
    PartialFailure,
}

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum ScanError {
    // ===== 时序错误 =====
    #[error("扫码不属于当前单据: code={code}")]
    NotInDocument { code: String },

    #[error("当前目标行已钉选为商品「{pinned_product}」,请先完成该行")]
    PinnedLineMismatch {
        pinned_product: String,
        scanned_line_id: String,
    },

    // ===== 校验错误 =====
    #[error("候选单元与原单元相同: unit_id={unit_id}")]
    SameUnit { unit_id: String },

    #[error("商品不匹配: 期望商品 {expected_product}, 候选单元属于 {actual_product}")]
    ProductMismatch {
        expected_product: String,
        actual_product: String,
    },

    #[error("单元状态不可替换: unit_id={unit_id}, status={status}")]
    UnitStatusIneligible { unit_id: String, status: String },

    #[error("单元已被其他明细行占用: unit_id={unit_id}")]
    AlreadyClaimedElsewhere { unit_id: String },

    #[error("计量不足: 需要 {required}, 替换后合计 {total}, 缺口 {shortfall}")]
    MeasureInsufficient {
        required: f64,
        total: f64,
        shortfall: f64,
    },

    #[error("计量不匹配: 规范值 {expected}, 实际值 {actual}")]
    MeasureMismatch { expected: f64, actual: f64 },

    #[error("该单元已清点,不可重复计数: unit_id={unit_id}")]
    DuplicateUnit { unit_id: String },

    #[error("替换原因不能为空")]
    EmptyReason,

    #[error("无可用替换候选: line_id={line_id}")]
    NoCandidate { line_id: String },

    // ===== 瞬时错误 =====
    #[error("释放确认超时: unit_id={unit_id},流程不得越过未确认的释放")]
    ReleaseTimeout { unit_id: String },

    #[error("占用确认超时: unit_id={unit_id}")]
    ClaimTimeout { unit_id: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    // ===== 部分失败 =====
    #[error("换件失败(释放已生效): original={original_unit_id}, candidate={candidate_unit_id}, 原因: {source}")]
    SwapFailedAfterRelease {
        original_unit_id: String,
        candidate_unit_id: String,
        #[source]
        source: GatewayError,
    },
}

impl ScanError {
    /// 错误分类
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::PinnedLineMismatch { .. } => ErrorCategory::Sequencing,
            ScanError::NotInDocument { .. }
            | ScanError::SameUnit { .. }
            | ScanError::ProductMismatch { .. }
            | ScanError::UnitStatusIneligible { .. }
            | ScanError::AlreadyClaimedElsewhere { .. }
            | ScanError::MeasureInsufficient { .. }
            | ScanError::MeasureMismatch { .. }
            | ScanError::DuplicateUnit { .. }
            | ScanError::EmptyReason
            | ScanError::NoCandidate { .. } => ErrorCategory::Validation,
            ScanError::ReleaseTimeout { .. }
            | ScanError::ClaimTimeout { .. }
            | ScanError::Gateway(_) => ErrorCategory::Transient,
            ScanError::SwapFailedAfterRelease { .. } => ErrorCategory::PartialFailure,
        }
    }

    /// 该错误清除后是否应重新放行扫码
    ///
    /// # 规则
    /// - 瞬时/校验错误展示窗口结束即放行,操作员可立即换件重试
    pub fn reenables_scanning(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transient | ErrorCategory::Validation
        )
    }
}

/// Result 类型别名
pub type ScanResult<T> = Result<T, ScanError>;
