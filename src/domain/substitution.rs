// ==========================================
// 仓库扫码对账系统 - 替换领域模型
// ==========================================
// 用途: 在途替换记录与跨界面待办载荷
// 红线: 跨界面协调不使用全局可变标志,统一走类型化 PendingAction
// ==========================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// SubstitutionMode - 替换入口模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubstitutionMode {
    Auto,   // 系统自动提名候选
    Manual, // 操作员选择/扫码指定候选
}

// ==========================================
// SubstitutionRecord - 在途替换记录
// ==========================================
// 生命周期: 提案创建,提交或取消即销毁
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionRecord {
    pub record_id: String,          // 记录 ID(UUID)
    pub original_unit_id: String,   // 被替换单元
    pub candidate_unit_id: String,  // 候选替换单元
    pub reason: String,             // 操作员填写的替换原因(必填非空)
    pub mode: SubstitutionMode,     // 入口模式
}

impl SubstitutionRecord {
    /// 创建在途替换记录
    pub fn new(
        original_unit_id: &str,
        candidate_unit_id: &str,
        reason: &str,
        mode: SubstitutionMode,
    ) -> Self {
        Self {
            record_id: Uuid::new_v4().to_string(),
            original_unit_id: original_unit_id.to_string(),
            candidate_unit_id: candidate_unit_id.to_string(),
            reason: reason.to_string(),
            mode,
        }
    }
}

// ==========================================
// PendingAction - 类型化待办载荷
// ==========================================
// 随导航调用传递,替代模块级全局变量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingAction {
    /// 上一行已完成,操作员选择继续 → 钉选下一目标行
    ContinueLine {
        line_id: String,
        product_id: String,
    },
    /// INTERNAL 多选路径: 暂存扫到的非映射单元,转入选件界面
    SelectSubstitute {
        staged_unit_id: String,
        line_id: String,
    },
    /// INTERNAL 超量软校验: 需操作员显式确认后重新提交
    ConfirmExcess {
        original_unit_id: String,
        candidate_unit_id: String,
        line_id: String,
        excess: f64,
    },
}
