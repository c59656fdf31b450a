// ==========================================
// 仓库扫码对账系统 - 领域类型定义
// ==========================================
// 职责: 单据/明细/库存单元的枚举状态体系
// 红线: 状态流转走显式转移表,禁止散落的字符串比较
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单据类型 (Document Type)
// ==========================================
// 不同类型对应不同的校验与完成规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    OrderCount, // 订单清点(入库)
    Selling,    // 销售出库
    Internal,   // 内部调拨出库
    Return,     // 退货
    StockCheck, // 库存盘点
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::OrderCount => write!(f, "ORDER_COUNT"),
            DocumentType::Selling => write!(f, "SELLING"),
            DocumentType::Internal => write!(f, "INTERNAL"),
            DocumentType::Return => write!(f, "RETURN"),
            DocumentType::StockCheck => write!(f, "STOCK_CHECK"),
        }
    }
}

// ==========================================
// 单据状态 (Document Status)
// ==========================================
// 主流转: NOT_STARTED → IN_PROGRESS → COUNTED → CONFIRMED → COMPLETED
// CANCELLED 仅可从早期状态进入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    NotStarted, // 未开始
    InProgress, // 清点中
    Counted,    // 已清点
    Confirmed,  // 已确认
    Completed,  // 已完成
    Cancelled,  // 已取消
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStatus::NotStarted => write!(f, "NOT_STARTED"),
            DocumentStatus::InProgress => write!(f, "IN_PROGRESS"),
            DocumentStatus::Counted => write!(f, "COUNTED"),
            DocumentStatus::Confirmed => write!(f, "CONFIRMED"),
            DocumentStatus::Completed => write!(f, "COMPLETED"),
            DocumentStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl DocumentStatus {
    /// 状态转移表
    ///
    /// # 规则
    /// - NOT_STARTED → IN_PROGRESS / CANCELLED
    /// - IN_PROGRESS → COUNTED / CANCELLED
    /// - COUNTED → CONFIRMED
    /// - CONFIRMED → COMPLETED
    /// - COMPLETED / CANCELLED → 终态
    pub fn can_transition(&self, to: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, to),
            (NotStarted, InProgress)
                | (NotStarted, Cancelled)
                | (InProgress, Counted)
                | (InProgress, Cancelled)
                | (Counted, Confirmed)
                | (Confirmed, Completed)
        )
    }

    /// 是否终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Completed | DocumentStatus::Cancelled)
    }

    /// 从字符串解析状态
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "IN_PROGRESS" => DocumentStatus::InProgress,
            "COUNTED" => DocumentStatus::Counted,
            "CONFIRMED" => DocumentStatus::Confirmed,
            "COMPLETED" => DocumentStatus::Completed,
            "CANCELLED" => DocumentStatus::Cancelled,
            _ => DocumentStatus::NotStarted, // 默认值
        }
    }
}

// ==========================================
// 明细行状态 (Line Status)
// ==========================================
// MATCH/EXCEED 为后端在 COMPLETED 之外的等价完成态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
    Pending,   // 未清点
    Counting,  // 清点中
    Completed, // 已完成
    Match,     // 数量吻合(后端等价完成态)
    Exceed,    // 超出预期(后端等价完成态)
    Lack,      // 缺数
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineStatus::Pending => write!(f, "PENDING"),
            LineStatus::Counting => write!(f, "COUNTING"),
            LineStatus::Completed => write!(f, "COMPLETED"),
            LineStatus::Match => write!(f, "MATCH"),
            LineStatus::Exceed => write!(f, "EXCEED"),
            LineStatus::Lack => write!(f, "LACK"),
        }
    }
}

impl LineStatus {
    /// INTERNAL 单据的权威完成判定
    ///
    /// # 规则
    /// - COMPLETED / MATCH / EXCEED → 完成
    /// - 其余 → 未完成
    pub fn is_internal_complete(&self) -> bool {
        matches!(
            self,
            LineStatus::Completed | LineStatus::Match | LineStatus::Exceed
        )
    }

    /// 从字符串解析状态
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "COUNTING" => LineStatus::Counting,
            "COMPLETED" => LineStatus::Completed,
            "MATCH" => LineStatus::Match,
            "EXCEED" => LineStatus::Exceed,
            "LACK" => LineStatus::Lack,
            _ => LineStatus::Pending, // 默认值
        }
    }
}

// ==========================================
// 库存单元状态 (Unit Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitStatus {
    Available,       // 可用
    Unavailable,     // 不可用
    NeedLiquidation, // 待清理处置
    Damaged,         // 破损
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Available => write!(f, "AVAILABLE"),
            UnitStatus::Unavailable => write!(f, "UNAVAILABLE"),
            UnitStatus::NeedLiquidation => write!(f, "NEED_LIQUIDATION"),
            UnitStatus::Damaged => write!(f, "DAMAGED"),
        }
    }
}

impl UnitStatus {
    /// 是否可作为替换候选
    ///
    /// # 规则
    /// - UNAVAILABLE / NEED_LIQUIDATION → 不可替换
    pub fn is_substitutable(&self) -> bool {
        !matches!(self, UnitStatus::Unavailable | UnitStatus::NeedLiquidation)
    }

    /// 从字符串解析状态
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "UNAVAILABLE" => UnitStatus::Unavailable,
            "NEED_LIQUIDATION" => UnitStatus::NeedLiquidation,
            "DAMAGED" => UnitStatus::Damaged,
            _ => UnitStatus::Available, // 默认值
        }
    }
}
