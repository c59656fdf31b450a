// ==========================================
// 仓库扫码对账系统 - 库存单元领域模型
// ==========================================
// 用途: 单件跟踪库存单元与商品计量基准
// 不变量: 单元同一时刻至多被一个明细行占用
// ==========================================

use crate::domain::types::UnitStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// StockUnit - 库存单元
// ==========================================
// 占用(claim)与释放(release)是本核心对其执行的仅有两种流转
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUnit {
    pub unit_id: String,                  // 单元唯一标识(扫码内容)
    pub product_id: String,               // 所属商品 ID
    pub measure_value: f64,               // 计量值(如重量 kg)
    pub status: UnitStatus,               // 生命周期状态
    pub claimed_flag: bool,               // 出库/清点占用标记
    pub claiming_line_id: Option<String>, // 当前占用明细行(NULL=未占用)
}

impl StockUnit {
    /// 是否已被占用
    pub fn is_claimed(&self) -> bool {
        self.claiming_line_id.is_some()
    }

    /// 对指定明细行而言是否可占用
    ///
    /// # 规则
    /// - claiming_line_id 为空 或 已等于该行 → 可占用
    /// - 否则为他行占用,必须上游拦截
    pub fn claimable_for(&self, line_id: &str) -> bool {
        match &self.claiming_line_id {
            None => true,
            Some(current) => current == line_id,
        }
    }
}

// ==========================================
// ProductDetail - 商品计量基准
// ==========================================
// 用途: SELLING 精确计量校验 / INTERNAL 超量软校验的基准值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product_id: String,    // 商品 ID
    pub measure_unit: String,  // 计量单位(如 "kg")
    pub measure_value: f64,    // 规范计量值(单件基准)
}
