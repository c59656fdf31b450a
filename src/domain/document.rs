// ==========================================
// 仓库扫码对账系统 - 单据领域模型
// ==========================================
// 用途: 单据与明细行的客户端快照
// 红线: 后端为唯一事实源,本地只维护短生命周期的对账状态
// ==========================================

use crate::domain::types::{DocumentStatus, DocumentType, LineStatus};
use serde::{Deserialize, Serialize};

// ==========================================
// Document - 单据
// ==========================================
// 入库订单 / 出库请求 / 盘点请求的只读快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub document_id: String,      // 单据号
    pub doc_type: DocumentType,   // 单据类型(决定校验与完成规则)
    pub status: DocumentStatus,   // 单据状态
    pub lines: Vec<DocumentLine>, // 明细行
}

impl Document {
    /// 按明细行 ID 查找
    pub fn line_by_id(&self, line_id: &str) -> Option<&DocumentLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    /// 按明细行 ID 查找(可变)
    pub fn line_by_id_mut(&mut self, line_id: &str) -> Option<&mut DocumentLine> {
        self.lines.iter_mut().find(|l| l.line_id == line_id)
    }

    /// 按商品 ID 查找首个明细行
    pub fn line_by_product(&self, product_id: &str) -> Option<&DocumentLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// 某单元是否被本单据的其他明细行占用
    ///
    /// # 参数
    /// - unit_id: 候选单元 ID
    /// - except_line_id: 排除的明细行(通常为替换目标行)
    pub fn unit_claimed_by_other_line(&self, unit_id: &str, except_line_id: &str) -> bool {
        self.lines.iter().any(|l| {
            l.line_id != except_line_id && l.claimed_unit_ids.iter().any(|u| u == unit_id)
        })
    }
}

// ==========================================
// DocumentLine - 单据明细行
// ==========================================
// 不变量: counted_qty/counted_measure 不超过已占用单元的合法归属量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLine {
    pub line_id: String,               // 明细行 ID
    pub product_id: String,            // 商品 ID
    pub product_name: Option<String>,  // 商品名称(用于提示语)
    pub expected_qty: i32,             // 预期件数
    pub expected_measure: f64,         // 预期计量合计(如重量 kg)
    pub counted_qty: i32,              // 已清点件数
    pub counted_measure: f64,          // 已清点计量合计
    pub claimed_unit_ids: Vec<String>, // 已占用的库存单元 ID 集合
    pub status: LineStatus,            // 明细行状态
}

impl DocumentLine {
    /// 件数口径的完成判定(SELLING 口径 / INTERNAL 降级口径)
    pub fn qty_reached(&self) -> bool {
        self.counted_qty >= self.expected_qty
    }

    /// 某单元是否已占用在本行
    pub fn has_claimed_unit(&self, unit_id: &str) -> bool {
        self.claimed_unit_ids.iter().any(|u| u == unit_id)
    }

    /// 明细行占用集合换人: old → new
    ///
    /// # 规则
    /// - old 存在则原位替换,不存在则追加 new
    /// - 不产生重复条目
    pub fn swap_claimed_unit(&mut self, old_unit_id: &str, new_unit_id: &str) {
        if let Some(slot) = self
            .claimed_unit_ids
            .iter_mut()
            .find(|u| u.as_str() == old_unit_id)
        {
            *slot = new_unit_id.to_string();
        } else if !self.has_claimed_unit(new_unit_id) {
            self.claimed_unit_ids.push(new_unit_id.to_string());
        }
    }

    /// 商品展示名(无名称时回退到商品 ID)
    pub fn display_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or(&self.product_id)
    }
}
