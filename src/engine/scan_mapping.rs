// ==========================================
// 仓库扫码对账系统 - 扫码映射表
// ==========================================
// 职责: 库存单元 ID → 明细行 ID 的客户端瞬态映射
// 生命周期: 单据打开时构建,离开单据即丢弃
// 红线: 替换成功时原位改写(旧单元 → 新单元),不产生重复条目
// ==========================================

use crate::domain::document::Document;
use std::collections::HashMap;

// ==========================================
// ScanMapping - 扫码映射表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ScanMapping {
    entries: HashMap<String, String>, // unit_id → line_id
}

impl ScanMapping {
    /// 空映射表
    pub fn new() -> Self {
        Self::default()
    }

    /// 按单据构建映射表(各明细行的已占用单元)
    pub fn build(document: &Document) -> Self {
        let mut entries = HashMap::new();
        for line in &document.lines {
            for unit_id in &line.claimed_unit_ids {
                entries.insert(unit_id.clone(), line.line_id.clone());
            }
        }
        Self { entries }
    }

    /// 查询单元所属的明细行
    pub fn line_for(&self, unit_id: &str) -> Option<&str> {
        self.entries.get(unit_id).map(|s| s.as_str())
    }

    /// 替换成功后的原位改写: old → new
    ///
    /// # 规则
    /// - 旧条目存在 → 删除旧键,写入新键(继承明细行)
    /// - 旧条目不存在 → 直接插入新条目
    pub fn remap(&mut self, old_unit_id: &str, new_unit_id: &str, line_id: &str) {
        self.entries.remove(old_unit_id);
        self.entries
            .insert(new_unit_id.to_string(), line_id.to_string());
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
