// ==========================================
// 仓库扫码对账系统 - 投机计数对账队列
// ==========================================
// 职责: 本地先行计数(未确认态)与后端回执的对账/回滚
// 红线: 不在后端确认前原地改写明细行计数;
//       未确认条目只影响展示口径,不影响完成判定
// ==========================================

use crate::domain::document::DocumentLine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// PendingState - 条目状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingState {
    Unconfirmed, // 投机态: 等待后端回执
    Confirmed,   // 已折算入明细行
    RolledBack,  // 后端失败,已回滚
}

// ==========================================
// PendingCount - 投机计数条目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCount {
    pub entry_id: String,  // 条目 ID(UUID)
    pub line_id: String,   // 目标明细行
    pub unit_id: String,   // 对应库存单元
    pub qty_delta: i32,    // 件数增量
    pub measure_delta: f64, // 计量增量
    pub state: PendingState,
}

// ==========================================
// ReconcileQueue - 对账队列
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ReconcileQueue {
    entries: Vec<PendingCount>,
}

impl ReconcileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条投机计数(后端请求发出前调用)
    ///
    /// # 返回
    /// - 条目 ID,用于后续 confirm/rollback
    pub fn stage(&mut self, line_id: &str, unit_id: &str, qty_delta: i32, measure_delta: f64) -> String {
        let entry_id = Uuid::new_v4().to_string();
        self.entries.push(PendingCount {
            entry_id: entry_id.clone(),
            line_id: line_id.to_string(),
            unit_id: unit_id.to_string(),
            qty_delta,
            measure_delta,
            state: PendingState::Unconfirmed,
        });
        entry_id
    }

    /// 后端确认: 折算入明细行并标记 Confirmed
    ///
    /// # 规则
    /// - 仅 Unconfirmed 条目可确认;重复确认为空操作
    pub fn confirm(&mut self, entry_id: &str, line: &mut DocumentLine) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.entry_id == entry_id && e.state == PendingState::Unconfirmed)
        {
            line.counted_qty += entry.qty_delta;
            line.counted_measure += entry.measure_delta;
            entry.state = PendingState::Confirmed;
        }
    }

    /// 后端失败: 标记回滚,明细行保持不变
    pub fn rollback(&mut self, entry_id: &str) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.entry_id == entry_id && e.state == PendingState::Unconfirmed)
        {
            entry.state = PendingState::RolledBack;
        }
    }

    /// 展示口径: 已确认计数 + 未确认投机计数
    pub fn effective_qty(&self, line: &DocumentLine) -> i32 {
        let unconfirmed: i32 = self
            .entries
            .iter()
            .filter(|e| e.line_id == line.line_id && e.state == PendingState::Unconfirmed)
            .map(|e| e.qty_delta)
            .sum();
        line.counted_qty + unconfirmed
    }

    /// 当前未确认条目数
    pub fn unconfirmed_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state == PendingState::Unconfirmed)
            .count()
    }
}
