// ==========================================
// 仓库扫码对账系统 - 扫码防抖器
// ==========================================
// 职责: 抑制重复/连发扫码,串行化整条处理链
// 红线: 纯内存计数与时间戳,无 I/O,不读墙钟(now 由调用方注入)
// ==========================================

use crate::config::ScanConfig;
use chrono::{DateTime, Utc};

// ==========================================
// ScanVerdict - 防抖裁决
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    Accepted,
    Rejected(DebounceReject),
}

impl ScanVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ScanVerdict::Accepted)
    }
}

// ==========================================
// DebounceReject - 拒绝原因
// ==========================================
// 防抖层拒绝属时序错误,静默丢弃,不上屏
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceReject {
    /// 上一次扫码仍在处理中
    InFlight { processing_code: String },
    /// 处理完成后的安定窗口内(防相机立即重读)
    Settling { remaining_ms: i64 },
    /// 同码冷却: 距上次成功处理同码不足冷却窗口
    Cooldown { remaining_ms: i64 },
    /// 全局限速: 距上次被接受的提交不足最小间隔
    MinSpacing { remaining_ms: i64 },
}

// ==========================================
// ScanDebouncer - 扫码防抖器
// ==========================================
// 状态: 在途码 / 最近成功码与时刻 / 最近接受时刻 / 安定截止
#[derive(Debug, Clone)]
pub struct ScanDebouncer {
    cooldown_ms: i64,
    min_spacing_ms: i64,
    settle_ms: i64,
    in_flight: Option<String>,
    last_success: Option<(String, DateTime<Utc>)>,
    last_accepted_at: Option<DateTime<Utc>>,
    settle_until: Option<DateTime<Utc>>,
}

impl ScanDebouncer {
    /// 按配置创建防抖器
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            cooldown_ms: config.cooldown_ms,
            min_spacing_ms: config.min_spacing_ms,
            settle_ms: config.settle_ms,
            in_flight: None,
            last_success: None,
            last_accepted_at: None,
            settle_until: None,
        }
    }

    /// 提交一次扫码
    ///
    /// # 规则(按序判定)
    /// 1. 存在在途码 → 拒绝(接受通道在完成回报前整体关闭)
    /// 2. 处于安定窗口 → 拒绝
    /// 3. 同码且距上次成功处理不足冷却窗口 → 拒绝
    /// 4. 距上次被接受的提交不足最小间隔(与码无关) → 拒绝
    /// 5. 接受: 立即标记在途并记录接受时刻
    ///
    /// # 参数
    /// - code: 解码后的扫码内容
    /// - now: 调用方注入的当前时刻
    pub fn submit(&mut self, code: &str, now: DateTime<Utc>) -> ScanVerdict {
        // 规则 1: 在途互斥
        if let Some(processing) = &self.in_flight {
            return ScanVerdict::Rejected(DebounceReject::InFlight {
                processing_code: processing.clone(),
            });
        }

        // 规则 2: 安定窗口
        if let Some(until) = self.settle_until {
            let remaining = (until - now).num_milliseconds();
            if remaining > 0 {
                return ScanVerdict::Rejected(DebounceReject::Settling {
                    remaining_ms: remaining,
                });
            }
        }

        // 规则 3: 同码冷却
        if let Some((last_code, at)) = &self.last_success {
            if last_code == code {
                let elapsed = (now - *at).num_milliseconds();
                if elapsed < self.cooldown_ms {
                    return ScanVerdict::Rejected(DebounceReject::Cooldown {
                        remaining_ms: self.cooldown_ms - elapsed,
                    });
                }
            }
        }

        // 规则 4: 全局最小间隔
        if let Some(at) = self.last_accepted_at {
            let elapsed = (now - at).num_milliseconds();
            if elapsed < self.min_spacing_ms {
                return ScanVerdict::Rejected(DebounceReject::MinSpacing {
                    remaining_ms: self.min_spacing_ms - elapsed,
                });
            }
        }

        // 规则 5: 接受并标记在途
        self.in_flight = Some(code.to_string());
        self.last_accepted_at = Some(now);
        ScanVerdict::Accepted
    }

    /// 回报处理完成(成功或失败),重新武装安定窗口
    ///
    /// # 参数
    /// - code: 完成的扫码内容(与在途码不一致时仅清除在途标记)
    /// - success: 是否成功完成一次对账
    pub fn complete(&mut self, code: &str, success: bool, now: DateTime<Utc>) {
        self.in_flight = None;
        self.settle_until = Some(now + chrono::Duration::milliseconds(self.settle_ms));
        if success {
            self.last_success = Some((code.to_string(), now));
        }
    }

    /// 操作员取消: 完全复位,立即恢复可扫
    ///
    /// # 规则
    /// - 清除在途标记与安定窗口
    /// - 不清除成功历史(同码冷却仍然生效)
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.settle_until = None;
        self.last_accepted_at = None;
    }

    /// 当前是否有在途扫码
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}
