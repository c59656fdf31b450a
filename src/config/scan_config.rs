// ==========================================
// 仓库扫码对账系统 - 扫码配置
// ==========================================
// 职责: 防抖窗口、占用流转超时、消息展示窗口的集中配置
// 红线: 引擎不读墙钟、不读环境,全部阈值由此注入
// ==========================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// ScanConfig - 扫码核对配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 同码冷却窗口(毫秒): 上次成功处理后同码重扫的拒绝窗口
    pub cooldown_ms: i64,

    /// 全局最小间隔(毫秒): 距上次被接受的提交的粗粒度限速
    pub min_spacing_ms: i64,

    /// 安定窗口(毫秒): 处理完成后重新放行前的等待,防相机立即重读
    pub settle_ms: i64,

    /// 占用/释放请求的有界等待(毫秒),超出按失败处理
    pub tracking_timeout_ms: u64,

    /// 错误消息自动清除的展示窗口(毫秒),由 UI 计时
    pub message_display_ms: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 3000,
            min_spacing_ms: 2000,
            settle_ms: 2000,
            tracking_timeout_ms: 10_000,
            message_display_ms: 3000,
        }
    }
}

impl ScanConfig {
    /// 从 JSON 字符串加载配置(缺省字段回落默认值)
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 占用/释放的有界等待
    pub fn tracking_timeout(&self) -> Duration {
        Duration::from_millis(self.tracking_timeout_ms)
    }
}
