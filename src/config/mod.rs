// ==========================================
// 仓库扫码对账系统 - 配置层模块
// ==========================================

pub mod scan_config;

pub use scan_config::ScanConfig;
