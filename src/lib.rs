// ==========================================
// 仓库扫码对账系统 - 核心库
// ==========================================
// 系统定位: 扫码对账与替换引擎(后端为唯一事实源)
// 覆盖范围: 防抖 → 解析 → 占用流转 → 替换 → 完成探测
// 外部协作: 界面/导航、鉴权、推送、相机解码、CRUD 均在本 crate 之外
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 网关层 - 后端协作接口
pub mod gateway;

// 引擎层 - 对账与替换规则
pub mod engine;

// 配置层 - 防抖窗口与超时
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DocumentStatus, DocumentType, LineStatus, UnitStatus};

// 领域实体
pub use domain::{
    Document, DocumentLine, PendingAction, ProductDetail, StockUnit, SubstitutionMode,
    SubstitutionRecord,
};

// 网关
pub use gateway::{GatewayError, GatewayResult, WarehouseGateway};

// 引擎
pub use engine::{
    CompletionDetector, ErrorCategory, MappingResolver, NextAction, ReconcileQueue,
    ScanDebouncer, ScanError, ScanMapping, ScanOrchestrator, ScanOutcome, ScanResult,
    ScanSession, SubstitutionCore, SubstitutionOutcome, SubstitutionWorkflow, TrackingTracker,
};

// 配置
pub use config::ScanConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓库扫码对账系统";
