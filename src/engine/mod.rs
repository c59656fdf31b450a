// ==========================================
// 仓库扫码对账系统 - 引擎层模块
// ==========================================
// 控制流: 扫码 → 防抖 → 解析 → (计数|替换) → 完成探测 → 提示
// ==========================================

// 错误类型与分类
pub mod error;

// 扫码防抖器
pub mod debounce;

// 扫码映射表
pub mod scan_mapping;

// 映射解析器
pub mod resolver;

// 占用流转跟踪器
pub mod tracking;

// 替换校验纯函数库
pub mod substitution_core;

// 替换工作流
pub mod substitution;

// 完成探测器
pub mod completion;

// 投机计数对账队列
pub mod reconcile;

// 扫码编排器(UI 面)
pub mod orchestrator;

// 重导出核心类型
pub use completion::{CompletionDetector, CountOutcome, NextAction};
pub use debounce::{DebounceReject, ScanDebouncer, ScanVerdict};
pub use error::{ErrorCategory, ScanError, ScanResult};
pub use orchestrator::{ScanOrchestrator, ScanOutcome, ScanSession};
pub use reconcile::{PendingCount, PendingState, ReconcileQueue};
pub use resolver::{MappingResolver, ResolvedScan};
pub use scan_mapping::ScanMapping;
pub use substitution::{SubstitutionOutcome, SubstitutionWorkflow};
pub use substitution_core::{SubstitutionCore, SubstitutionVerdict};
pub use tracking::TrackingTracker;
