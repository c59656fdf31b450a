// ==========================================
// 仓库扫码对账系统 - 领域层模块
// ==========================================

// 领域类型(枚举状态体系)
pub mod types;

// 单据与明细行
pub mod document;

// 库存单元与商品计量基准
pub mod unit;

// 替换记录与待办载荷
pub mod substitution;

// 重导出核心实体
pub use document::{Document, DocumentLine};
pub use substitution::{PendingAction, SubstitutionMode, SubstitutionRecord};
pub use unit::{ProductDetail, StockUnit};
