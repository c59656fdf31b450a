// ==========================================
// 仓库扫码对账系统 - 网关层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 后端为事实源,CLAIM_CONFLICT 对客户端快照具有权威性
// ==========================================

use thiserror::Error;

/// 网关层错误类型
#[derive(Error, Debug)]
pub enum GatewayError {
    // ===== 资源错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    // ===== 传输错误 =====
    #[error("网络请求失败: {0}")]
    Network(String),

    #[error("请求超时: {operation}")]
    Timeout { operation: String },

    // ===== 业务冲突 =====
    #[error("占用冲突: unit_id={unit_id} 已被明细行 {line_id} 占用")]
    ClaimConflict { unit_id: String, line_id: String },

    // ===== 后端错误 =====
    #[error("后端处理失败: {0}")]
    Backend(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GatewayError {
    /// 是否为瞬时错误(可由操作员重新触发)
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::Timeout { .. })
    }
}

/// Result 类型别名
pub type GatewayResult<T> = Result<T, GatewayError>;
