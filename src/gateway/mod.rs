// ==========================================
// 仓库扫码对账系统 - 网关层模块
// ==========================================
// 职责: 后端协作接口与错误类型
// ==========================================

pub mod error;
pub mod traits;

pub use error::{GatewayError, GatewayResult};
pub use traits::WarehouseGateway;

use std::future::Future;
use std::time::Duration;

/// 后端调用的有界等待包装
///
/// # 规则
/// - 全部出站调用必须有界;超出时限按 Timeout 失败,绝不无限悬挂
/// - 超时是该次尝试的终态失败,不自动重试
pub async fn bounded<T>(
    bound: Duration,
    operation: &str,
    call: impl Future<Output = GatewayResult<T>>,
) -> GatewayResult<T> {
    match tokio::time::timeout(bound, call).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Timeout {
            operation: operation.to_string(),
        }),
    }
}
