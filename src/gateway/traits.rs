// ==========================================
// 仓库扫码对账系统 - 后端网关 Trait
// ==========================================
// 职责: 定义核心所需的后端协作接口(不包含实现)
// 红线: 不包含业务规则、不包含本地持久化
// ==========================================

use crate::domain::document::DocumentLine;
use crate::domain::unit::{ProductDetail, StockUnit};
use crate::gateway::error::GatewayResult;
use async_trait::async_trait;

// ==========================================
// WarehouseGateway Trait
// ==========================================
// 用途: 扫码对账核心消费的全部后端操作
// 实现者: HTTP 客户端适配层(本 crate 之外)
#[async_trait]
pub trait WarehouseGateway: Send + Sync {
    // ===== 查询 =====

    /// 按单元 ID 查询库存单元
    ///
    /// # 返回
    /// - StockUnit: 含最新占用引用与生命周期状态
    /// - NotFound: 单元不存在
    async fn fetch_unit_by_id(&self, unit_id: &str) -> GatewayResult<StockUnit>;

    /// 查询明细行的同商品单元集(含本行已占用单元与可供占用的候选)
    async fn fetch_units_by_line(&self, line_id: &str) -> GatewayResult<Vec<StockUnit>>;

    /// 重新拉取明细行(状态为最新值)
    ///
    /// # 用途
    /// - INTERNAL 单据完成判定的权威路径
    async fn fetch_line_by_id(&self, line_id: &str) -> GatewayResult<DocumentLine>;

    /// 查询商品计量基准
    async fn fetch_product_detail(&self, product_id: &str) -> GatewayResult<ProductDetail>;

    // ===== 占用流转 =====

    /// 将单元占用到明细行
    ///
    /// # 错误
    /// - ClaimConflict: 后端判定该单元已被他行占用(权威)
    async fn claim_unit(&self, line_id: &str, unit_id: &str) -> GatewayResult<()>;

    /// 释放单元占用
    async fn release_unit(&self, line_id: &str, unit_id: &str) -> GatewayResult<()>;

    // ===== 替换 =====

    /// 后端换件: 用候选单元替换原单元
    ///
    /// # 参数
    /// - reason: 操作员填写的替换原因(非空)
    async fn swap_unit(
        &self,
        original_unit_id: &str,
        candidate_unit_id: &str,
        reason: &str,
    ) -> GatewayResult<()>;
}
