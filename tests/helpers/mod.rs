// ==========================================
// 测试辅助: 内存版后端网关与领域构造器
// ==========================================
// 用途: 以可编程的延迟/失败注入,驱动引擎层集成测试
// ==========================================

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use wms_scan_core::domain::document::{Document, DocumentLine};
use wms_scan_core::domain::types::{DocumentStatus, DocumentType, LineStatus, UnitStatus};
use wms_scan_core::domain::unit::{ProductDetail, StockUnit};
use wms_scan_core::gateway::{GatewayError, GatewayResult, WarehouseGateway};

// ==========================================
// 领域构造器
// ==========================================

pub fn make_unit(unit_id: &str, product_id: &str, measure: f64) -> StockUnit {
    StockUnit {
        unit_id: unit_id.to_string(),
        product_id: product_id.to_string(),
        measure_value: measure,
        status: UnitStatus::Available,
        claimed_flag: false,
        claiming_line_id: None,
    }
}

pub fn make_claimed_unit(unit_id: &str, product_id: &str, measure: f64, line_id: &str) -> StockUnit {
    let mut unit = make_unit(unit_id, product_id, measure);
    unit.claimed_flag = true;
    unit.claiming_line_id = Some(line_id.to_string());
    unit
}

pub fn make_line(line_id: &str, product_id: &str, expected_qty: i32, expected_measure: f64) -> DocumentLine {
    DocumentLine {
        line_id: line_id.to_string(),
        product_id: product_id.to_string(),
        product_name: Some(format!("商品-{}", product_id)),
        expected_qty,
        expected_measure,
        counted_qty: 0,
        counted_measure: 0.0,
        claimed_unit_ids: vec![],
        status: LineStatus::Pending,
    }
}

pub fn make_document(document_id: &str, doc_type: DocumentType, lines: Vec<DocumentLine>) -> Document {
    Document {
        document_id: document_id.to_string(),
        doc_type,
        status: DocumentStatus::InProgress,
        lines,
    }
}

pub fn make_product(product_id: &str, measure: f64) -> ProductDetail {
    ProductDetail {
        product_id: product_id.to_string(),
        measure_unit: "kg".to_string(),
        measure_value: measure,
    }
}

// ==========================================
// MockGateway - 内存版后端
// ==========================================
// calls 按时间序记录全部出站操作,供时序断言
// (如"释放先于换件"这一硬不变量)
#[derive(Default)]
pub struct MockGateway {
    pub units: Mutex<HashMap<String, StockUnit>>,
    pub lines: Mutex<HashMap<String, DocumentLine>>,
    pub products: Mutex<HashMap<String, ProductDetail>>,
    pub calls: Mutex<Vec<String>>,
    /// release_unit 的人为延迟(配合虚拟时钟触发超时)
    pub release_delay: Mutex<Option<Duration>>,
    /// swap_unit 的人为延迟(配合虚拟时钟触发超时)
    pub swap_delay: Mutex<Option<Duration>>,
    /// fetch_unit_by_id 的人为延迟(配合虚拟时钟触发超时)
    pub fetch_unit_delay: Mutex<Option<Duration>>,
    /// swap_unit 强制失败
    pub fail_swap: Mutex<bool>,
    /// fetch_line_by_id 强制失败(驱动完成判定降级路径)
    pub fail_fetch_line: Mutex<bool>,
    /// claim_unit 强制冲突(模拟后端权威裁定覆盖本地快照)
    pub force_claim_conflict: Mutex<bool>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(self, unit: StockUnit) -> Self {
        self.units.lock().unwrap().insert(unit.unit_id.clone(), unit);
        self
    }

    pub fn with_line(self, line: DocumentLine) -> Self {
        self.lines.lock().unwrap().insert(line.line_id.clone(), line);
        self
    }

    pub fn with_product(self, product: ProductDetail) -> Self {
        self.products
            .lock()
            .unwrap()
            .insert(product.product_id.clone(), product);
        self
    }

    pub fn set_release_delay(&self, delay: Duration) {
        *self.release_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_swap_delay(&self, delay: Duration) {
        *self.swap_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_fetch_unit_delay(&self, delay: Duration) {
        *self.fetch_unit_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_force_claim_conflict(&self, force: bool) {
        *self.force_claim_conflict.lock().unwrap() = force;
    }

    pub fn set_fail_swap(&self, fail: bool) {
        *self.fail_swap.lock().unwrap() = fail;
    }

    pub fn set_fail_fetch_line(&self, fail: bool) {
        *self.fail_fetch_line.lock().unwrap() = fail;
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl WarehouseGateway for MockGateway {
    async fn fetch_unit_by_id(&self, unit_id: &str) -> GatewayResult<StockUnit> {
        self.record(format!("fetch_unit:{}", unit_id));
        let delay = *self.fetch_unit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.units
            .lock()
            .unwrap()
            .get(unit_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                entity: "StockUnit".to_string(),
                id: unit_id.to_string(),
            })
    }

    async fn fetch_units_by_line(&self, line_id: &str) -> GatewayResult<Vec<StockUnit>> {
        self.record(format!("fetch_units_by_line:{}", line_id));
        let product_id = self
            .lines
            .lock()
            .unwrap()
            .get(line_id)
            .map(|l| l.product_id.clone())
            .ok_or_else(|| GatewayError::NotFound {
                entity: "DocumentLine".to_string(),
                id: line_id.to_string(),
            })?;
        Ok(self
            .units
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn fetch_line_by_id(&self, line_id: &str) -> GatewayResult<DocumentLine> {
        self.record(format!("fetch_line:{}", line_id));
        if *self.fail_fetch_line.lock().unwrap() {
            return Err(GatewayError::Network("模拟行状态拉取失败".to_string()));
        }
        self.lines
            .lock()
            .unwrap()
            .get(line_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                entity: "DocumentLine".to_string(),
                id: line_id.to_string(),
            })
    }

    async fn fetch_product_detail(&self, product_id: &str) -> GatewayResult<ProductDetail> {
        self.record(format!("fetch_product:{}", product_id));
        self.products
            .lock()
            .unwrap()
            .get(product_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                entity: "ProductDetail".to_string(),
                id: product_id.to_string(),
            })
    }

    async fn claim_unit(&self, line_id: &str, unit_id: &str) -> GatewayResult<()> {
        self.record(format!("claim:{}:{}", line_id, unit_id));
        if *self.force_claim_conflict.lock().unwrap() {
            return Err(GatewayError::ClaimConflict {
                unit_id: unit_id.to_string(),
                line_id: "L_OTHER".to_string(),
            });
        }
        let mut units = self.units.lock().unwrap();
        let unit = units.get_mut(unit_id).ok_or_else(|| GatewayError::NotFound {
            entity: "StockUnit".to_string(),
            id: unit_id.to_string(),
        })?;
        if let Some(current) = &unit.claiming_line_id {
            if current != line_id {
                return Err(GatewayError::ClaimConflict {
                    unit_id: unit_id.to_string(),
                    line_id: current.clone(),
                });
            }
        }
        unit.claimed_flag = true;
        unit.claiming_line_id = Some(line_id.to_string());
        Ok(())
    }

    async fn release_unit(&self, line_id: &str, unit_id: &str) -> GatewayResult<()> {
        self.record(format!("release:{}:{}", line_id, unit_id));
        let delay = *self.release_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut units = self.units.lock().unwrap();
        if let Some(unit) = units.get_mut(unit_id) {
            unit.claimed_flag = false;
            unit.claiming_line_id = None;
        }
        Ok(())
    }

    async fn swap_unit(
        &self,
        original_unit_id: &str,
        candidate_unit_id: &str,
        _reason: &str,
    ) -> GatewayResult<()> {
        self.record(format!("swap:{}:{}", original_unit_id, candidate_unit_id));
        let delay = *self.swap_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_swap.lock().unwrap() {
            return Err(GatewayError::Backend("模拟换件失败".to_string()));
        }
        Ok(())
    }
}
