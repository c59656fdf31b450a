// ==========================================
// MappingResolver 集成测试
// ==========================================
// 测试目标: 扫码到明细行的解析规则
// 覆盖范围: 映射命中、商品回退、终态拒绝、钉选目标行
// ==========================================

mod helpers;

use helpers::{make_document, make_line, make_unit, MockGateway};
use std::sync::Arc;
use std::time::Duration;
use wms_scan_core::config::ScanConfig;
use wms_scan_core::domain::types::DocumentType;
use wms_scan_core::engine::error::{ErrorCategory, ScanError};
use wms_scan_core::engine::resolver::{MappingResolver, ResolvedScan};
use wms_scan_core::engine::scan_mapping::ScanMapping;
use wms_scan_core::gateway::GatewayError;

fn setup() -> (MappingResolver, Arc<MockGateway>) {
    let gateway = Arc::new(
        MockGateway::new()
            .with_unit(make_unit("U1", "P1", 10.0))
            .with_unit(make_unit("U2", "P2", 5.0))
            .with_unit(make_unit("U9", "P9", 1.0)),
    );
    let bound = ScanConfig::default().tracking_timeout();
    (MappingResolver::new(gateway.clone(), bound), gateway)
}

#[tokio::test]
async fn test_resolve_known_mapping() {
    let (resolver, _) = setup();
    let mut line = make_line("L1", "P1", 2, 20.0);
    line.claimed_unit_ids.push("U1".to_string());
    let doc = make_document("D1", DocumentType::Internal, vec![line]);
    let mapping = ScanMapping::build(&doc);

    let resolved = resolver.resolve("U1", &doc, &mapping, None).await.unwrap();
    assert_eq!(
        resolved,
        ResolvedScan {
            line_id: "L1".to_string(),
            known_mapping: true,
        }
    );
}

#[tokio::test]
async fn test_resolve_falls_back_to_product_match() {
    let (resolver, _) = setup();
    let doc = make_document(
        "D1",
        DocumentType::Internal,
        vec![make_line("L1", "P1", 2, 20.0)],
    );
    let mapping = ScanMapping::build(&doc);

    // U1 未入映射表,但商品 P1 有明细行 → 意外单元路径
    let resolved = resolver.resolve("U1", &doc, &mapping, None).await.unwrap();
    assert_eq!(resolved.line_id, "L1");
    assert!(!resolved.known_mapping);
}

#[tokio::test]
async fn test_resolve_not_in_document() {
    let (resolver, _) = setup();
    let doc = make_document(
        "D1",
        DocumentType::Internal,
        vec![make_line("L1", "P1", 2, 20.0)],
    );
    let mapping = ScanMapping::build(&doc);

    // U9 属商品 P9,单据中无此商品 → 终态拒绝
    let err = resolver.resolve("U9", &doc, &mapping, None).await.unwrap_err();
    assert!(matches!(err, ScanError::NotInDocument { .. }));
}

#[tokio::test]
async fn test_resolve_unknown_code_not_in_document() {
    let (resolver, _) = setup();
    let doc = make_document(
        "D1",
        DocumentType::Internal,
        vec![make_line("L1", "P1", 2, 20.0)],
    );
    let mapping = ScanMapping::build(&doc);

    // 后端也查不到的码 → 同样按 NotInDocument 上报
    let err = resolver
        .resolve("NO_SUCH", &doc, &mapping, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::NotInDocument { .. }));
}

#[tokio::test]
async fn test_resolve_pinned_line_mismatch() {
    let (resolver, _) = setup();
    let mut l1 = make_line("L1", "P1", 2, 20.0);
    l1.claimed_unit_ids.push("U1".to_string());
    let mut l2 = make_line("L2", "P2", 1, 5.0);
    l2.claimed_unit_ids.push("U2".to_string());
    let doc = make_document("D1", DocumentType::Internal, vec![l1, l2]);
    let mapping = ScanMapping::build(&doc);

    // 钉选 L2 后扫 L1 的单元 → 定向拒绝并报出钉选商品
    let err = resolver
        .resolve("U1", &doc, &mapping, Some("L2"))
        .await
        .unwrap_err();
    match err {
        ScanError::PinnedLineMismatch { pinned_product, .. } => {
            assert_eq!(pinned_product, "商品-P2");
        }
        other => panic!("预期钉选拒绝,实际: {:?}", other),
    }
}

#[tokio::test]
async fn test_resolve_pinned_line_match_passes() {
    let (resolver, _) = setup();
    let mut l1 = make_line("L1", "P1", 2, 20.0);
    l1.claimed_unit_ids.push("U1".to_string());
    let doc = make_document("D1", DocumentType::Internal, vec![l1]);
    let mapping = ScanMapping::build(&doc);

    let resolved = resolver
        .resolve("U1", &doc, &mapping, Some("L1"))
        .await
        .unwrap();
    assert_eq!(resolved.line_id, "L1");
}

#[tokio::test]
async fn test_resolve_mutates_nothing_on_rejection() {
    let (resolver, gateway) = setup();
    let doc = make_document(
        "D1",
        DocumentType::Internal,
        vec![make_line("L1", "P1", 2, 20.0)],
    );
    let mapping = ScanMapping::build(&doc);

    let _ = resolver.resolve("U9", &doc, &mapping, None).await;

    // 拒绝路径只发生过只读查询,无占用流转
    let log = gateway.call_log();
    assert!(log.iter().all(|c| c.starts_with("fetch_unit:")));
}

// 单元查询同样有界等待: 后端悬挂不得拖死扫码链路
#[tokio::test(start_paused = true)]
async fn test_fetch_hang_is_bounded() {
    let (resolver, gateway) = setup();
    gateway.set_fetch_unit_delay(Duration::from_secs(11)); // 超出 10s 有界等待
    let doc = make_document(
        "D1",
        DocumentType::Internal,
        vec![make_line("L1", "P1", 2, 20.0)],
    );
    let mapping = ScanMapping::build(&doc);

    let err = resolver.resolve("U1", &doc, &mapping, None).await.unwrap_err();
    match err {
        ScanError::Gateway(GatewayError::Timeout { ref operation }) => {
            assert_eq!(operation, "fetch_unit_by_id");
        }
        other => panic!("预期查询超时,实际: {:?}", other),
    }
    assert_eq!(err.category(), ErrorCategory::Transient);
}
