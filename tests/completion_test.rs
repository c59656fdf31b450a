// ==========================================
// CompletionDetector 集成测试
// ==========================================
// 测试目标: 行/单据完成判定与下一步提示
// 覆盖范围: 件数口径、权威状态口径、降级口径、下一未完成行
// ==========================================

mod helpers;

use helpers::{make_document, make_line, MockGateway};
use std::sync::Arc;
use wms_scan_core::config::ScanConfig;
use wms_scan_core::domain::types::{DocumentType, LineStatus};
use wms_scan_core::engine::completion::{CompletionDetector, NextAction};

fn detector(gateway: Arc<MockGateway>) -> CompletionDetector {
    CompletionDetector::new(gateway, ScanConfig::default().tracking_timeout())
}

#[tokio::test]
async fn test_selling_line_incomplete_no_next() {
    let gateway = Arc::new(MockGateway::new());
    let detector = detector(gateway);
    let mut line = make_line("L1", "P1", 3, 24.0);
    line.counted_qty = 2;
    let doc = make_document("D1", DocumentType::Selling, vec![line]);

    let outcome = detector.after_count("L1", &doc).await.unwrap();
    assert!(!outcome.line_complete);
    assert!(outcome.authoritative);
    assert_eq!(outcome.next, None);
}

#[tokio::test]
async fn test_selling_line_complete_points_to_next_line() {
    let gateway = Arc::new(MockGateway::new());
    let detector = detector(gateway);
    let mut l1 = make_line("L1", "P1", 3, 24.0);
    l1.counted_qty = 3;
    let l2 = make_line("L2", "P2", 2, 10.0);
    let doc = make_document("D1", DocumentType::Selling, vec![l1, l2]);

    let outcome = detector.after_count("L1", &doc).await.unwrap();
    assert!(outcome.line_complete);
    assert_eq!(
        outcome.next,
        Some(NextAction::ContinueLine {
            line_id: "L2".to_string(),
            product_id: "P2".to_string(),
        })
    );
}

#[tokio::test]
async fn test_selling_all_lines_complete_document_complete() {
    let gateway = Arc::new(MockGateway::new());
    let detector = detector(gateway);
    let mut l1 = make_line("L1", "P1", 3, 24.0);
    l1.counted_qty = 3;
    let mut l2 = make_line("L2", "P2", 2, 10.0);
    l2.counted_qty = 2;
    let doc = make_document("D1", DocumentType::Selling, vec![l1, l2]);

    let outcome = detector.after_count("L1", &doc).await.unwrap();
    assert_eq!(outcome.next, Some(NextAction::DocumentComplete));
}

#[tokio::test]
async fn test_internal_fresh_status_overrides_local_qty() {
    // 本地件数 1/3 未到,但后端行状态已 MATCH → 权威口径判完成
    let mut backend_line = make_line("L1", "P1", 3, 30.0);
    backend_line.status = LineStatus::Match;
    let gateway = Arc::new(MockGateway::new().with_line(backend_line));
    let detector = detector(gateway);

    let mut local_line = make_line("L1", "P1", 3, 30.0);
    local_line.counted_qty = 1;
    let doc = make_document("D1", DocumentType::Internal, vec![local_line]);

    let outcome = detector.after_count("L1", &doc).await.unwrap();
    assert!(outcome.line_complete);
    assert!(outcome.authoritative);
}

#[tokio::test]
async fn test_internal_fresh_status_holds_back_completion() {
    // 本地件数已到,但后端行状态仍在清点中 → 权威口径判未完成
    let mut backend_line = make_line("L1", "P1", 3, 30.0);
    backend_line.status = LineStatus::Counting;
    let gateway = Arc::new(MockGateway::new().with_line(backend_line));
    let detector = detector(gateway);

    let mut local_line = make_line("L1", "P1", 3, 30.0);
    local_line.counted_qty = 3;
    let doc = make_document("D1", DocumentType::Internal, vec![local_line]);

    let outcome = detector.after_count("L1", &doc).await.unwrap();
    assert!(!outcome.line_complete);
    assert!(outcome.authoritative);
}

#[tokio::test]
async fn test_internal_fetch_failure_degrades_to_qty() {
    // 行状态拉取失败 → 降级为件数比较,authoritative=false
    let gateway = Arc::new(MockGateway::new().with_line(make_line("L1", "P1", 3, 30.0)));
    gateway.set_fail_fetch_line(true);
    let detector = detector(gateway);

    let mut local_line = make_line("L1", "P1", 3, 30.0);
    local_line.counted_qty = 3;
    let doc = make_document("D1", DocumentType::Internal, vec![local_line]);

    let outcome = detector.after_count("L1", &doc).await.unwrap();
    assert!(outcome.line_complete);
    assert!(!outcome.authoritative);
}

#[tokio::test]
async fn test_internal_next_line_uses_fresh_status_per_line() {
    // L2 本地件数已到,但后端状态未完成 → 仍被提名为下一行
    let mut backend_l1 = make_line("L1", "P1", 1, 10.0);
    backend_l1.status = LineStatus::Completed;
    let mut backend_l2 = make_line("L2", "P2", 2, 10.0);
    backend_l2.status = LineStatus::Counting;
    let gateway = Arc::new(
        MockGateway::new()
            .with_line(backend_l1)
            .with_line(backend_l2),
    );
    let detector = detector(gateway);

    let local_l1 = make_line("L1", "P1", 1, 10.0);
    let mut local_l2 = make_line("L2", "P2", 2, 10.0);
    local_l2.counted_qty = 2;
    let doc = make_document("D1", DocumentType::Internal, vec![local_l1, local_l2]);

    let outcome = detector.after_count("L1", &doc).await.unwrap();
    assert!(outcome.line_complete);
    assert_eq!(
        outcome.next,
        Some(NextAction::ContinueLine {
            line_id: "L2".to_string(),
            product_id: "P2".to_string(),
        })
    );
}
