//! Token issuance end to end on SQLite

mod common;

use common::{Harness, NOW};
use jumpqueue_core::application::LookupRequest;
use jumpqueue_core::domain::{AccessCode, CodeNumber, Lane};
use jumpqueue_core::port::{
    AccessCodeCriteria, AccessCodeRepository, StatusFilter, VisitorCriteria, VisitorRepository,
};
use jumpqueue_core::AppError;

#[tokio::test]
async fn test_fresh_lane_issues_sequentially() {
    let h = Harness::new().await;
    h.queue("q1", 0).await;

    let mut numbers = Vec::new();
    for i in 1..=3 {
        h.visitor(&format!("v{}", i), "q1", false).await;
        let issued = h
            .service
            .issue_visitor_code(&format!("tok-v{}", i))
            .await
            .unwrap();
        numbers.push(issued.access_code.code.value());
    }

    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(h.row_count().await, 3);
}

#[tokio::test]
async fn test_wraparound_after_999() {
    let h = Harness::new().await;
    h.queue("q1", 0).await;
    h.seed("q1", 999, Lane::Normal).await;
    h.visitor("v1", "q1", false).await;

    let issued = h.service.issue_visitor_code("tok-v1").await.unwrap();

    assert_eq!(issued.access_code.code, CodeNumber::MIN);
}

#[tokio::test]
async fn test_vip_codes_do_not_advance_normal_lane() {
    let h = Harness::new().await;
    h.queue("q1", 0).await;
    h.seed("q1", 50, Lane::Normal).await;
    h.seed("q1", 1, Lane::Priority).await;

    for i in 1..=5 {
        h.visitor(&format!("vip{}", i), "q1", false).await;
        let issued = h
            .service
            .issue_vip_code(&format!("tok-vip{}", i))
            .await
            .unwrap();
        assert_eq!(issued.access_code.code.value(), 1 + i as u16);
        assert!(issued.access_code.lane.is_priority());
    }

    h.visitor("v1", "q1", false).await;
    let normal = h.service.issue_visitor_code("tok-v1").await.unwrap();
    assert_eq!(normal.access_code.code.value(), 51);
}

#[tokio::test]
async fn test_vip_lane_without_prior_code_is_not_found() {
    let h = Harness::new().await;
    h.queue("q1", 0).await;
    h.visitor("v1", "q1", false).await;

    let result = h.service.issue_vip_code("tok-v1").await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(h.row_count().await, 0);
}

#[tokio::test]
async fn test_issuance_validates_visitor_and_records_consent() {
    let h = Harness::new().await;
    h.queue("q1", 0).await;
    let mut visitor = h.visitor("v1", "q1", false).await;
    visitor.consent = true;
    h.visitors.save(&visitor).await.unwrap();

    h.service.issue_visitor_code("tok-v1").await.unwrap();

    let stored = h
        .visitors
        .find(&VisitorCriteria::by_token("tok-v1"))
        .await
        .unwrap();
    assert!(stored[0].validated);

    let info: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visitor_info WHERE queue_id = 'q1'")
        .fetch_one(&h.pool)
        .await
        .unwrap();
    assert_eq!(info, 1);
}

#[tokio::test]
async fn test_estimate_floor_and_history() {
    let h = Harness::new().await;
    h.queue("floor", 5).await;
    h.queue("busy", 0).await;

    h.visitor("f1", "floor", false).await;
    let floored = h.service.issue_visitor_code("tok-f1").await.unwrap();
    assert_eq!(floored.access_code.estimated_at, NOW + 300_000);

    // Ten completed codes of 60s each, then three still waiting
    for i in 0..10 {
        let start = NOW - 3_600_000 + i * 120_000;
        let mut c = AccessCode::new(
            format!("done-{}", i),
            start - 1_000,
            "busy",
            CodeNumber::new(i + 1).unwrap(),
            Lane::Normal,
        );
        c.started_at = Some(start);
        c.finished_at = Some(start + 60_000);
        h.codes.insert(&c).await.unwrap();
    }
    for i in 0..3 {
        let c = AccessCode::new(
            format!("wait-{}", i),
            NOW - 10_000,
            "busy",
            CodeNumber::new(11 + i).unwrap(),
            Lane::Normal,
        );
        h.codes.insert(&c).await.unwrap();
    }

    let preview = h
        .service
        .estimator()
        .estimate_by_queue_id("busy")
        .await
        .unwrap();
    assert_eq!(preview, NOW + 180_000);

    h.visitor("b1", "busy", false).await;
    let issued = h.service.issue_visitor_code("tok-b1").await.unwrap();

    assert_eq!(issued.access_code.code.value(), 14);
    assert_eq!(issued.access_code.estimated_at, NOW + 180_000);
    assert!(issued.access_code.estimated_at >= NOW);
}

#[tokio::test]
async fn test_attend_then_query() {
    let h = Harness::new().await;
    h.queue("q1", 0).await;
    h.visitor("v1", "q1", false).await;

    let issued = h.service.issue_visitor_code("tok-v1").await.unwrap();
    let mut code = issued.access_code;

    code.start(NOW + 10_000).unwrap();
    h.codes.update(&code).await.unwrap();

    let attending = h.service.attending_access_code("q1").await.unwrap();
    assert_eq!(attending.access_code.id, code.id);

    code.complete(NOW + 70_000).unwrap();
    h.codes.update(&code).await.unwrap();

    let none = h.service.attending_access_code("q1").await;
    assert!(matches!(none, Err(AppError::NotFound(_))));

    h.service.delete_access_code(&code.id).await.unwrap();
    let gone = h.service.find_access_code(&code.id).await;
    assert!(matches!(gone, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_failed_vip_issuance_rolls_back_validation() {
    let h = Harness::new().await;
    h.queue("q1", 0).await;
    h.seed("q1", 10, Lane::Normal).await;
    h.visitor("v1", "q1", false).await;

    let vip = h.service.issue_vip_code("tok-v1").await;
    assert!(matches!(vip, Err(AppError::NotFound(_))));

    let stored = h
        .visitors
        .find(&VisitorCriteria::by_token("tok-v1"))
        .await
        .unwrap();
    assert!(!stored[0].validated);

    let lookup = h
        .service
        .lookup_or_issue(LookupRequest {
            identificator: "ID-v1".to_string(),
            email: Some("v1@example.com".to_string()),
            phone: None,
            queue_id: "q1".to_string(),
        })
        .await;
    assert!(matches!(lookup, Err(AppError::PreconditionFailed(_))));
    assert_eq!(h.row_count().await, 1);
}

#[tokio::test]
async fn test_same_token_twice_keeps_one_active_code() {
    let h = Harness::new().await;
    h.queue("q1", 0).await;
    h.visitor("v1", "q1", false).await;

    let first = h.service.issue_visitor_code("tok-v1").await.unwrap();
    h.clock.advance_secs(45);
    let second = h.service.issue_visitor_code("tok-v1").await.unwrap();

    assert_eq!(first.access_code.id, second.access_code.id);
    assert_eq!(second.access_code.code.value(), 1);
    assert_eq!(second.access_code.estimated_at, NOW + 45_000);

    let active = h
        .codes
        .search(&AccessCodeCriteria {
            queue_id: Some("q1".to_string()),
            identificator: Some("ID-v1".to_string()),
            status: StatusFilter::Unconsumed,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].estimated_at, NOW + 45_000);
}
