use integration_tests::{TestApp, T0};
use pb_core::error::{AppError, NotFoundReason};
use pb_core::traits::PasteStore;
use serde_json::json;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn exactly_n_consumes_succeed() {
    for n in 1..=5u64 {
        let app = TestApp::new();
        let record = assert_ok!(
            app.engine
                .create(&json!({ "content": "x", "max_views": n }), T0)
                .await
        );

        for expected in 1..=n {
            let consumed = assert_ok!(app.engine.consume(&record.id, T0).await);
            assert_eq!(consumed.views, expected);
            assert_eq!(consumed.remaining_views(), Some(n - expected));
        }

        let err = assert_err!(app.engine.consume(&record.id, T0).await);
        assert!(matches!(err, AppError::NotFound(NotFoundReason::ViewLimitExceeded)));
        assert_eq!(app.store.get(&record.id).await.unwrap().unwrap().views, n);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_consumers_never_overspend() {
    let app = TestApp::new();
    let record = app
        .engine
        .create(&json!({ "content": "x", "max_views": 10 }), T0)
        .await
        .unwrap();

    let engine = Arc::new(app.engine.clone());
    let handles: Vec<_> = (0..50)
        .map(|_| {
            let engine = engine.clone();
            let id = record.id.clone();
            tokio::spawn(async move { engine.consume(&id, T0).await })
        })
        .collect();

    let mut served: u64 = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => served += 1,
            Err(AppError::NotFound(NotFoundReason::ViewLimitExceeded)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    let stored = app.store.get(&record.id).await.unwrap().unwrap();
    assert_eq!(served, 10);
    assert_eq!(stored.views, 10);
}

#[tokio::test]
async fn unlimited_pastes_count_views_without_limit() {
    let app = TestApp::new();
    let record = app
        .engine
        .create(&json!({ "content": "x" }), T0)
        .await
        .unwrap();

    for _ in 0..25 {
        assert_ok!(app.engine.consume(&record.id, T0).await);
    }
    let view = assert_ok!(app.engine.inspect(&record.id, T0).await);
    assert_eq!(view.remaining_views, None);
    assert_eq!(app.store.get(&record.id).await.unwrap().unwrap().views, 25);
}

#[tokio::test]
async fn expiry_beats_remaining_budget() {
    let app = TestApp::new();
    let record = app
        .engine
        .create(&json!({ "content": "x", "ttl_seconds": 1, "max_views": 5 }), T0)
        .await
        .unwrap();

    assert_ok!(app.engine.consume(&record.id, T0 + 999).await);

    let err = assert_err!(app.engine.consume(&record.id, T0 + 1_000).await);
    assert!(matches!(err, AppError::NotFound(NotFoundReason::Expired)));
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn exhausted_pastes_remain_inspectable() {
    let app = TestApp::new();
    let record = app
        .engine
        .create(&json!({ "content": "x", "max_views": 1 }), T0)
        .await
        .unwrap();

    assert_ok!(app.engine.consume(&record.id, T0).await);
    assert_err!(app.engine.consume(&record.id, T0).await);

    let view = assert_ok!(app.engine.inspect(&record.id, T0).await);
    assert_eq!(view.remaining_views, Some(0));
    assert_eq!(app.store.len(), 1);
}
