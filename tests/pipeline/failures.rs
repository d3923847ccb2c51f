use crate::support::{
    helpers::{asset_platform, exchange, init_tracing, listed, market, runner_for, TEST_API_KEY},
    mock_provider::{MockCatalogs, MockProviderServer},
};
use coincache::{CatalogKind, SyncError, SyncStage};
use hyper::StatusCode;
use serde_json::json;

fn full_page_of_exchanges() -> Vec<serde_json::Value> {
    (0..300u64)
        .map(|i| exchange(&format!("venue-{i:03}"), Some(i + 1)))
        .collect()
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    init_tracing();
    let catalogs = MockCatalogs::new()
        .with_listing("exchanges", vec![exchange("binance", Some(1))])
        .with_listing("coins/markets", vec![market("bitcoin", "btc", Some(1))]);
    let server = MockProviderServer::start(catalogs.clone())
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), None);

    let err = runner
        .run(&[CatalogKind::Exchanges, CatalogKind::CoinData])
        .await
        .expect_err("coin data needs a credential");

    match err.downcast_ref::<SyncError>() {
        Some(SyncError::MissingCredential { variable }) => {
            assert_eq!(*variable, "COINGECKO_API_KEY");
        }
        other => panic!("expected missing credential, got {other:?}"),
    }
    assert!(catalogs.requests().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    server.shutdown().await;
}

#[tokio::test]
async fn rejected_credential_is_a_provider_error() {
    init_tracing();
    let catalogs = MockCatalogs::new()
        .with_api_key("the-real-key")
        .with_listing("coins/list", vec![listed("bitcoin", "btc", json!({}))])
        .with_listing("coins/markets", vec![market("bitcoin", "btc", Some(1))]);
    let server = MockProviderServer::start(catalogs)
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), Some(TEST_API_KEY));

    let err = runner
        .run(&[CatalogKind::Coins])
        .await
        .expect_err("wrong key must fail");

    match err.downcast_ref::<SyncError>() {
        Some(SyncError::Provider {
            endpoint,
            page,
            message,
        }) => {
            assert_eq!(endpoint, "coins/markets");
            assert_eq!(*page, 1);
            assert_eq!(message, "invalid API key (code 10002)");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
    assert_eq!(SyncError::stage_of(&err), SyncStage::Fetch);
    assert!(!dir.path().join("coins/all.json").exists());
    assert_eq!(runner.telemetry().snapshot().provider_errors, 1);

    server.shutdown().await;
}

#[tokio::test]
async fn error_payload_mid_pagination_aborts_without_retry() {
    init_tracing();
    let catalogs = MockCatalogs::new().with_listing("exchanges", full_page_of_exchanges());
    catalogs.fail_page(
        "exchanges",
        2,
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "status": { "error_code": 429, "error_message": "You've exceeded the Rate Limit" } })
            .to_string(),
    );
    let server = MockProviderServer::start(catalogs.clone())
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), None);

    let err = runner
        .run(&[CatalogKind::Exchanges, CatalogKind::AssetPlatforms])
        .await
        .expect_err("rate limit must abort");

    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::Provider { page: 2, .. })
    ));
    let pages: Vec<_> = catalogs
        .requests_to("exchanges")
        .iter()
        .map(|request| request.page())
        .collect();
    assert_eq!(pages, vec![Some(1), Some(2)]);
    assert!(catalogs.requests_to("asset_platforms").is_empty());
    assert!(!dir.path().join("exchanges/all.json").exists());
    assert!(!dir.path().join("asset-platforms").exists());

    server.shutdown().await;
}

#[tokio::test]
async fn non_json_error_status_reports_http_status() {
    init_tracing();
    let catalogs = MockCatalogs::new().with_listing("asset_platforms", vec![]);
    catalogs.fail_page(
        "asset_platforms",
        1,
        StatusCode::SERVICE_UNAVAILABLE,
        "upstream busy",
    );
    let server = MockProviderServer::start(catalogs)
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), None);

    let err = runner
        .run(&[CatalogKind::AssetPlatforms])
        .await
        .expect_err("503 must fail");

    match err.downcast_ref::<SyncError>() {
        Some(SyncError::Provider { message, .. }) => {
            assert_eq!(message, "HTTP 503 Service Unavailable");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
    assert_eq!(runner.provider_metrics().total_errors, 1);

    server.shutdown().await;
}

#[tokio::test]
async fn object_instead_of_list_is_a_shape_error() {
    init_tracing();
    let catalogs = MockCatalogs::new();
    catalogs.fail_page(
        "asset_platforms",
        1,
        StatusCode::OK,
        json!({ "data": [asset_platform("ethereum", Some(1))] }).to_string(),
    );
    let server = MockProviderServer::start(catalogs)
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), None);

    let err = runner
        .run(&[CatalogKind::AssetPlatforms])
        .await
        .expect_err("object payload must fail");

    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::UnexpectedPayload { page: 1, .. })
    ));

    server.shutdown().await;
}

#[tokio::test]
async fn record_without_required_field_aborts_job() {
    init_tracing();
    let catalogs = MockCatalogs::new().with_listing(
        "exchanges",
        vec![exchange("binance", Some(1)), json!({ "id": "nameless", "trust_score_rank": 2 })],
    );
    let server = MockProviderServer::start(catalogs)
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), None);

    let err = runner
        .run(&[CatalogKind::Exchanges])
        .await
        .expect_err("missing name must fail");

    match err.downcast_ref::<SyncError>() {
        Some(SyncError::InvalidRecord {
            catalog,
            position,
            reason,
        }) => {
            assert_eq!(*catalog, "exchanges");
            assert_eq!(*position, 1);
            assert!(reason.contains("name"), "unexpected reason: {reason}");
        }
        other => panic!("expected invalid record, got {other:?}"),
    }
    assert_eq!(SyncError::stage_of(&err), SyncStage::Normalize);
    assert!(format!("{err:#}").contains("exchanges sync failed"));

    server.shutdown().await;
}
