use std::fs;

use crate::support::{
    helpers::{
        asset_platform, catalog_ids, exchange, init_tracing, listed, market, read_json, read_text,
        runner_for, TEST_API_KEY,
    },
    mock_provider::{MockCatalogs, MockProviderServer},
};
use coincache::CatalogKind;
use serde_json::{json, Value};

fn coin_catalogs() -> MockCatalogs {
    MockCatalogs::new()
        .with_api_key(TEST_API_KEY)
        .with_listing(
            "coins/list",
            vec![
                listed("bitcoin", "btc", json!({})),
                listed("ethereum", "eth", json!({ "": "" })),
                listed(
                    "usd-coin",
                    "usdc",
                    json!({ "ethereum": "0xa0b8", "polygon-pos": "0x2791", "solana": "" }),
                ),
                listed("bridged-usdc", "usdc", json!({ "polygon-pos": "0x2791" })),
                listed("weird", "a/b", json!({})),
            ],
        )
        .with_listing(
            "coins/markets",
            vec![
                market("usd-coin", "usdc", Some(6)),
                market("weird", "a/b", None),
                market("bitcoin", "btc", Some(1)),
                market("bridged-usdc", "usdc", Some(900)),
                market("ethereum", "eth", Some(2)),
            ],
        )
}

#[tokio::test]
async fn coins_are_ranked_and_indexed() {
    init_tracing();
    let catalogs = coin_catalogs();
    let server = MockProviderServer::start(catalogs.clone())
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), Some(TEST_API_KEY));

    let reports = runner.run(&[CatalogKind::Coins]).await.expect("coins sync");

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].written, 5);
    assert_eq!(
        catalog_ids(dir.path(), "coins"),
        vec!["bitcoin", "ethereum", "usd-coin", "bridged-usdc", "weird"]
    );
    assert_eq!(read_text(dir.path(), "coins/count"), "5");

    let all = read_json(dir.path(), "coins/all.json");
    assert_eq!(
        all[0],
        json!({
            "id": "bitcoin",
            "image": "https://assets.example/bitcoin.png",
            "name": "BITCOIN",
            "symbol": "btc",
            "platforms": {},
            "market_cap_rank": 1,
        })
    );
    assert!(all[4].get("market_cap_rank").is_none());

    // Symbols: the ethereum-deployed coin wins the shared `usdc`.
    assert_eq!(read_text(dir.path(), "coins/s/btc"), "bitcoin");
    assert_eq!(read_text(dir.path(), "coins/s/eth"), "ethereum");
    assert_eq!(read_text(dir.path(), "coins/s/usdc"), "usd-coin");
    let mut symbols: Vec<_> = fs::read_dir(dir.path().join("coins/s"))
        .expect("symbol namespace")
        .map(|entry| entry.expect("dir entry").file_name().into_string().unwrap())
        .collect();
    symbols.sort();
    assert_eq!(symbols, vec!["btc", "eth", "usdc"]);

    // Contracts: later coin in catalog order overwrites a shared address.
    assert_eq!(read_text(dir.path(), "coins/a/ethereum/0xa0b8"), "usd-coin");
    assert_eq!(read_text(dir.path(), "coins/a/polygon-pos/0x2791"), "bridged-usdc");
    let solana = dir.path().join("coins/a/solana");
    assert!(solana.is_dir());
    assert_eq!(fs::read_dir(solana).unwrap().count(), 0);

    let list = catalogs.requests_to("coins/list");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].param("include_platform"), Some("true"));
    assert_eq!(list[0].param("page"), None);

    let markets = catalogs.requests_to("coins/markets");
    assert_eq!(markets.len(), 1);
    assert_eq!(markets[0].param("x_cg_demo_api_key"), Some(TEST_API_KEY));
    assert_eq!(markets[0].param("vs_currency"), Some("usd"));
    assert_eq!(markets[0].param("order"), Some("market_cap_desc"));
    assert_eq!(markets[0].param("per_page"), Some("250"));
    assert_eq!(markets[0].page(), Some(1));

    server.shutdown().await;
}

fn exchange_listing() -> Vec<Value> {
    let mut records: Vec<Value> = (0..260u64)
        .map(|i| exchange(&format!("ex-{i:03}"), Some(i + 1)))
        .collect();
    // Re-listed on the second page after losing its rank.
    records.push(exchange("ex-005", None));
    records
}

#[tokio::test]
async fn exchanges_span_pages_and_drop_cross_page_duplicates() {
    init_tracing();
    let catalogs = MockCatalogs::new().with_listing("exchanges", exchange_listing());
    let server = MockProviderServer::start(catalogs.clone())
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), None);

    let reports = runner
        .run(&[CatalogKind::Exchanges])
        .await
        .expect("exchanges sync");

    let report = &reports[0];
    assert_eq!(report.pages, 2);
    assert_eq!(report.fetched, 261);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.written, 260);

    let pages: Vec<_> = catalogs
        .requests_to("exchanges")
        .iter()
        .map(|request| request.page())
        .collect();
    assert_eq!(pages, vec![Some(1), Some(2)]);

    let all = read_json(dir.path(), "exchanges/all.json");
    let records = all.as_array().unwrap();
    assert_eq!(records[0]["id"], "ex-000");
    assert_eq!(records[5]["id"], "ex-005");
    assert_eq!(records[5]["trust_score_rank"], 6);
    assert!(records[0].get("country").is_none());
    assert!(records[0].get("trade_volume_24h_btc").is_none());
    assert_eq!(read_text(dir.path(), "exchanges/count"), "260");
    assert_eq!(runner.telemetry().snapshot().duplicates_removed, 1);

    server.shutdown().await;
}

#[tokio::test]
async fn rerun_produces_identical_bytes() {
    init_tracing();
    let catalogs = MockCatalogs::new().with_listing("exchanges", exchange_listing());
    let server = MockProviderServer::start(catalogs)
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), None);

    runner.run(&[CatalogKind::Exchanges]).await.expect("first run");
    let first_all = fs::read(dir.path().join("exchanges/all.json")).unwrap();
    let first_count = fs::read(dir.path().join("exchanges/count")).unwrap();

    runner.run(&[CatalogKind::Exchanges]).await.expect("second run");
    assert_eq!(fs::read(dir.path().join("exchanges/all.json")).unwrap(), first_all);
    assert_eq!(fs::read(dir.path().join("exchanges/count")).unwrap(), first_count);
    assert!(!first_all.ends_with(b"\n"));

    server.shutdown().await;
}

#[tokio::test]
async fn asset_platforms_keep_listing_position() {
    init_tracing();
    let catalogs = MockCatalogs::new().with_listing(
        "asset_platforms",
        vec![
            asset_platform("polygon-pos", Some(137)),
            asset_platform("ethereum", Some(1)),
            asset_platform("osmosis", None),
        ],
    );
    let server = MockProviderServer::start(catalogs.clone())
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), None);

    runner
        .run(&[CatalogKind::AssetPlatforms])
        .await
        .expect("asset platform sync");

    let all = read_json(dir.path(), "asset-platforms/all.json");
    let summary: Vec<_> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|record| (record["id"].as_str().unwrap(), record["index"].as_u64().unwrap()))
        .collect();
    assert_eq!(summary, vec![("ethereum", 1), ("osmosis", 2), ("polygon-pos", 0)]);
    assert!(all[1].get("chain_identifier").is_none());
    assert_eq!(
        catalogs.requests_to("asset_platforms")[0].param("per_page"),
        Some("1000")
    );

    server.shutdown().await;
}

#[tokio::test]
async fn coin_data_writes_a_snapshot_per_coin() {
    init_tracing();
    let catalogs = coin_catalogs();
    let server = MockProviderServer::start(catalogs)
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), Some(TEST_API_KEY));

    let reports = runner
        .run(&[CatalogKind::CoinData])
        .await
        .expect("coin data sync");

    assert_eq!(reports[0].written, 5);
    assert_eq!(reports[0].extra_entries, 5);
    assert_eq!(
        catalog_ids(dir.path(), "coin-data"),
        vec!["bitcoin", "bridged-usdc", "ethereum", "usd-coin", "weird"]
    );
    assert_eq!(
        read_json(dir.path(), "coin-data/bitcoin"),
        json!({
            "id": "bitcoin",
            "image": "https://assets.example/bitcoin.png",
            "name": "BITCOIN",
            "symbol": "btc",
            "current_price": 1.5,
            "market_cap": 1_000_000,
            "last_updated": "2024-04-07T16:49:31.736Z",
        })
    );
    assert!(!dir.path().join("coin-data/s").exists());

    server.shutdown().await;
}

#[tokio::test]
async fn default_run_syncs_every_catalog_in_order() {
    init_tracing();
    let catalogs = coin_catalogs()
        .with_listing("exchanges", vec![exchange("kraken", Some(2)), exchange("binance", Some(1))])
        .with_listing("asset_platforms", vec![asset_platform("ethereum", Some(1))]);
    let server = MockProviderServer::start(catalogs)
        .await
        .expect("mock provider must start");
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = runner_for(&server, dir.path(), Some(TEST_API_KEY));

    let reports = runner.run(&[]).await.expect("full sync");

    let order: Vec<_> = reports.iter().map(|report| report.catalog).collect();
    assert_eq!(order, vec!["coins", "exchanges", "asset-platforms", "coin-data"]);
    for catalog in order {
        assert!(dir.path().join(catalog).join("all.json").is_file());
    }
    assert_eq!(catalog_ids(dir.path(), "exchanges"), vec!["binance", "kraken"]);
    assert!(runner.provider_metrics().total_requests >= 5);

    server.shutdown().await;
}
