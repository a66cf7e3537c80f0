/// Integration tests for the historical series fetcher
///
/// Verifies the batch contract:
/// 1. Every unique coin id lands in exactly one of `data` / `errors`
/// 2. One failing coin never affects its siblings
/// 3. Coins are fetched in order, each behind the pacer
mod common;

use common::{chart_path, market_chart_body, CountingPacer, FakeSource};
use market_core::UpstreamError;
use market_data_services::FixedInterval;
use market_proxy::{HistoricalSeriesFetcher, MarketChartQuery};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn query(coin_ids: &[&str]) -> MarketChartQuery {
    MarketChartQuery {
        coin_ids: coin_ids.iter().map(|id| id.to_string()).collect(),
        vs_currency: "usd".to_string(),
        days: 7,
    }
}

fn unpaced_fetcher(source: Arc<FakeSource>) -> (HistoricalSeriesFetcher, Arc<CountingPacer>) {
    let pacer = Arc::new(CountingPacer::default());
    (HistoricalSeriesFetcher::new(source, pacer.clone()), pacer)
}

#[tokio::test]
async fn test_unknown_coin_does_not_fail_batch() {
    let source = Arc::new(FakeSource::new());
    source.respond(&chart_path("bitcoin"), Ok(market_chart_body(7)));
    let (fetcher, _) = unpaced_fetcher(source);

    let result = fetcher
        .get_batch_market_chart(&query(&["bitcoin", "not-a-real-coin"]))
        .await;

    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data["bitcoin"].prices.len(), 7);
    assert_eq!(result.data["bitcoin"].total_volumes.len(), 7);
    assert_eq!(
        result.errors["not-a-real-coin"],
        "Coin 'not-a-real-coin' not found on CoinGecko."
    );
}

#[tokio::test]
async fn test_blank_coin_id_fails_alone() {
    let source = Arc::new(FakeSource::new());
    source.respond(&chart_path("bitcoin"), Ok(market_chart_body(4)));
    let (fetcher, pacer) = unpaced_fetcher(source.clone());

    let result = fetcher.get_batch_market_chart(&query(&["bitcoin", ""])).await;

    assert_eq!(result.data["bitcoin"].prices.len(), 4);
    assert!(!result.data.contains_key(""));
    assert_eq!(result.errors[""], "Coin '' not found on CoinGecko.");
    assert_eq!(result.len(), 2);

    let paths: Vec<String> = source.calls().into_iter().map(|(path, _)| path).collect();
    assert_eq!(paths, vec![chart_path("bitcoin"), "/coins//market_chart".to_string()]);
    assert_eq!(pacer.count(), 2);
}

#[tokio::test]
async fn test_ids_are_partitioned_exactly() {
    let source = Arc::new(FakeSource::new());
    source
        .respond(&chart_path("bitcoin"), Ok(market_chart_body(3)))
        .respond(&chart_path("ethereum"), Ok(market_chart_body(3)))
        .respond(
            &chart_path("solana"),
            Err(UpstreamError::from_status(&chart_path("solana"), 500, "internal")),
        )
        .respond(&chart_path("cardano"), Ok(json!({ "prices": [] })));
    let (fetcher, pacer) = unpaced_fetcher(source);

    let ids = ["bitcoin", "ethereum", "solana", "cardano", "nope", "bitcoin"];
    let result = fetcher.get_batch_market_chart(&query(&ids)).await;

    let requested: BTreeSet<&str> = ids.iter().copied().collect();
    let data_keys: BTreeSet<&str> = result.data.keys().map(String::as_str).collect();
    let error_keys: BTreeSet<&str> = result.errors.keys().map(String::as_str).collect();

    assert!(data_keys.is_disjoint(&error_keys));
    assert_eq!(&data_keys | &error_keys, requested);
    assert_eq!(result.len(), requested.len());
    assert_eq!(data_keys, BTreeSet::from(["bitcoin", "ethereum"]));

    // Failed coins are paced like successful ones
    assert_eq!(pacer.count(), 5);
    assert_eq!(pacer.finished_count(), 5);
}

#[tokio::test]
async fn test_rate_limited_coin_is_isolated() {
    let source = Arc::new(FakeSource::new());
    source
        .respond(&chart_path("bitcoin"), Ok(market_chart_body(2)))
        .respond(
            &chart_path("ethereum"),
            Err(UpstreamError::from_status(
                &chart_path("ethereum"),
                429,
                "Throttled",
            )),
        )
        .respond(&chart_path("solana"), Ok(market_chart_body(2)));
    let (fetcher, _) = unpaced_fetcher(source);

    let result = fetcher
        .get_batch_market_chart(&query(&["bitcoin", "ethereum", "solana"]))
        .await;

    assert!(result.errors["ethereum"].contains("Rate limited"));
    assert!(result.data.contains_key("bitcoin"));
    assert!(result.data.contains_key("solana"));
    assert_eq!(result.errors.len(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_recorded_and_batch_continues() {
    let source = Arc::new(FakeSource::new());
    source
        .respond(
            &chart_path("bitcoin"),
            Ok(json!({ "prices": [], "market_caps": [] })),
        )
        .respond(&chart_path("ethereum"), Ok(market_chart_body(1)));
    let (fetcher, _) = unpaced_fetcher(source);

    let result = fetcher
        .get_batch_market_chart(&query(&["bitcoin", "ethereum"]))
        .await;

    assert_eq!(
        result.errors["bitcoin"],
        "Unexpected data structure received from CoinGecko for bitcoin."
    );
    assert!(result.data.contains_key("ethereum"));
}

#[tokio::test]
async fn test_empty_series_are_valid() {
    let source = Arc::new(FakeSource::new());
    source.respond(
        &chart_path("new-coin"),
        Ok(json!({ "prices": [], "market_caps": [], "total_volumes": [] })),
    );
    let (fetcher, _) = unpaced_fetcher(source);

    let result = fetcher.get_batch_market_chart(&query(&["new-coin"])).await;

    let series = &result.data["new-coin"];
    assert!(series.prices.is_empty());
    assert!(series.market_caps.is_empty());
    assert!(series.total_volumes.is_empty());
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_transport_failures_get_coin_messages() {
    let source = Arc::new(FakeSource::new());
    source
        .respond(
            &chart_path("bitcoin"),
            Err(UpstreamError::Timeout {
                endpoint: chart_path("bitcoin"),
            }),
        )
        .respond(
            &chart_path("ethereum"),
            Err(UpstreamError::Network {
                endpoint: chart_path("ethereum"),
                message: "dns error".to_string(),
            }),
        );
    let (fetcher, _) = unpaced_fetcher(source);

    let result = fetcher
        .get_batch_market_chart(&query(&["bitcoin", "ethereum"]))
        .await;

    assert_eq!(
        result.errors["bitcoin"],
        "Request to CoinGecko timed out for coin 'bitcoin'."
    );
    assert_eq!(
        result.errors["ethereum"],
        "Network error while fetching data for 'ethereum': dns error"
    );
}

#[tokio::test]
async fn test_coins_are_fetched_in_order_with_request_params() {
    let source = Arc::new(FakeSource::new());
    for id in ["solana", "bitcoin", "ethereum"] {
        source.respond(&chart_path(id), Ok(market_chart_body(1)));
    }
    let (fetcher, pacer) = unpaced_fetcher(source.clone());

    let request = MarketChartQuery {
        coin_ids: vec!["solana".into(), "bitcoin".into(), "ethereum".into()],
        vs_currency: "sek".to_string(),
        days: 30,
    };
    fetcher.get_batch_market_chart(&request).await;

    let calls = source.calls();
    let paths: Vec<&str> = calls.iter().map(|(path, _)| path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/coins/solana/market_chart",
            "/coins/bitcoin/market_chart",
            "/coins/ethereum/market_chart"
        ]
    );
    for (_, params) in &calls {
        assert!(params.contains(&("vs_currency".to_string(), "sek".to_string())));
        assert!(params.contains(&("days".to_string(), "30".to_string())));
    }
    assert_eq!(pacer.count(), 3);
}

#[tokio::test]
async fn test_duplicate_ids_are_fetched_once() {
    let source = Arc::new(FakeSource::new());
    source.respond(&chart_path("bitcoin"), Ok(market_chart_body(1)));
    let (fetcher, pacer) = unpaced_fetcher(source.clone());

    let (result, metrics) = fetcher
        .get_batch_market_chart_with_metrics(&query(&["bitcoin", "bitcoin", "bitcoin"]))
        .await;

    assert_eq!(result.len(), 1);
    assert_eq!(source.call_count(), 1);
    assert_eq!(pacer.count(), 1);
    assert_eq!(metrics.coins(), 1);
}

#[tokio::test]
async fn test_hostile_id_stays_within_coin_path() {
    let source = Arc::new(FakeSource::new());
    let (fetcher, _) = unpaced_fetcher(source.clone());

    let result = fetcher.get_batch_market_chart(&query(&["../markets"])).await;

    assert_eq!(source.calls()[0].0, "/coins/..%2Fmarkets/market_chart");
    assert!(result.errors.contains_key("../markets"));
}

#[tokio::test]
async fn test_metrics_reflect_outcomes() {
    let source = Arc::new(FakeSource::new());
    source.respond(&chart_path("bitcoin"), Ok(market_chart_body(4)));
    let (fetcher, _) = unpaced_fetcher(source);

    let (_, metrics) = fetcher
        .get_batch_market_chart_with_metrics(&query(&["bitcoin", "nope"]))
        .await;

    assert_eq!(metrics.succeeded, 1);
    assert_eq!(metrics.failed, 1);
    assert_eq!(metrics.data_points, 12);
    assert_eq!(metrics.coin_latencies_ms.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fixed_interval_spaces_upstream_calls() {
    let source = Arc::new(FakeSource::new());
    for id in ["bitcoin", "ethereum", "solana"] {
        source.respond(&chart_path(id), Ok(market_chart_body(1)));
    }
    let fetcher = HistoricalSeriesFetcher::new(
        source,
        Arc::new(FixedInterval::new(Duration::from_millis(1500))),
    );

    let start = tokio::time::Instant::now();
    let result = fetcher
        .get_batch_market_chart(&query(&["bitcoin", "ethereum", "solana"]))
        .await;

    assert_eq!(result.data.len(), 3);
    // Pauses between coins only, none after the last
    assert!(start.elapsed() >= Duration::from_millis(3000));
    assert!(start.elapsed() < Duration::from_millis(4500));
}

#[tokio::test(start_paused = true)]
async fn test_fixed_interval_pauses_after_slow_calls() {
    let source = Arc::new(FakeSource::with_latency(Duration::from_millis(1200)));
    for id in ["bitcoin", "ethereum"] {
        source.respond(&chart_path(id), Ok(market_chart_body(1)));
    }
    let fetcher = HistoricalSeriesFetcher::new(
        source,
        Arc::new(FixedInterval::new(Duration::from_millis(1500))),
    );

    let start = tokio::time::Instant::now();
    let result = fetcher
        .get_batch_market_chart(&query(&["bitcoin", "ethereum"]))
        .await;

    assert_eq!(result.data.len(), 2);
    // bitcoin call, full pause after it completes, ethereum call
    assert!(start.elapsed() >= Duration::from_millis(1200 + 1500 + 1200));
    assert!(start.elapsed() < Duration::from_millis(4000));
}
