//! End-to-end tests: HTTP feed -> fetcher -> query engine -> MCP router

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use feedcache_core::{FeedCacheConfig, QueryEngine};
use feedcache_infra::build_fetcher;
use feedcache_serve::{create_app, AppState, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:g="http://base.google.com/ns/1.0">
  <channel>
    <title>Bodega</title>
    <item><g:id>42</g:id><title>Rioja Reserva 2018</title><g:price>12.50 EUR</g:price></item>
    <item><g:id>43</g:id><title>Albariño</title><g:price>9.90 EUR</g:price></item>
  </channel>
</rss>"#;

fn engine_for(server: &mockito::ServerGuard, ttl_seconds: u64) -> Arc<QueryEngine> {
    let mut config = FeedCacheConfig::default();
    config.feed.url = url::Url::parse(&format!("{}/feed.xml", server.url())).unwrap();
    config.cache.ttl_seconds = ttl_seconds;
    config.cache.failure_backoff_seconds = 0;

    let fetcher = build_fetcher(&config.feed).unwrap();
    Arc::new(QueryEngine::from_fetcher(fetcher, &config))
}

async fn call_tool(router: Router, name: &str, arguments: Value) -> Value {
    let message = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    });
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/mcp")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(message.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = serde_json::from_slice(&body).unwrap();
    value["result"].clone()
}

#[tokio::test]
async fn test_search_and_fetch_over_http_feed() {
    let mut server = mockito::Server::new_async().await;
    let feed = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(CATALOG)
        .expect(1)
        .create_async()
        .await;

    let engine = engine_for(&server, 600);
    let router = create_app(&ServerConfig::default(), AppState::new(Arc::clone(&engine)));

    let search = call_tool(router.clone(), "search", json!({ "q": "rioja" })).await;
    assert_eq!(search["isError"], false);
    let results = search["structuredContent"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "42");

    let fetch = call_tool(router.clone(), "fetch", json!({ "id": "43" })).await;
    assert_eq!(fetch["isError"], false);
    assert_eq!(fetch["structuredContent"]["id"], "43");
    assert!(fetch["structuredContent"]["text"]
        .as_str()
        .unwrap()
        .contains("Albariño"));

    let missing = call_tool(router, "fetch", json!({ "id": "99" })).await;
    assert_eq!(missing["isError"], true);
    assert_eq!(missing["structuredContent"]["error"], "Not found");

    // One download served all three calls.
    feed.assert_async().await;
}

#[tokio::test]
async fn test_stale_snapshot_served_when_feed_goes_down() {
    let mut server = mockito::Server::new_async().await;
    let feed = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_body(CATALOG)
        .create_async()
        .await;

    let engine = engine_for(&server, 0);
    let router = create_app(&ServerConfig::default(), AppState::new(Arc::clone(&engine)));

    let first = call_tool(router.clone(), "search", json!({ "q": "reserva" })).await;
    assert_eq!(first["isError"], false);

    feed.remove_async().await;

    let second = call_tool(router.clone(), "search", json!({ "q": "reserva" })).await;
    assert_eq!(second["isError"], false);
    assert_eq!(second["structuredContent"]["results"][0]["id"], "42");

    let stats = engine.stats();
    assert!(stats.last_error.is_some());
    assert_eq!(stats.failures, 1);
}

#[tokio::test]
async fn test_unreachable_feed_without_cache_is_tool_error() {
    let mut server = mockito::Server::new_async().await;
    let _feed = server
        .mock("GET", "/feed.xml")
        .with_status(503)
        .create_async()
        .await;

    let engine = engine_for(&server, 600);
    let router = create_app(&ServerConfig::default(), AppState::new(engine));

    let result = call_tool(router, "search", json!({ "q": "rioja" })).await;
    assert_eq!(result["isError"], true);
}
