use axum::{extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use typeahead_providers::{CatalogProvider, FallbackProvider, HttpProvider, HttpProviderConfig};
use typeahead_search::{
    Phase, QueryCache, SearchError, SuggestConfig, SuggestionProvider, TypeaheadHandle,
};

async fn companies(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let search = params.get("search").cloned().unwrap_or_default();
    match search.as_str() {
        "down" => (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response(),
        "garbled" => (StatusCode::OK, "<html>oops</html>").into_response(),
        "wrapped" => Json(json!({
            "success": true,
            "companies": [{ "_id": 17, "name": "Wrapped Inc", "followers": 12 }]
        }))
        .into_response(),
        _ => Json(json!([
            { "id": "1", "name": format!("{search} labs"), "domain": "labs.example", "popularity": 3 },
            { "id": "2", "name": format!("{search} group"), "logoUrl": "https://cdn.example/g.png", "popularity": 9 },
            { "id": "1", "name": "duplicate", "popularity": 1 }
        ]))
        .into_response(),
    }
}

async fn spawn_backend() -> String {
    let app = Router::new().route("/api/companies", get(companies));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

fn provider(base_url: String) -> HttpProvider {
    HttpProvider::new(&HttpProviderConfig {
        timeout_ms: 2_000,
        ..HttpProviderConfig::for_base_url(base_url)
    })
    .expect("provider")
}

#[tokio::test]
async fn lookup_sends_the_query_parameter() {
    let http = provider(spawn_backend().await);
    let records = http.lookup("acme corp").await.expect("lookup");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].name.as_deref(), Some("acme corp labs"));
    assert_eq!(records[1].logo_url.as_deref(), Some("https://cdn.example/g.png"));
}

#[tokio::test]
async fn wrapped_payloads_are_unwrapped() {
    let http = provider(spawn_backend().await);
    let records = http.lookup("wrapped").await.expect("lookup");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].object_id.as_deref(), Some("17"));
    assert_eq!(records[0].popularity_signal(), Some(12));
}

#[tokio::test]
async fn error_statuses_and_bad_bodies_are_classified() {
    let http = provider(spawn_backend().await);
    match http.lookup("down").await {
        Err(SearchError::ProviderFailure(msg)) => assert!(msg.contains("503"), "{msg}"),
        other => panic!("expected provider failure, got {other:?}"),
    }
    assert!(matches!(
        http.lookup("garbled").await,
        Err(SearchError::MalformedResponse(_))
    ));

    let unreachable = provider(closed_port().await);
    assert!(matches!(
        unreachable.lookup("acme").await,
        Err(SearchError::ProviderFailure(_))
    ));
}

#[tokio::test]
async fn session_resolves_against_http_backend() {
    let http: Arc<dyn SuggestionProvider> = Arc::new(provider(spawn_backend().await));
    let config = SuggestConfig {
        debounce_ms: 20,
        ..SuggestConfig::default()
    };
    let session =
        TypeaheadHandle::spawn(http, QueryCache::from_config(&config), &config).expect("spawn");

    session.text_changed("Acme").await.expect("send");
    let snapshot = session
        .wait_for(|s| s.phase == Phase::Resolved)
        .await
        .expect("resolved");

    let names: Vec<&str> = snapshot
        .candidates
        .iter()
        .map(|c| c.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["acme group", "acme labs"]);
    assert_eq!(
        snapshot.candidates[1].image_url.as_deref(),
        Some("https://logo.clearbit.com/labs.example")
    );
}

#[tokio::test]
async fn unreachable_backend_falls_back_to_catalog() {
    let primary: Arc<dyn SuggestionProvider> = Arc::new(provider(closed_port().await));
    let composed = FallbackProvider::new(primary, Arc::new(CatalogProvider::builtin()));
    let records = composed.lookup("flip").await.expect("fallback");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].domain.as_deref(), Some("flipkart.com"));
}
