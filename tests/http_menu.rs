mod support;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use storefront_menu::application::menu::MenuService;
use storefront_menu::application::repos::RecordSource;
use storefront_menu::cache::{CacheConfig, MenuCache};
use storefront_menu::infra::http::{MenuState, build_router};
use support::StubSource;
use tower::ServiceExt;

fn router_with(source: Option<Arc<StubSource>>) -> Router {
    let source = source.map(|source| source as Arc<dyn RecordSource>);
    let menu = MenuService::new(
        source,
        Arc::new(MenuCache::menu()),
        CacheConfig::default(),
    );
    build_router(MenuState {
        menu: Arc::new(menu),
        db: None,
    })
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, header::HeaderMap, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_returns_no_content() {
    let router = router_with(None);
    let (status, _, _) = send(&router, get("/_health")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn groups_endpoint_wraps_data_and_sets_cache_headers() {
    let router = router_with(Some(Arc::new(StubSource::catalog())));

    let (status, headers, body) = send(&router, get("/api/menu/groups")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok()),
        Some("public, s-maxage=3600, stale-while-revalidate=86400")
    );
    let data = body["data"].as_array().expect("data array");
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["id"], "baby");
    assert_eq!(data[0]["imageAlt"], "baby collection");
    assert_eq!(data[0]["displayOptions"]["showInNavbar"], true);
    assert!(data[0].get("description").is_none());
    let category = &data[0]["sections"][0]["categories"][0];
    assert_eq!(category["productCount"], 0);
    assert!(category.get("promotionalBadge").is_none());
}

#[tokio::test]
async fn empty_source_yields_not_found() {
    let router = router_with(Some(Arc::new(StubSource::default())));

    let (status, _, body) = send(&router, get("/api/menu/groups")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No menu groups available" }));

    let (status, _, body) = send(&router, get("/api/menu/navigation")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No menu data available" }));
}

#[tokio::test]
async fn empty_menu_errors_are_not_publicly_cacheable() {
    let router = router_with(Some(Arc::new(StubSource::default())));
    let (status, headers, _) = send(&router, get("/api/menu/groups")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(headers.get(header::CACHE_CONTROL).is_none());

    let router = router_with(None);
    let (status, headers, _) = send(&router, get("/api/menu/groups")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(headers.get(header::CACHE_CONTROL).is_none());
}

#[tokio::test]
async fn unconfigured_source_yields_service_unavailable() {
    let router = router_with(None);

    let (status, _, body) = send(&router, get("/api/menu/groups")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "error": "Menu source unavailable" }));

    let (status, _, body) = send(&router, get("/api/menu/navbar")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [] }));
}

#[tokio::test]
async fn navigation_endpoint_returns_envelope() {
    let router = router_with(Some(Arc::new(StubSource::catalog())));

    let (status, _, body) = send(&router, get("/api/menu/navigation")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "main-menu-v1");
    assert_eq!(body["version"], "1.0.0");
    assert!(body["lastUpdated"].is_string());
    assert_eq!(body["groups"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["globalSettings"]["maxCategoriesPerSection"], 10);
}

#[tokio::test]
async fn group_sections_and_navbar_endpoints() {
    let router = router_with(Some(Arc::new(StubSource::catalog())));

    let (status, _, body) = send(&router, get("/api/menu/groups/toddler")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], "s-toddler");

    let (status, _, body) = send(&router, get("/api/menu/groups/missing")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": [] }));

    let (_, _, body) = send(&router, get("/api/menu/navbar")).await;
    let navbar: Vec<&str> = body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|group| group["id"].as_str())
        .collect();
    assert_eq!(navbar, vec!["baby", "toddler"]);
}

#[tokio::test]
async fn featured_and_search_endpoints() {
    let router = router_with(Some(Arc::new(StubSource::catalog())));

    let (status, _, body) = send(&router, get("/api/menu/featured")).await;
    assert_eq!(status, StatusCode::OK);
    let featured: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|category| category["id"].as_str())
        .collect();
    assert_eq!(featured, vec!["c-bodysuits", "c-jackets"]);

    let (status, _, body) = send(&router, get("/api/menu/search?q=sleep")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "c-sleep");

    let (_, _, body) = send(&router, get("/api/menu/search")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn clear_cache_for_group_and_everything() {
    let router = router_with(Some(Arc::new(StubSource::catalog())));
    send(&router, get("/api/menu/groups")).await;

    let (_, _, snapshot) = send(&router, get("/api/menu/cache")).await;
    assert_eq!(snapshot["size"], 4);
    assert_eq!(
        snapshot["keys"],
        json!([
            "menu:groups",
            "menu:sections:baby",
            "menu:sections:kids",
            "menu:sections:toddler"
        ])
    );

    let (status, _, body) = send(
        &router,
        post_json("/api/menu/clear-cache", json!({ "groupId": "baby" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Cache cleared for group: baby" }));

    let (_, _, snapshot) = send(&router, get("/api/menu/cache")).await;
    assert_eq!(
        snapshot["keys"],
        json!(["menu:sections:kids", "menu:sections:toddler"])
    );

    let clear_all = Request::builder()
        .method(Method::POST)
        .uri("/api/menu/clear-cache")
        .body(Body::empty())
        .expect("request");
    let (status, _, body) = send(&router, clear_all).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "All menu cache cleared" }));

    let (_, _, body) = send(
        &router,
        post_json("/api/menu/clear-cache", json!({})),
    )
    .await;
    assert_eq!(body, json!({ "message": "All menu cache cleared" }));

    let (_, _, snapshot) = send(&router, get("/api/menu/cache")).await;
    assert_eq!(snapshot, json!({ "size": 0, "keys": [] }));
}

#[tokio::test]
async fn clear_cache_with_unreadable_json_body_clears_everything() {
    let router = router_with(Some(Arc::new(StubSource::catalog())));

    let bodies = [
        Body::empty(),
        Body::from("not json"),
        Body::from(r#"{"groupId": 42}"#),
    ];
    for body in bodies {
        send(&router, get("/api/menu/groups")).await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/menu/clear-cache")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .expect("request");
        let (status, _, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "All menu cache cleared" }));

        let (_, _, snapshot) = send(&router, get("/api/menu/cache")).await;
        assert_eq!(snapshot, json!({ "size": 0, "keys": [] }));
    }
}

#[tokio::test]
async fn database_health_without_database_is_unavailable() {
    let router = router_with(None);
    let (status, _, _) = send(&router, get("/_health/db")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
