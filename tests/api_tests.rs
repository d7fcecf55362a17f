mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use cineclub_recs::{
    db::CatalogSnapshot,
    middleware::REQUEST_ID_HEADER,
    routes::{create_router, AppState},
    services::RecommendationService,
};
use common::{director_x_catalog, filler, store};

fn create_test_server(catalog: CatalogSnapshot) -> TestServer {
    let recommender = RecommendationService::new(Arc::new(store(catalog, 17)));
    let app = create_router(AppState::new(recommender));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(CatalogSnapshot::default());
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommendations_for_profiled_user() {
    let server = create_test_server(director_x_catalog());

    let response = server.get("/api/v1/users/cinephile/recommendations").await;
    response.assert_status_ok();

    let picks: Vec<Value> = response.json();
    assert_eq!(picks.len(), 20);

    let ids: HashSet<String> = picks
        .iter()
        .map(|pick| pick["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 20);
    for voted in common::voted_ids() {
        assert!(!ids.contains(&voted.to_string()));
    }

    let first = &picks[0];
    assert!(first["title"].is_string());
    assert!(first["genres"].is_string());
    assert!(first.get("director").is_some());
    assert!(first.get("up_votes").is_some());
}

#[tokio::test]
async fn test_recommendations_for_new_user() {
    let server = create_test_server(filler(CatalogSnapshot::default(), 1, 30));

    let response = server.get("/api/v1/users/someone-new/recommendations").await;
    response.assert_status_ok();

    let picks: Vec<Value> = response.json();
    assert_eq!(picks.len(), 25);
}

#[tokio::test]
async fn test_blank_user_id_is_bad_request() {
    let server = create_test_server(filler(CatalogSnapshot::default(), 1, 5));

    let response = server.get("/api/v1/users/%20/recommendations").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server(CatalogSnapshot::default());

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_static("trace-me-42"),
        )
        .await;

    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        "trace-me-42"
    );
}

#[tokio::test]
async fn test_request_id_is_generated_when_missing() {
    let server = create_test_server(CatalogSnapshot::default());

    let response = server.get("/api/v1/users/nobody/recommendations").await;
    response.assert_status_ok();

    let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}
