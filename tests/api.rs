//! API tests against the router with an in-memory Record Store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use buch_server::{
    api,
    repository::InMemoryBuchRepository,
    services::{populate, Services},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const BASE_URL: &str = "/api/v1";

async fn app() -> Router {
    let repo = Arc::new(InMemoryBuchRepository::new());
    populate::populate(repo.as_ref())
        .await
        .expect("Failed to populate store");
    api::create_router(AppState {
        services: Arc::new(Services::new(repo)),
    })
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("Failed to send request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("{}{}", BASE_URL, uri))
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(format!("{}{}", BASE_URL, uri))
        .header(header::CONTENT_TYPE, "application/json")
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    with_json(Method::POST, uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put(uri: &str, body: &Value, if_match: Option<&str>) -> Request<Body> {
    let mut builder = with_json(Method::PUT, uri);
    if let Some(tag) = if_match {
        builder = builder.header(header::IF_MATCH, tag);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Failed to parse response")
}

async fn id_of(app: &Router, titel: &str) -> String {
    let response = send(app, get(&format!("/buecher?titel={}", titel))).await;
    let body = json_body(response).await;
    body[0]["id"].as_str().expect("No id in response").to_string()
}

fn neues_buch() -> Value {
    json!({
        "titel": "Neu",
        "art": "KINDLE",
        "verlag": "FOO_VERLAG",
        "preis": 19.9,
        "isbn": "0201633612",
        "schlagwoerter": ["TYPESCRIPT"]
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = app().await;

    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");

    let response = send(&app, get("/ready")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ready");
}

#[tokio::test]
async fn test_list_buecher() {
    let app = app().await;

    let response = send(&app, get("/buecher")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let buecher = body.as_array().expect("Expected an array");
    assert_eq!(buecher.len(), 5);
    assert_eq!(buecher[0]["titel"], "Alpha");
    assert_eq!(buecher[0]["art"], "DRUCKAUSGABE");
    assert_eq!(buecher[0]["version"], 0);
}

#[tokio::test]
async fn test_search_buecher() {
    let app = app().await;

    let body = json_body(send(&app, get("/buecher?javascript=true&typescript=true")).await).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["titel"], "Gamma");

    let body = json_body(send(&app, get("/buecher?titel=zzz")).await).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_get_buch_etag() {
    let app = app().await;
    let id = id_of(&app, "Alpha").await;

    let response = send(&app, get(&format!("/buecher/{}", id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ETAG], "\"0\"");
    assert_eq!(json_body(response).await["isbn"], "9783897225831");

    let request = Request::builder()
        .uri(format!("{}/buecher/{}", BASE_URL, id))
        .header(header::IF_NONE_MATCH, "\"0\"")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn test_get_buch_not_found() {
    let app = app().await;

    let response = send(&app, get("/buecher/00000000-0000-0000-0000-000000000999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, get("/buecher/kein-uuid")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_buch() {
    let app = app().await;

    let response = send(&app, post("/buecher", &neues_buch())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("/api/v1/buecher/"));

    let response = send(&app, get(location.trim_start_matches(BASE_URL))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["titel"], "Neu");
}

#[tokio::test]
async fn test_create_buch_invalid() {
    let app = app().await;

    let response = send(&app, post("/buecher", &json!({ "titel": "", "art": "X" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "BuchInvalid");
    assert!(body["details"].as_array().unwrap().len() >= 3);

    let mut buch = neues_buch();
    buch["isbn"] = json!("9783897225831");
    let response = send(&app, post("/buecher", &buch)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "IsbnExists");

    let mut buch = neues_buch();
    buch["titel"] = json!("Beta");
    let response = send(&app, post("/buecher", &buch)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "TitelExists");
}

#[tokio::test]
async fn test_update_buch() {
    let app = app().await;
    let id = id_of(&app, "Delta").await;
    let uri = format!("/buecher/{}", id);
    let buch = json!({ "titel": "Delta", "art": "KINDLE", "verlag": "BAR_VERLAG", "rating": 5 });

    let response = send(&app, put(&uri, &buch, Some("\"0\""))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[header::ETAG], "\"1\"");

    let response = send(&app, get(&uri)).await;
    assert_eq!(response.headers()[header::ETAG], "\"1\"");
    let body = json_body(response).await;
    assert_eq!(body["art"], "KINDLE");
    assert_eq!(body["isbn"], "9780387534060");

    let response = send(&app, put(&uri, &buch, Some("\"0\""))).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(json_body(response).await["error"], "VersionOutdated");
}

#[tokio::test]
async fn test_update_buch_preconditions() {
    let app = app().await;
    let id = id_of(&app, "Epsilon").await;
    let uri = format!("/buecher/{}", id);
    let buch = json!({ "titel": "Epsilon", "art": "KINDLE", "verlag": "FOO_VERLAG" });

    let response = send(&app, put(&uri, &buch, None)).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);

    let response = send(&app, put(&uri, &buch, Some("\"abc\""))).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(json_body(response).await["error"], "VersionInvalid");

    let other = json!({ "titel": "Alpha", "art": "KINDLE", "verlag": "FOO_VERLAG" });
    let response = send(&app, put(&uri, &other, Some("\"0\""))).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(json_body(response).await["error"], "TitelExists");

    let missing = "/buecher/00000000-0000-0000-0000-000000000999";
    let response = send(&app, put(missing, &buch, Some("\"0\""))).await;
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(json_body(response).await["error"], "NoSuchBuch");

    let invalid = json!({ "titel": "Epsilon", "art": "KINDLE", "verlag": "FOO_VERLAG", "rating": 9 });
    let response = send(&app, put(&uri, &invalid, Some("\"0\""))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_buch() {
    let app = app().await;
    let id = id_of(&app, "Gamma").await;
    let uri = format!("{}/buecher/{}", BASE_URL, id);

    for _ in 0..2 {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, request).await.status(), StatusCode::NO_CONTENT);
    }

    let response = send(&app, get(&format!("/buecher/{}", id))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body() {
    let app = app().await;

    let request = with_json(Method::POST, "/buecher")
        .body(Body::from("{\"titel\": "))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["code"], 18);

    let id = id_of(&app, "Beta").await;
    let request = with_json(Method::PUT, &format!("/buecher/{}", id))
        .header(header::IF_MATCH, "\"0\"")
        .body(Body::from("not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "BadValue");

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("{}/buecher", BASE_URL))
        .body(Body::from(neues_buch().to_string()))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "BadValue");
}
