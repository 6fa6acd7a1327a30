use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use invindex::{build_inverted_index, CodecKind};
use serde_json::Value;
use server::{build_app, ServerConfig};
use std::collections::HashSet;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_index(path: &Path, codec: CodecKind) {
    let index = build_inverted_index([
        "123 some words with A_word",
        "2 some words with B_word",
        "5 famous_phrases like to be or not to be",
        "3128 words A_word with B_word in one document",
    ]);
    index.dump(path, codec).unwrap();
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, body) = call(app, Request::get(uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK, "GET {uri}");
    serde_json::from_slice(&body).unwrap()
}

fn doc_ids(json: &Value) -> HashSet<String> {
    json["doc_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn query_returns_intersection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.bin");
    build_tiny_index(&path, CodecKind::Array);
    let app = build_app(ServerConfig::new(&path, CodecKind::Array)).unwrap();

    let json = get_json(&app, "/query?q=A_word").await;
    assert_eq!(doc_ids(&json), set(&["123", "3128"]));
    assert_eq!(json["total_hits"].as_u64().unwrap(), 2);

    let json = get_json(&app, "/query?q=A_word%20B_word").await;
    assert_eq!(doc_ids(&json), set(&["3128"]));

    let json = get_json(&app, "/query?q=A_word,B_word&sep=,").await;
    assert_eq!(doc_ids(&json), set(&["3128"]));
    assert_eq!(json["terms"], serde_json::json!(["A_word", "B_word"]));

    let json = get_json(&app, "/query?q=word_does_not_exist").await;
    assert!(doc_ids(&json).is_empty());

    let json = get_json(&app, "/query?q=").await;
    assert!(doc_ids(&json).is_empty());
    assert_eq!(json["total_hits"].as_u64().unwrap(), 0);
}

#[tokio::test]
async fn health_and_stats() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.json");
    build_tiny_index(&path, CodecKind::Json);
    let app = build_app(ServerConfig::new(&path, CodecKind::Json)).unwrap();

    let (status, body) = call(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");

    let json = get_json(&app, "/stats").await;
    assert_eq!(json["codec"], "json");
    assert!(json["num_terms"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn startup_fails_with_wrong_codec() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.json");
    build_tiny_index(&path, CodecKind::Json);
    assert!(build_app(ServerConfig::new(&path, CodecKind::Array)).is_err());
}

#[tokio::test]
async fn reload_requires_token_and_swaps_index() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.bin");
    build_tiny_index(&path, CodecKind::Array);
    let mut config = ServerConfig::new(&path, CodecKind::Array);
    config.admin_token = Some("secret".into());
    let app = build_app(config).unwrap();

    let reload = |token: Option<&str>| {
        let mut req = Request::post("/admin/reload");
        if let Some(token) = token {
            req = req.header("X-ADMIN-TOKEN", token);
        }
        req.body(Body::empty()).unwrap()
    };

    let (status, _) = call(&app, reload(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, reload(Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    build_inverted_index(["7 A_word fresh"]).dump(&path, CodecKind::Array).unwrap();
    let (status, body) = call(&app, reload(Some("secret"))).await;
    assert_eq!(status, StatusCode::OK);
    let stats: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["num_terms"].as_u64().unwrap(), 2);

    let json = get_json(&app, "/query?q=A_word").await;
    assert_eq!(doc_ids(&json), set(&["7"]));
}

#[tokio::test]
async fn failed_reload_keeps_current_index() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.bin");
    build_tiny_index(&path, CodecKind::Array);
    let mut config = ServerConfig::new(&path, CodecKind::Array);
    config.admin_token = Some("secret".into());
    let app = build_app(config).unwrap();

    std::fs::write(&path, [0u8, 0, 0, 9]).unwrap();
    let req = Request::post("/admin/reload")
        .header("X-ADMIN-TOKEN", "secret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8_lossy(&body).contains("Decoding error"));

    let json = get_json(&app, "/query?q=B_word").await;
    assert_eq!(doc_ids(&json), set(&["2", "3128"]));
}
