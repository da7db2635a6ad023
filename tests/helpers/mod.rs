#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::response::Response;
use axum::Router;
use http::Request;
use serde_json::Value;
use tower::ServiceExt;

use volgate::files::FileStore;
use volgate::http_server;
use volgate::registry::Registry;
use volgate::storage::{MemoryBlobStore, MemoryMetaStore};
use volgate::ServiceState;

pub const ADMIN_SECRET: &str = "admin-s3cr3t";
pub const VERSION: &str = "0.0.0-test";

/// Router over in-memory stores, the way the binary wires it up minus
/// the durable backends.
pub fn test_app() -> Router {
    let registry = Registry::new(Arc::new(MemoryMetaStore::default()));
    let files = FileStore::new(Arc::new(MemoryBlobStore::default()));
    let state = ServiceState::new(registry, files, ADMIN_SECRET, VERSION);
    http_server::router(state)
}

pub async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("response")
}

pub async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_text(resp).await).expect("json body")
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn authed_request(method: &str, uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", authorization)
        .body(Body::empty())
        .expect("request")
}

/// Registers a volume and asserts success.
pub async fn register(app: &Router, volume: &str, spec: Value) {
    let resp = send(app, json_request("POST", &format!("/{volume}"), spec)).await;
    assert_eq!(resp.status(), http::StatusCode::CREATED);
}
