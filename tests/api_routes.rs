//! Router-level tests for the vectord HTTP API
//!
//! Requests go straight into the axum router via `oneshot`; no socket is
//! bound.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use vectord::{
    config::{DuplicateNamePolicy, ServerConfig},
    daemon::{HttpServer, IndexRegistry},
    engine::BuiltinEngine,
};

fn app_with(policy: DuplicateNamePolicy) -> Router {
    let registry = Arc::new(IndexRegistry::new(Arc::new(BuiltinEngine::new()), policy));
    HttpServer::new(ServerConfig::default(), registry).router()
}

fn app() -> Router {
    app_with(DuplicateNamePolicy::Reject)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, name: &str, index_type: i32, dims: u16) {
    let (status, body) = call(
        app,
        Method::POST,
        &format!("/api/index/{}", name),
        Some(json!({"index_type": index_type, "method": 0, "dims": dims})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

async fn insert(app: &Router, name: &str, id: u64, vector: &[f32]) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        &format!("/api/vector/{}", name),
        Some(json!({"id": id, "vector": vector})),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(&app(), Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["results"]["healthy"], true);
}

#[tokio::test]
async fn test_create_index_echoes_parameters() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/index/docs",
        Some(json!({"index_type": 0, "method": 1, "dims": 4})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let results = &body["results"];
    assert_eq!(results["index_name"], "docs");
    assert_eq!(results["dims"], 4);
    assert_eq!(results["index_type"], 0);
    assert_eq!(results["method"], 1);
    assert!(results["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_create_index_bad_body() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/index/docs",
        Some(json!({"index_type": "flat"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_index_engine_failure_is_bad_gateway() {
    let app = app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/index/docs",
        Some(json!({"index_type": 0, "method": 0, "dims": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "INVALID_DIMENSIONS");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/index/docs",
        Some(json!({"index_type": 7, "method": 0, "dims": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_duplicate_index_name() {
    let app = app();
    create(&app, "docs", 0, 4).await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/index/docs",
        Some(json!({"index_type": 0, "method": 0, "dims": 8})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INDEX_EXISTS");

    let replacing = app_with(DuplicateNamePolicy::Replace);
    create(&replacing, "docs", 0, 4).await;
    create(&replacing, "docs", 0, 8).await;
    let (_, info) = call(&replacing, Method::GET, "/api/index/docs", None).await;
    assert_eq!(info["results"]["dims"], 8);
}

#[tokio::test]
async fn test_insert_and_exact_match_search() {
    let app = app();
    create(&app, "docs", 0, 4).await;

    let (status, body) = insert(&app, "docs", 1, &[1.0, 2.0, 3.0, 4.0]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["results"]["id"], 1);
    assert_eq!(body["results"]["vector"], json!([1.0, 2.0, 3.0, 4.0]));

    let (status, _) = insert(&app, "docs", 2, &[5.0, 6.0, 7.0, 8.0]).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, Method::GET, "/api/vector/docs/search?vector=1,2,3,4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["id"], 1);
    assert_eq!(body["results"]["distance"], 0.0);
}

#[tokio::test]
async fn test_top_k_is_ordered() {
    for index_type in [0, 3] {
        let app = app();
        create(&app, "docs", index_type, 2).await;
        for (id, v) in [(1u64, [0.0f32, 0.0]), (2, [3.0, 0.0]), (3, [1.0, 0.0]), (4, [10.0, 0.0])] {
            let (status, _) = insert(&app, "docs", id, &v).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) =
            call(&app, Method::GET, "/api/vector/docs/search?vector=0,0&k=3", None).await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);

        let ids: Vec<u64> = results.iter().map(|r| r["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![1, 3, 2]);

        let distances: Vec<f64> = results.iter().map(|r| r["distance"].as_f64().unwrap()).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[tokio::test]
async fn test_search_empty_index_is_engine_error() {
    let app = app();
    create(&app, "docs", 0, 4).await;

    let (status, body) = call(&app, Method::GET, "/api/vector/docs/search?vector=1,2,3,4", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "INDEX_EMPTY");
}

#[tokio::test]
async fn test_dimension_mismatch_rejected() {
    let app = app();
    create(&app, "docs", 0, 4).await;

    let (status, body) = insert(&app, "docs", 1, &[1.0, 2.0]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = call(&app, Method::GET, "/api/vector/docs/search?vector=1,2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing reached the engine
    let (_, stats) = call(&app, Method::GET, "/api/index/docs/stats", None).await;
    assert_eq!(stats["results"]["insert"]["count"], 0);
    assert_eq!(stats["results"]["search"]["count"], 0);
}

#[tokio::test]
async fn test_search_query_validation() {
    let app = app();
    create(&app, "docs", 0, 2).await;
    insert(&app, "docs", 1, &[1.0, 1.0]).await;

    let (status, body) = call(&app, Method::GET, "/api/vector/docs/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("vector"));

    let (status, body) = call(&app, Method::GET, "/api/vector/docs/search?vector=1,oops", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("oops"));

    let (status, _) = call(&app, Method::GET, "/api/vector/docs/search?vector=1,1&k=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::GET, "/api/vector/docs/search?vector=1,1&k=x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_query_and_path_are_structured() {
    let app = app();
    create(&app, "docs", 0, 2).await;

    let (status, body) = call(
        &app,
        Method::GET,
        "/api/vector/docs/search?vector=1,2&vector=3,4",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("vector"));

    let (status, body) = call(&app, Method::GET, "/api/vector/docs/%FF", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = call(&app, Method::GET, "/api/index/%FF/stats", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_wrong_method_is_structured() {
    let app = app();
    create(&app, "docs", 0, 2).await;

    let (status, body) = call(&app, Method::PUT, "/api/index/docs", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
    assert!(body["message"].as_str().unwrap().contains("/api/index/docs"));

    let (status, body) = call(&app, Method::POST, "/api/vector/docs/search", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
}

#[tokio::test]
async fn test_k_beyond_size_returns_every_vector() {
    for index_type in [0, 2, 3] {
        let app = app();
        create(&app, "docs", index_type, 2).await;
        for id in 0..4u64 {
            let (status, _) = insert(&app, "docs", id, &[id as f32, 1.0]).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = call(
            &app,
            Method::GET,
            "/api/vector/docs/search?vector=0,1&k=100000000000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "index_type {}: {}", index_type, body);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0]["id"], 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_graph_searches() {
    let app = app();
    create(&app, "docs", 3, 2).await;
    for id in 0..200u64 {
        insert(&app, "docs", id, &[id as f32, (id % 7) as f32]).await;
    }

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let uri = format!("/api/vector/docs/search?vector={},0&k=5", i * 5);
                call(&app, Method::GET, &uri, None).await
            })
        })
        .collect();

    for task in tasks {
        let (status, body) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["results"].as_array().unwrap().len(), 5);
    }

    let (_, stats) = call(&app, Method::GET, "/api/index/docs/stats", None).await;
    assert_eq!(stats["results"]["search_n"]["count"], 32);
}

#[tokio::test]
async fn test_unknown_index_is_not_found() {
    let app = app();
    let (status, body) = insert(&app, "missing", 1, &[1.0]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = call(&app, Method::GET, "/api/vector/missing/search?vector=1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::GET, "/api/index/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::DELETE, "/api/index/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::GET, "/api/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_duplicate_vector_is_conflict() {
    let app = app();
    create(&app, "docs", 0, 2).await;
    insert(&app, "docs", 7, &[1.0, 2.0]).await;

    let (status, body) = insert(&app, "docs", 7, &[3.0, 4.0]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATED_ENTRY");
}

#[tokio::test]
async fn test_delete_and_contains_vector() {
    let app = app();
    create(&app, "docs", 0, 2).await;
    insert(&app, "docs", 7, &[1.0, 2.0]).await;

    let (status, body) = call(&app, Method::GET, "/api/vector/docs/7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["exists"], true);

    let (status, body) = call(&app, Method::DELETE, "/api/vector/docs/7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["id"], 7);

    let (_, body) = call(&app, Method::GET, "/api/vector/docs/7", None).await;
    assert_eq!(body["results"]["exists"], false);

    let (status, body) = call(&app, Method::DELETE, "/api/vector/docs/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND_ID");

    let (status, _) = call(&app, Method::DELETE, "/api/vector/docs/seven", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_info_list_and_destroy() {
    let app = app();
    create(&app, "beta", 0, 2).await;
    create(&app, "alpha", 3, 3).await;
    insert(&app, "beta", 1, &[1.0, 2.0]).await;

    let (status, body) = call(&app, Method::GET, "/api/index/beta", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["size"], 1);

    let (_, body) = call(&app, Method::GET, "/api/index", None).await;
    let names: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["index_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "beta"]);

    let (status, body) = call(&app, Method::DELETE, "/api/index/beta", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, _) = call(&app, Method::GET, "/api/index/beta", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The name is free again
    create(&app, "beta", 0, 5).await;
}

#[tokio::test]
async fn test_index_addressable_by_resource_id() {
    let app = app();
    let (_, body) = call(
        &app,
        Method::POST,
        "/api/index/docs",
        Some(json!({"index_type": 0, "method": 0, "dims": 2})),
    )
    .await;
    let id = body["results"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::GET, &format!("/api/index/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["index_name"], "docs");
}
