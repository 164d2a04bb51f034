//! End-to-end scenarios over the full router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rpn_server::network::NetworkConfig;
use rpn_server::{CommitMode, NetworkModule, ServerConfig};

fn router_with(server_config: &ServerConfig) -> Router {
    NetworkModule::new(NetworkConfig::default(), server_config).router()
}

fn router() -> Router {
    router_with(&ServerConfig::default())
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(router: &Router, pile: Value) -> String {
    let (status, body) = send(router, "POST", "/rpn/stack", Some(json!({ "pile": pile }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn op_uri(op: &str, id: &str) -> String {
    format!("/rpn/op/{op}/stack/{id}")
}

#[tokio::test]
async fn lists_operators() {
    let router = router();
    let (status, body) = send(&router, "GET", "/rpn/op", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["+", "-", "*", "/"]));
}

#[tokio::test]
async fn add_collapses_top_two() {
    let router = router();
    let id = create(&router, json!([1, 2])).await;

    let (status, body) = send(&router, "POST", &op_uri("+", &id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([3]));

    let (_, body) = send(&router, "GET", &format!("/rpn/stack/{id}"), None).await;
    assert_eq!(body, json!([3]));
}

#[tokio::test]
async fn divide_accepts_literal_and_encoded_slash() {
    let router = router();
    let id = create(&router, json!([1, 8, 2])).await;

    let (status, body) = send(&router, "POST", &format!("/rpn/op///stack/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([1, 4.0]));

    let (status, body) = send(&router, "POST", &op_uri("%2F", &id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([0.25]));
}

#[tokio::test]
async fn division_by_zero_leaves_stack_unchanged() {
    let router = router();
    let id = create(&router, json!([10, 0])).await;

    let (status, body) = send(&router, "POST", &op_uri("%2F", &id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "cannot apply operator / on zero");

    let (_, body) = send(&router, "GET", &format!("/rpn/stack/{id}"), None).await;
    assert_eq!(body, json!([10, 0]));
}

#[tokio::test]
async fn non_numeric_operand_leaves_stack_unchanged() {
    let router = router();
    let id = create(&router, json!(["a", 2])).await;

    let (status, body) = send(&router, "POST", &op_uri("+", &id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains('+'));

    let (_, body) = send(&router, "GET", &format!("/rpn/stack/{id}"), None).await;
    assert_eq!(body, json!(["a", 2]));
}

#[tokio::test]
async fn unknown_operator_is_rejected_regardless_of_contents() {
    let router = router();
    for pile in [json!([]), json!([1]), json!([1, 2]), json!(["x", null])] {
        let id = create(&router, pile.clone()).await;
        let (status, body) = send(&router, "POST", &op_uri("%25", &id), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains('%'));

        let (_, contents) = send(&router, "GET", &format!("/rpn/stack/{id}"), None).await;
        assert_eq!(contents, pile);
    }
}

#[tokio::test]
async fn too_few_operands_is_rejected() {
    let router = router();
    let id = create(&router, json!([5])).await;

    let (status, _) = send(&router, "POST", &op_uri("*", &id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deleted_stack_is_gone_everywhere() {
    let router = router();
    let id = create(&router, json!([1, 2])).await;
    let stack_uri = format!("/rpn/stack/{id}");

    let (status, body) = send(&router, "DELETE", &stack_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&router, "GET", &stack_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, "POST", &stack_uri, Some(json!(3))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, "POST", &op_uri("+", &id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&router, "DELETE", &stack_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains(&id));

    let (_, all) = send(&router, "GET", "/rpn/stack", None).await;
    assert!(all.get(&id).is_none());
}

#[tokio::test]
async fn create_then_push_matches_create_with_both() {
    let router = router();
    let pushed = create(&router, json!([1])).await;
    let (status, body) = send(
        &router,
        "POST",
        &format!("/rpn/stack/{pushed}"),
        Some(json!({"k": [2]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains(&pushed));

    let direct = create(&router, json!([1, {"k": [2]}])).await;

    let (_, all) = send(&router, "GET", "/rpn/stack", None).await;
    assert_eq!(all[&pushed], all[&direct]);
    assert_eq!(all.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn pushed_objects_keep_key_order() {
    let router = router();
    let id = create(&router, json!([])).await;

    let push = Request::builder()
        .method("POST")
        .uri(format!("/rpn/stack/{id}"))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"zeta":1,"alpha":{"y":2,"x":3}}"#))
        .unwrap();
    let response = router.clone().oneshot(push).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let get = Request::builder()
        .uri(format!("/rpn/stack/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(get).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], br#"[{"zeta":1,"alpha":{"y":2,"x":3}}]"#);
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let router = router();
    let (status, body) = send(&router, "GET", "/rpn/stack/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());

    let (status, _) = send(&router, "POST", &op_uri("+", "not-a-uuid"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let router = router();
    let request = Request::builder()
        .method("POST")
        .uri("/rpn/stack")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn versioned_mode_applies_operators() {
    let router = router_with(&ServerConfig {
        commit_mode: CommitMode::Versioned,
        ..ServerConfig::default()
    });
    let id = create(&router, json!([6, 3])).await;

    let (status, body) = send(&router, "POST", &op_uri("-", &id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([3]));
}

#[tokio::test]
async fn health_reports_stack_count() {
    let router = router();
    create(&router, json!([])).await;
    create(&router, json!([])).await;

    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stacks"], 2);
}
