use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use docpipe::infrastructure::observability::{
    REQUEST_ID_HEADER, RequestId, request_id_middleware, run_id_from_path,
};
use tower::ServiceExt;

fn app() -> Router {
    Router::new()
        .route("/ping", get(|| async { "pong" }))
        .layer(middleware::from_fn(request_id_middleware))
}

#[tokio::test]
async fn given_request_without_id_when_handled_then_generates_uuid_header() {
    let response = app()
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let header = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .expect("request id header")
        .to_str()
        .unwrap();
    assert!(uuid::Uuid::parse_str(header).is_ok());
}

#[tokio::test]
async fn given_request_with_id_when_handled_then_echoes_caller_id() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/ping")
                .header(REQUEST_ID_HEADER, "caller-supplied-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        "caller-supplied-id"
    );
}

#[tokio::test]
async fn given_oversized_caller_id_when_handled_then_replaced_with_uuid() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/ping")
                .header(REQUEST_ID_HEADER, "x".repeat(500))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let header = response.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(header).is_ok());
}

#[test]
fn given_caller_id_with_spaces_inside_when_reading_headers_then_fresh_id_minted() {
    let mut headers = HeaderMap::new();
    headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("two words"));

    let id = RequestId::from_headers(&headers);

    assert_ne!(id.as_str(), "two words");
    assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
}

#[test]
fn given_run_route_when_extracting_run_id_then_path_segment_returned() {
    assert_eq!(
        run_id_from_path("/api/v1/runs/run_abc/status"),
        Some("run_abc")
    );
    assert_eq!(run_id_from_path("/api/v1/runs/run_abc"), Some("run_abc"));
    assert_eq!(run_id_from_path("/api/v1/runs"), None);
    assert_eq!(run_id_from_path("/health"), None);
}
