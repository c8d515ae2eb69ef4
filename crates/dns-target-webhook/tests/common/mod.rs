use axum::{
    body::Body,
    http::{self, header, Request, Response},
    Router,
};
use dns_target_webhook::{
    api::admission_review::AdmissionReviewResponse, mutation::MutationEngine,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub(crate) const TARGET: &str = "192.0.2.15";

pub(crate) fn app() -> Router {
    dns_target_webhook::router(MutationEngine::new(TARGET))
}

pub(crate) fn admission_review_request(content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(http::Method::POST)
        .uri("/webhook");
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder.body(Body::from(body.to_owned())).unwrap()
}

pub(crate) async fn send(request: Request<Body>) -> (http::StatusCode, Vec<u8>) {
    let response: Response<Body> = app().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status, body.to_vec())
}

pub(crate) async fn review(body: &str) -> AdmissionReviewResponse {
    let (status, body) = send(admission_review_request(Some("application/json"), body)).await;
    assert_eq!(status, 200);

    serde_json::from_slice(&body).unwrap()
}
