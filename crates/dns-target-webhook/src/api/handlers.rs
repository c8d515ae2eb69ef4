use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::{service::review, state::ApiServerState};

#[tracing::instrument(
    name = "mutation",
    fields(
        request_uid=tracing::field::Empty,
        host=crate::config::HOSTNAME.as_str(),
        name=tracing::field::Empty,
        namespace=tracing::field::Empty,
        operation=tracing::field::Empty,
        kind_group=tracing::field::Empty,
        kind_version=tracing::field::Empty,
        kind=tracing::field::Empty,
        resource=tracing::field::Empty,
        allowed=tracing::field::Empty,
        mutated=tracing::field::Empty,
        response_message=tracing::field::Empty,
    ),
    skip_all)]
/// Review an AdmissionReview sent by the API server, possibly mutating the object.
pub(crate) async fn mutate_handler(
    State(state): State<Arc<ApiServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    match review(&state.engine, content_type, &body) {
        Ok(payload) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::APPLICATION_JSON.essence_str())],
            payload,
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn healthz_handler() -> StatusCode {
    StatusCode::OK
}
