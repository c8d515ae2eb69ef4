use tracing::{debug, error, info, warn};

use crate::{
    admission_response::AdmissionResponse,
    api::{
        admission_review::{AdmissionReviewRequest, AdmissionReviewResponse},
        api_error::ApiError,
        populate_span_with_admission_request_data, populate_span_with_mutation_results,
    },
    mutation::MutationEngine,
};

/// Handle the body of an admission review request, returning the serialized
/// AdmissionReview response.
///
/// Malformed input is reported with a `400`, failing to build the response
/// with a `500`. A rejection decided by the engine is a successful review:
/// it travels inside of the response envelope.
pub(crate) fn review(
    engine: &MutationEngine,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Vec<u8>, ApiError> {
    if content_type != Some(mime::APPLICATION_JSON.essence_str()) {
        warn!(
            content_type = content_type.unwrap_or_default(),
            "unexpected content type"
        );
        return Err(ApiError::bad_request(format!(
            "unexpected content type {:?}, expected {}",
            content_type.unwrap_or_default(),
            mime::APPLICATION_JSON
        )));
    }

    let admission_review: AdmissionReviewRequest = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "unable to decode admission review");
        ApiError::bad_request(format!("unable to decode admission review: {e}"))
    })?;
    let AdmissionReviewRequest {
        api_version,
        kind,
        request,
    } = admission_review;

    populate_span_with_admission_request_data(&request);
    info!(
        kind = request.kind.kind.as_str(),
        name = request.name.as_deref().unwrap_or_default(),
        namespace = request.namespace.as_deref().unwrap_or_default(),
        operation = request.operation.as_str(),
        "admission review"
    );

    let outcome = engine.decide(&request.kind.kind, request.object());
    let response = AdmissionResponse::from_outcome(request.uid, outcome).map_err(|e| {
        error!(error = %e, "unable to build admission response");
        ApiError::internal(e.to_string())
    })?;

    populate_span_with_mutation_results(&response);
    debug!(response =? &response, "admission review handled");

    serde_json::to_vec(&AdmissionReviewResponse::new(api_version, kind, response)).map_err(|e| {
        error!(error = %e, "unable to serialize admission review response");
        ApiError::internal(format!("unable to serialize response: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission_response::PatchType;
    use crate::test_utils::{build_admission_review_request, decode_patch};
    use axum::http::StatusCode;
    use rstest::*;
    use serde_json::json;

    const TARGET: &str = "10.20.30.40";

    fn decode(body: &[u8]) -> AdmissionReviewResponse {
        serde_json::from_slice(body).expect("response should be an AdmissionReview")
    }

    #[rstest]
    #[case::missing(None)]
    #[case::text(Some("text/plain"))]
    #[case::with_charset(Some("application/json; charset=utf-8"))]
    #[case::uppercase(Some("APPLICATION/JSON"))]
    #[case::patch(Some("application/json-patch+json"))]
    fn wrong_content_type_is_a_bad_request(#[case] content_type: Option<&str>) {
        let engine = MutationEngine::new(TARGET);
        let body = serde_json::to_vec(&build_admission_review_request("Ingress", json!({}))).unwrap();

        let error = review(&engine, content_type, &body).unwrap_err();

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::not_json(b"hello".as_slice())]
    #[case::no_request(br#"{"apiVersion":"admission.k8s.io/v1","kind":"AdmissionReview"}"#.as_slice())]
    #[case::no_uid(br#"{"request":{"kind":{"kind":"Ingress"},"resource":{"resource":"ingresses"},"operation":"CREATE"}}"#.as_slice())]
    fn undecodable_envelope_is_a_bad_request(#[case] body: &[u8]) {
        let engine = MutationEngine::new(TARGET);

        let error = review(&engine, Some("application/json"), body).unwrap_err();

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert!(error.message.starts_with("unable to decode admission review"));
    }

    #[test]
    fn uid_is_echoed_and_envelope_is_filled() {
        let engine = MutationEngine::new(TARGET);
        let request = build_admission_review_request("Pod", json!({"metadata": {"name": "pod"}}));
        let body = serde_json::to_vec(&request).unwrap();

        let response = decode(&review(&engine, Some("application/json"), &body).unwrap());

        assert_eq!(response.api_version.as_deref(), Some("admission.k8s.io/v1"));
        assert_eq!(response.kind.as_deref(), Some("AdmissionReview"));
        assert_eq!(response.response.uid, request.request.uid);
        assert!(response.response.allowed);
        assert!(response.response.patch.is_none());
    }

    #[rstest]
    #[case::v1beta1(Some("admission.k8s.io/v1beta1"), "admission.k8s.io/v1beta1")]
    #[case::v1(Some("admission.k8s.io/v1"), "admission.k8s.io/v1")]
    #[case::missing(None, "admission.k8s.io/v1")]
    fn api_version_of_the_request_is_echoed(
        #[case] api_version: Option<&str>,
        #[case] expected: &str,
    ) {
        let engine = MutationEngine::new(TARGET);
        let mut request = build_admission_review_request("Ingress", json!({}));
        request.api_version = api_version.map(str::to_string);
        let body = serde_json::to_vec(&request).unwrap();

        let response = decode(&review(&engine, Some("application/json"), &body).unwrap());

        assert_eq!(response.api_version.as_deref(), Some(expected));
        assert_eq!(response.kind.as_deref(), Some("AdmissionReview"));
        assert!(response.response.allowed);
    }

    #[test]
    fn annotated_ingress_gets_patch() {
        let engine = MutationEngine::new(TARGET);
        let body =
            serde_json::to_vec(&build_admission_review_request("Ingress", json!({}))).unwrap();

        let response = decode(&review(&engine, Some("application/json"), &body).unwrap()).response;

        assert!(response.allowed);
        assert_eq!(response.patch_type, Some(PatchType::JSONPatch));
        let patch: serde_json::Value =
            serde_json::from_slice(&decode_patch(&response)).unwrap();
        assert_eq!(
            patch,
            json!([{
                "op": "add",
                "path": "/metadata/annotations",
                "value": {"external-dns.alpha.kubernetes.io/target": TARGET},
            }])
        );
    }

    #[test]
    fn malformed_object_is_denied_inside_the_envelope() {
        let engine = MutationEngine::new(TARGET);
        let body = serde_json::to_vec(&build_admission_review_request(
            "Gateway",
            json!({"metadata": {"annotations": "nope"}}),
        ))
        .unwrap();

        let raw = review(&engine, Some("application/json"), &body).unwrap();
        let response: serde_json::Value = serde_json::from_slice(&raw).unwrap();

        assert_eq!(response["response"]["allowed"], json!(false));
        assert!(response["response"]["status"]["message"].is_string());
        assert!(response["response"].get("patch").is_none());
        assert!(response["response"].get("patchType").is_none());
    }
}
