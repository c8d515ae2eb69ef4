use base64::{engine::general_purpose, Engine as _};

use crate::admission_response::AdmissionResponse;
use crate::api::admission_review::AdmissionReviewRequest;

/// The raw JSON patch document carried by a mutating response
pub(crate) fn decode_patch(response: &AdmissionResponse) -> Vec<u8> {
    let patch = response.patch.as_ref().expect("patch should be set");
    general_purpose::STANDARD
        .decode(patch)
        .expect("patch should be base64 encoded")
}

pub(crate) fn build_admission_review_request(
    kind: &str,
    object: serde_json::Value,
) -> AdmissionReviewRequest {
    let input = serde_json::json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
            "kind": {"group": "networking.k8s.io", "version": "v1", "kind": kind},
            "resource": {"group": "networking.k8s.io", "version": "v1", "resource": "ingresses"},
            "name": "my-ingress",
            "namespace": "my-namespace",
            "operation": "CREATE",
            "userInfo": {
                "username": "admin",
                "uid": "014fbff9a07c",
                "groups": ["system:authenticated", "my-admin-group"]
            },
            "object": object,
            "dryRun": false
        }
    });

    serde_json::from_value(input).expect("deserialization should work")
}
