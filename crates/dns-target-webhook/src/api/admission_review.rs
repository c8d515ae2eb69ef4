use crate::admission_request::AdmissionRequest;
use crate::admission_response::AdmissionResponse;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub request: AdmissionRequest,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub response: AdmissionResponse,
}

pub const DEFAULT_API_VERSION: &str = "admission.k8s.io/v1";
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";

impl AdmissionReviewResponse {
    /// The API server expects the response to carry the same `apiVersion`
    /// and `kind` it sent, `v1` is used when the request had none.
    pub fn new(
        api_version: Option<String>,
        kind: Option<String>,
        response: AdmissionResponse,
    ) -> Self {
        AdmissionReviewResponse {
            api_version: Some(api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string())),
            kind: Some(kind.unwrap_or_else(|| ADMISSION_REVIEW_KIND.to_string())),
            response,
        }
    }
}
