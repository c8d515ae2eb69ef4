//! The mutation decision engine.
//!
//! Given the kind of the object being admitted and its raw JSON, decide
//! whether the object has to be annotated with the external-dns target and
//! which JSON Patch operation achieves that.

mod patch;

pub use patch::{escape_json_pointer_token, PatchOperation};

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::errors::MutationError;

/// The annotation read by external-dns to find out the address a DNS record
/// should point to.
pub const TARGET_ANNOTATION: &str = "external-dns.alpha.kubernetes.io/target";

/// Object kinds that get annotated. The match is exact and case-sensitive.
pub const RECOGNIZED_KINDS: [&str; 2] = ["Ingress", "Gateway"];

/// The decision taken for one admission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Accept the object unchanged
    Allow,
    /// Accept the object, applying the given patch
    AllowWithPatch(PatchOperation),
    /// Reject the object, the message explains why
    Deny(String),
}

/// Only the metadata of the object is decoded, everything else is ignored.
#[derive(Deserialize, Debug)]
struct ObjectWithMeta {
    #[serde(default, deserialize_with = "null_as_default")]
    metadata: Metadata,
}

/// A `null` annotation value still counts as a present key.
#[derive(Deserialize, Debug, Default)]
struct Metadata {
    #[serde(default)]
    annotations: Option<BTreeMap<String, Option<String>>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug)]
pub struct MutationEngine {
    target: String,
}

impl MutationEngine {
    /// `target` is the value given to the annotation, usually an IP address
    /// or a hostname.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Decide what to do with an object of the given `kind`.
    ///
    /// Objects of kinds other than the recognized ones are always allowed,
    /// their content is not even looked at. Recognized objects are rejected
    /// only when their metadata cannot be decoded.
    pub fn decide(&self, kind: &str, object: Option<&serde_json::Value>) -> Outcome {
        if !RECOGNIZED_KINDS.contains(&kind) {
            debug!(kind, "not adding annotation to object");
            return Outcome::Allow;
        }

        let metadata = match decode_metadata(object) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(kind, error = %e, "cannot decode object");
                return Outcome::Deny(e.to_string());
            }
        };

        let annotations = metadata.annotations.unwrap_or_default();
        if let Some(current) = annotations.get(TARGET_ANNOTATION) {
            info!(
                kind,
                current = current.as_deref().unwrap_or_default(),
                "not mutating object that already has annotation"
            );
            return Outcome::Allow;
        }

        let key = TARGET_ANNOTATION.to_string();
        let value = self.target.clone();
        let operation = if annotations.is_empty() {
            PatchOperation::CreateMapping { key, value }
        } else {
            PatchOperation::AddMember { key, value }
        };

        info!(
            kind,
            value = self.target.as_str(),
            path = operation.path().as_str(),
            "adding annotation to object"
        );
        Outcome::AllowWithPatch(operation)
    }
}

fn decode_metadata(object: Option<&serde_json::Value>) -> Result<Metadata, MutationError> {
    let object = object.ok_or(MutationError::MissingObject)?;
    let object_with_meta =
        ObjectWithMeta::deserialize(object).map_err(MutationError::ObjectDecode)?;

    Ok(object_with_meta.metadata)
}
