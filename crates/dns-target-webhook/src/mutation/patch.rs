use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeStruct, Serializer};

const ANNOTATIONS_PATH: &str = "/metadata/annotations";

/// The single JSON Patch operation emitted when an object gets annotated.
///
/// Which variant is used depends on the state of the object: a JSON Patch
/// `add` against a member of a map that does not exist fails, hence objects
/// without annotations get the whole map created, while objects that already
/// have some annotations get just the new member added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOperation {
    /// Create `/metadata/annotations` holding only `key: value`
    CreateMapping { key: String, value: String },
    /// Add `key: value` to the existing `/metadata/annotations` map
    AddMember { key: String, value: String },
}

impl PatchOperation {
    pub fn path(&self) -> String {
        match self {
            PatchOperation::CreateMapping { .. } => ANNOTATIONS_PATH.to_string(),
            PatchOperation::AddMember { key, .. } => {
                format!("{ANNOTATIONS_PATH}/{}", escape_json_pointer_token(key))
            }
        }
    }

    /// Serialize the operation as a JSON Patch document, which is always an
    /// array holding exactly this operation.
    pub fn to_json_patch(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&[self])
    }
}

impl Serialize for PatchOperation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("PatchOperation", 3)?;
        state.serialize_field("op", "add")?;
        state.serialize_field("path", &self.path())?;
        match self {
            PatchOperation::CreateMapping { key, value } => {
                state.serialize_field("value", &BTreeMap::from([(key, value)]))?
            }
            PatchOperation::AddMember { value, .. } => state.serialize_field("value", value)?,
        }
        state.end()
    }
}

/// Escape a single JSON Pointer reference token (RFC 6901).
/// `~` must be handled before `/`, otherwise the `~` introduced by
/// escaping `/` would be escaped again.
pub fn escape_json_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
