//! YAML snapshot of the content model.
use crate::common::{Error, Result};
use crate::document::Document;

/// Serialize a document to YAML.
pub fn to_string(doc: &Document) -> Result<String> {
    serde_saphyr::to_string(doc)
        .map_err(|e| Error::InvalidFormat(format!("Failed to serialize document snapshot: {}", e)))
}

/// Deserialize a document from YAML. Settings and the tracking session are
/// not part of a snapshot; the decoded document gets the defaults.
///
/// Unbalanced field markers are rejected with [`Error::InvalidFormat`].
pub fn from_str(content: &str) -> Result<Document> {
    let mut doc: Document = serde_saphyr::from_str(content)
        .map_err(|e| Error::InvalidFormat(format!("Failed to parse document snapshot: {}", e)))?;
    doc.validate()?;
    doc.normalize();
    Ok(doc)
}
