//! Loading and saving documents.
//!
//! Two encodings are supported:
//!
//! - **Snapshot**: a YAML dump of the content model. Lossless for everything
//!   except node identity (fresh ids are minted on load).
//! - **WordprocessingML**: a flat `w:document` part, behind the `wordml`
//!   feature. Fields, tracked changes, frames, tab stops and section
//!   boundaries are preserved.
//!
//! Loading reads the whole file before anything is decoded, so a failed load
//! never yields a partial document. Saving writes a sibling temporary file
//! and renames it over the target.
//!
//! # Example
//!
//! ```no_run
//! use quire::Document;
//!
//! # fn main() -> quire::Result<()> {
//! let mut doc = Document::new();
//! doc.first_body_editor()?.append_paragraph("Saved text.");
//! doc.save("report.yaml")?;
//!
//! let loaded = Document::load("report.yaml")?;
//! assert_eq!(loaded.text(), doc.text());
//! # Ok(())
//! # }
//! ```

pub mod snapshot;
#[cfg(feature = "wordml")]
pub mod wordml;

use crate::common::{Error, Result};
use crate::document::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk encoding of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// YAML snapshot of the content model
    Snapshot,
    /// Flat WordprocessingML
    #[cfg(feature = "wordml")]
    WordMl,
}

impl DocumentFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(Self::Snapshot),
            #[cfg(feature = "wordml")]
            Some("xml") => Ok(Self::WordMl),
            Some(other) => Err(Error::InvalidFormat(format!(
                "unsupported document extension: .{other}"
            ))),
            None => Err(Error::InvalidFormat(format!(
                "cannot infer a document format for {}",
                path.display()
            ))),
        }
    }

    /// Pick a format by looking at the content.
    ///
    /// Anything that starts like XML is WordprocessingML; the rest is taken
    /// for a snapshot.
    pub fn detect(content: &str) -> Self {
        #[cfg(feature = "wordml")]
        {
            let head = content.trim_start_matches('\u{feff}').trim_start();
            if head.starts_with("<?xml") || head.starts_with("<w:") {
                return Self::WordMl;
            }
        }
        #[cfg(not(feature = "wordml"))]
        let _ = content;
        Self::Snapshot
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            #[cfg(feature = "wordml")]
            Self::WordMl => "wordml",
        }
    }
}

/// Decode a document from its textual form.
pub fn from_str(content: &str, format: DocumentFormat) -> Result<Document> {
    match format {
        DocumentFormat::Snapshot => snapshot::from_str(content),
        #[cfg(feature = "wordml")]
        DocumentFormat::WordMl => wordml::from_str(content),
    }
}

/// Encode a document in `format`.
pub fn to_string(doc: &Document, format: DocumentFormat) -> Result<String> {
    match format {
        DocumentFormat::Snapshot => snapshot::to_string(doc),
        #[cfg(feature = "wordml")]
        DocumentFormat::WordMl => wordml::to_string(doc),
    }
}

/// Load a document from `path`, detecting the format from its content.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let format = DocumentFormat::detect(&content);
    let doc = from_str(&content, format)?;
    debug!(
        path = %path.display(),
        format = format.name(),
        paragraphs = paragraph_count(&doc),
        "loaded document"
    );
    Ok(doc)
}

/// Save `doc` to `path` in the format its extension names.
///
/// The target is replaced atomically: content goes to a temporary file in the
/// same directory first.
pub fn save<P: AsRef<Path>>(doc: &Document, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = DocumentFormat::from_path(path)?;
    let content = to_string(doc, format)?;

    let temp = temp_path(path);
    if let Err(e) = fs::write(&temp, content.as_bytes()) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    debug!(
        path = %path.display(),
        format = format.name(),
        paragraphs = paragraph_count(doc),
        "saved document"
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

fn paragraph_count(doc: &Document) -> usize {
    doc.sections().iter().map(|s| s.body().paragraph_count()).sum()
}
