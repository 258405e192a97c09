//! Quire - an in-memory word-processing document model
//!
//! This library models the content of a Word document the way a word processor
//! edits it: sections of paragraphs, paragraphs of runs and inline fields, and
//! tracked revisions on top of both.
//!
//! # Features
//!
//! - **Inline fields**: insert, evaluate and update fields such as `AUTHOR`,
//!   `DATE` or `LISTNUM` anywhere in a paragraph
//! - **Run merging**: collapse adjacent runs with identical formatting
//! - **Revision tracking**: record insertions, deletions and format changes
//!   per author, then accept or reject them
//! - **Paragraph formatting**: frames, drop caps, tab stops and Asian
//!   typography settings
//! - **Persistence**: YAML snapshots and flat WordprocessingML (`wordml`
//!   feature, enabled by default)
//!
//! # Example - Fields
//!
//! ```rust
//! use quire::Document;
//!
//! # fn main() -> quire::Result<()> {
//! let mut doc = Document::new();
//! doc.built_in_properties_mut().set_author("Jane Doe");
//!
//! let mut body = doc.first_body_editor()?;
//! let mut para = body.first_paragraph()?;
//! para.append_text("Written by ");
//! para.append_field(" AUTHOR ");
//!
//! assert_eq!(doc.text(), "Written by \u{13} AUTHOR \u{14}Jane Doe\u{15}\u{c}");
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Tracked changes
//!
//! ```rust
//! use quire::Document;
//!
//! # fn main() -> quire::Result<()> {
//! let mut doc = Document::new();
//! doc.first_body_editor()?.append_paragraph("Draft.");
//!
//! doc.start_track_revisions("Reviewer", None);
//! doc.first_body_editor()?.remove_paragraph(1)?;
//! assert!(doc.has_revisions());
//!
//! doc.accept_all_revisions();
//! assert_eq!(doc.text(), "\u{c}");
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Building a document
//!
//! ```rust
//! use quire::{BreakType, Document, DocumentBuilder};
//! use quire::fields::FieldType;
//!
//! # fn main() -> quire::Result<()> {
//! let mut doc = Document::new();
//! let mut builder = DocumentBuilder::new(&mut doc);
//! builder.font_mut().bold = true;
//! builder.writeln("Contents")?;
//! builder.font_mut().bold = false;
//! builder.insert_table_of_contents("\\o \"1-3\" \\h")?;
//! builder.insert_break(BreakType::Page)?;
//! builder.insert_field_type(FieldType::ListNum, true)?;
//! builder.write(" First item")?;
//! # Ok(())
//! # }
//! ```

/// Shared types: errors, node ids, document properties, units
pub mod common;

/// Document content model and editors
pub mod document;

/// Field codes, field types and field evaluation
pub mod fields;

/// Loading and saving documents
pub mod io;

/// Revision tracking
pub mod revision;

// Re-export commonly used types for convenience
pub use common::{BuiltInProperties, Error, NodeId, Result};
pub use document::{
    Body, BodyEditor, BreakType, Document, DocumentBuilder, DocumentSettings, Font, Inline,
    Paragraph, ParagraphEditor, ParagraphFormat, Run, Section,
};
pub use fields::{FieldCode, FieldRange, FieldType};
pub use io::DocumentFormat;
pub use revision::{ContentChange, Revision, RevisionMark, RevisionTracker, RevisionType};
