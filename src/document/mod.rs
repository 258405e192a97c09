//! Document content model.
//!
//! A [`Document`] owns sections; each section owns a [`Body`] of
//! [`Paragraph`]s; each paragraph owns an ordered sequence of [`Inline`]
//! items (runs and field markers) and a [`ParagraphFormat`].
//!
//! # Architecture
//!
//! - `Document`: aggregate root with built-in properties, settings, and the
//!   revision tracker
//! - `BodyEditor` / `ParagraphEditor`: borrowed views that route edits through
//!   the tracker and evaluate fields against the document
//! - `DocumentBuilder`: cursor-based writer on top of the editors
//!
//! # Example
//!
//! ```rust
//! use quire::Document;
//! use quire::fields::FieldType;
//!
//! let mut doc = Document::new();
//! doc.built_in_properties_mut().set_author("Test Author");
//!
//! let mut body = doc.first_body_editor()?;
//! let mut para = body.first_paragraph()?;
//! para.append_field_type(FieldType::Author, true)?;
//! para.append_text("Hello World!");
//!
//! assert_eq!(
//!     doc.paragraph_text(0, 0).unwrap(),
//!     "\u{13} AUTHOR \u{14}Test Author\u{15}Hello World!\u{c}"
//! );
//! # Ok::<(), quire::Error>(())
//! ```

pub mod body;
pub mod builder;
pub mod editor;
pub mod format;
pub mod node;
pub mod paragraph;
pub mod run;
pub mod section;
pub mod settings;
pub mod text;

#[cfg(test)]
mod tests;

pub use body::Body;
pub use builder::{BreakType, DocumentBuilder};
pub use editor::{BodyEditor, ParagraphEditor};
pub use format::{
    DropCapPosition, FrameFormat, HeightRule, HorizontalAlignment, LineSpacing,
    ParagraphAlignment, ParagraphFormat, RelativeHorizontalPosition, RelativeVerticalPosition,
    StyleIdentifier, TabAlignment, TabLeader, TabStop, TabStops, UnderlineStyle,
    VerticalAlignment,
};
pub use node::{FieldChar, Inline};
pub use paragraph::Paragraph;
pub use run::{Font, Run};
pub use section::Section;
pub use settings::DocumentSettings;

use crate::common::{BuiltInProperties, Error, Result};
use crate::fields::FieldContext;
use crate::revision::{Revision, RevisionTracker};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A word-processing document.
///
/// A new document has one section whose body holds one empty paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub(crate) sections: Vec<Section>,
    #[serde(default)]
    pub(crate) properties: BuiltInProperties,
    #[serde(default)]
    pub(crate) tracker: RevisionTracker,
    #[serde(skip)]
    pub(crate) settings: DocumentSettings,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with default settings.
    pub fn new() -> Self {
        Self::with_settings(DocumentSettings::default())
    }

    pub fn with_settings(settings: DocumentSettings) -> Self {
        Self {
            sections: vec![Section::new()],
            properties: BuiltInProperties::default(),
            tracker: RevisionTracker::default(),
            settings,
        }
    }

    /// Load a document; see [`crate::io::load`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::io::load(path)
    }

    /// Save the document; see [`crate::io::save`].
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::io::save(self, path)
    }

    // ---- settings and properties ----

    #[inline]
    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: DocumentSettings) {
        self.settings = settings;
    }

    #[inline]
    pub fn built_in_properties(&self) -> &BuiltInProperties {
        &self.properties
    }

    #[inline]
    pub fn built_in_properties_mut(&mut self) -> &mut BuiltInProperties {
        &mut self.properties
    }

    /// Evaluation context built from this document's properties and settings.
    pub fn field_context(&self) -> FieldContext<'_> {
        FieldContext::new(&self.properties, self.settings.clock(), self.settings.locale())
    }

    // ---- sections ----

    #[inline]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[inline]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Direct mutable access to a section. Body methods reached this way take
    /// the revision tracker explicitly; prefer [`Document::body_editor`].
    pub fn section_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    pub fn append_section(&mut self, section: Section) -> usize {
        self.sections.push(section);
        self.sections.len() - 1
    }

    /// First section. Fails with `StructuralInvariant` if the document has no
    /// sections or the first body has no paragraphs.
    pub fn first_section(&self) -> Result<&Section> {
        let section = self
            .sections
            .first()
            .ok_or_else(|| Error::structural("document has no sections"))?;
        if section.body.paragraphs.is_empty() {
            return Err(Error::structural("first section has no paragraphs"));
        }
        Ok(section)
    }

    /// Editor for the body of section `index`.
    pub fn body_editor(&mut self, index: usize) -> Result<BodyEditor<'_>> {
        let Self {
            sections,
            properties,
            tracker,
            settings,
        } = self;
        let count = sections.len();
        let section = sections.get_mut(index).ok_or_else(|| {
            Error::invalid_argument(format!("section index {index} out of range (count {count})"))
        })?;
        Ok(BodyEditor::new(&mut section.body, properties, settings, tracker))
    }

    /// Editor for the first body. Fails with `StructuralInvariant` on a
    /// document without sections or paragraphs.
    pub fn first_body_editor(&mut self) -> Result<BodyEditor<'_>> {
        self.first_section()?;
        self.body_editor(0)
    }

    // ---- text ----

    /// Text of one paragraph with its terminator.
    pub fn paragraph_text(&self, section: usize, paragraph: usize) -> Option<String> {
        self.sections.get(section)?.body.paragraph_text(paragraph)
    }

    /// Text of the whole document.
    pub fn text(&self) -> String {
        self.sections.iter().map(|s| s.body.text()).collect()
    }

    // ---- fields ----

    /// Re-evaluate every field in the document. Returns how many were updated.
    pub fn update_fields(&mut self) -> usize {
        let Self {
            sections,
            properties,
            settings,
            ..
        } = self;
        let ctx = FieldContext::new(properties, settings.clock(), settings.locale());
        let updated: usize = sections
            .iter_mut()
            .flat_map(|s| s.body.paragraphs.iter_mut())
            .map(|p| p.update_fields(&ctx))
            .sum();
        debug!(updated, "updated fields");
        updated
    }

    // ---- revisions ----

    /// Start tracking changes as `author`. Without a date the document clock
    /// supplies one.
    pub fn start_track_revisions(&mut self, author: &str, date: Option<NaiveDateTime>) {
        let date = date.unwrap_or_else(|| self.settings.clock().now());
        self.tracker.start(author, date);
    }

    /// Stop tracking. Pending revisions stay pending.
    pub fn stop_track_revisions(&mut self) {
        self.tracker.stop();
    }

    #[inline]
    pub fn is_tracking_revisions(&self) -> bool {
        self.tracker.is_tracking()
    }

    #[inline]
    pub fn revision_tracker(&self) -> &RevisionTracker {
        &self.tracker
    }

    /// Pending revisions in document order.
    pub fn revisions(&self) -> Vec<Revision> {
        let mut out = Vec::new();
        for section in &self.sections {
            section.body.collect_revisions(&mut out);
        }
        out
    }

    pub fn has_revisions(&self) -> bool {
        self.sections.iter().any(|s| s.body.has_revisions())
    }

    /// Apply every pending revision.
    ///
    /// Paragraphs pending deletion leave the document; they are returned
    /// emptied. Tracking stays on or off as it was.
    pub fn accept_all_revisions(&mut self) -> Vec<Paragraph> {
        let mut detached = Vec::new();
        let mut resolved = 0;
        for section in &mut self.sections {
            let (mut removed, count) = section.body.accept_revisions();
            detached.append(&mut removed);
            resolved += count;
        }
        debug!(resolved, removed = detached.len(), "accepted all revisions");
        detached
    }

    /// Undo every pending revision.
    ///
    /// Paragraphs pending insertion leave the document; they are returned
    /// emptied. Tracking stays on or off as it was.
    pub fn reject_all_revisions(&mut self) -> Vec<Paragraph> {
        let mut detached = Vec::new();
        let mut resolved = 0;
        for section in &mut self.sections {
            let (mut removed, count) = section.body.reject_revisions();
            detached.append(&mut removed);
            resolved += count;
        }
        debug!(resolved, removed = detached.len(), "rejected all revisions");
        detached
    }

    /// Check the invariants a decoder cannot express in the data itself:
    /// field markers balance within each paragraph.
    pub(crate) fn validate(&self) -> Result<()> {
        for section in &self.sections {
            for paragraph in &section.body.paragraphs {
                paragraph.check_field_markers()?;
            }
        }
        Ok(())
    }

    /// Re-establish invariants after decoding: every body has a paragraph and
    /// new revision ids do not collide with stored ones.
    pub(crate) fn normalize(&mut self) {
        if self.sections.is_empty() {
            self.sections.push(Section::new());
        }
        for section in &mut self.sections {
            section.body.ensure_paragraph();
            for paragraph in &section.body.paragraphs {
                for id in paragraph.revision_ids() {
                    self.tracker.observe_id(id);
                }
            }
        }
    }
}
