//! Editors: borrowed views that bundle a body or paragraph with the
//! document's properties, settings, and revision tracker.
//!
//! Editing through an editor evaluates fields against the owning document and
//! records revisions while tracking is enabled.
use super::body::Body;
use super::format::ParagraphFormat;
use super::paragraph::Paragraph;
use super::run::Run;
use super::settings::DocumentSettings;
use crate::common::{BuiltInProperties, Error, NodeId, Result};
use crate::fields::{FieldCode, FieldContext, FieldRange, FieldType};
use crate::revision::RevisionTracker;
use std::ops::Deref;

/// Mutable view of one body.
#[derive(Debug)]
pub struct BodyEditor<'a> {
    body: &'a mut Body,
    properties: &'a BuiltInProperties,
    settings: &'a DocumentSettings,
    tracker: &'a mut RevisionTracker,
}

impl<'a> BodyEditor<'a> {
    pub fn new(
        body: &'a mut Body,
        properties: &'a BuiltInProperties,
        settings: &'a DocumentSettings,
        tracker: &'a mut RevisionTracker,
    ) -> Self {
        Self {
            body,
            properties,
            settings,
            tracker,
        }
    }

    /// Editor for the paragraph at `index`.
    pub fn paragraph(&mut self, index: usize) -> Result<ParagraphEditor<'_>> {
        let count = self.body.paragraph_count();
        let paragraph = self.body.paragraphs.get_mut(index).ok_or_else(|| {
            Error::invalid_argument(format!("paragraph index {index} out of range (count {count})"))
        })?;
        Ok(ParagraphEditor::new(
            paragraph,
            self.properties,
            self.settings,
            self.tracker,
        ))
    }

    pub fn first_paragraph(&mut self) -> Result<ParagraphEditor<'_>> {
        if self.body.paragraphs.is_empty() {
            return Err(Error::structural("body has no paragraphs"));
        }
        self.paragraph(0)
    }

    pub fn last_paragraph(&mut self) -> Result<ParagraphEditor<'_>> {
        let Some(last) = self.body.paragraph_count().checked_sub(1) else {
            return Err(Error::structural("body has no paragraphs"));
        };
        self.paragraph(last)
    }

    /// Append a paragraph holding `text` as one run.
    pub fn append_paragraph(&mut self, text: &str) -> NodeId {
        self.body.append_paragraph(Paragraph::with_text(text), self.tracker)
    }

    pub fn append(&mut self, paragraph: Paragraph) -> NodeId {
        self.body.append_paragraph(paragraph, self.tracker)
    }

    pub fn insert_paragraph(&mut self, index: usize, paragraph: Paragraph) -> Result<NodeId> {
        self.body.insert_paragraph(index, paragraph, self.tracker)
    }

    /// See [`Body::remove_paragraph`].
    pub fn remove_paragraph(&mut self, index: usize) -> Result<Option<Paragraph>> {
        self.body.remove_paragraph(index, self.tracker)
    }
}

impl Deref for BodyEditor<'_> {
    type Target = Body;

    fn deref(&self) -> &Body {
        self.body
    }
}

/// Mutable view of one paragraph.
#[derive(Debug)]
pub struct ParagraphEditor<'a> {
    paragraph: &'a mut Paragraph,
    properties: &'a BuiltInProperties,
    settings: &'a DocumentSettings,
    tracker: &'a mut RevisionTracker,
}

impl<'a> ParagraphEditor<'a> {
    pub fn new(
        paragraph: &'a mut Paragraph,
        properties: &'a BuiltInProperties,
        settings: &'a DocumentSettings,
        tracker: &'a mut RevisionTracker,
    ) -> Self {
        Self {
            paragraph,
            properties,
            settings,
            tracker,
        }
    }

    fn context(&self) -> FieldContext<'a> {
        FieldContext::new(self.properties, self.settings.clock(), self.settings.locale())
    }

    fn evaluate(&self, code: &str) -> Option<String> {
        self.context().evaluate(&FieldCode::parse(code))
    }

    // ---- runs ----

    pub fn append_run(&mut self, run: Run) -> NodeId {
        self.paragraph.append_run(run, self.tracker)
    }

    pub fn append_text(&mut self, text: &str) -> NodeId {
        self.paragraph.append_text(text, self.tracker)
    }

    pub fn insert_run(&mut self, run: Run, reference: Option<NodeId>, is_after: bool) -> Result<NodeId> {
        self.paragraph.insert_run(run, reference, is_after, self.tracker)
    }

    pub fn remove_run(&mut self, id: NodeId) -> Result<Option<Run>> {
        self.paragraph.remove_run(id, self.tracker)
    }

    pub fn run_mut(&mut self, id: NodeId) -> Option<&mut Run> {
        self.paragraph.run_mut(id)
    }

    pub fn join_runs_with_same_formatting(&mut self) -> usize {
        self.paragraph.join_runs_with_same_formatting()
    }

    // ---- fields ----

    /// Append a field and evaluate it right away.
    pub fn append_field(&mut self, code: &str) -> FieldRange {
        let result = self.evaluate(code);
        self.paragraph
            .append_field_with_result(code, result.as_deref(), self.tracker)
    }

    /// Append a field whose result is `placeholder`. Nothing is evaluated.
    pub fn append_field_with_placeholder(&mut self, code: &str, placeholder: &str) -> FieldRange {
        self.paragraph
            .append_field_with_result(code, Some(placeholder), self.tracker)
    }

    /// Append a field of `field_type` with its canonical code, evaluating it
    /// when `update` is set.
    pub fn append_field_type(&mut self, field_type: FieldType, update: bool) -> Result<FieldRange> {
        let code = canonical_code(field_type)?;
        let result = if update { self.evaluate(&code) } else { None };
        Ok(self
            .paragraph
            .append_field_with_result(&code, result.as_deref(), self.tracker))
    }

    /// Insert a field before or after `reference` and evaluate it right away.
    ///
    /// A `None` reference means the start of the paragraph (`is_after ==
    /// false`) or its end.
    pub fn insert_field(&mut self, code: &str, reference: Option<NodeId>, is_after: bool) -> Result<FieldRange> {
        let result = self.evaluate(code);
        self.paragraph
            .insert_field_with_result(code, result.as_deref(), reference, is_after, self.tracker)
    }

    pub fn insert_field_with_placeholder(
        &mut self,
        code: &str,
        placeholder: Option<&str>,
        reference: Option<NodeId>,
        is_after: bool,
    ) -> Result<FieldRange> {
        self.paragraph
            .insert_field_with_result(code, placeholder, reference, is_after, self.tracker)
    }

    pub fn insert_field_type(
        &mut self,
        field_type: FieldType,
        update: bool,
        reference: Option<NodeId>,
        is_after: bool,
    ) -> Result<FieldRange> {
        let code = canonical_code(field_type)?;
        let result = if update { self.evaluate(&code) } else { None };
        self.paragraph
            .insert_field_with_result(&code, result.as_deref(), reference, is_after, self.tracker)
    }

    pub fn update_field(&mut self, start: NodeId) -> Result<bool> {
        let ctx = self.context();
        self.paragraph.update_field(start, &ctx)
    }

    pub fn update_fields(&mut self) -> usize {
        let ctx = self.context();
        self.paragraph.update_fields(&ctx)
    }

    pub fn remove_field(&mut self, start: NodeId) -> Result<()> {
        self.paragraph.remove_field(start, self.tracker)
    }

    // ---- format ----

    /// Change the paragraph format; tracked while revisions are tracked.
    pub fn update_format<F>(&mut self, f: F)
    where
        F: FnOnce(&mut ParagraphFormat),
    {
        self.paragraph.update_format(self.tracker, f);
    }

    pub fn set_break_is_style_separator(&mut self, value: bool) {
        self.paragraph.break_is_style_separator = value;
    }
}

impl Deref for ParagraphEditor<'_> {
    type Target = Paragraph;

    fn deref(&self) -> &Paragraph {
        self.paragraph
    }
}

fn canonical_code(field_type: FieldType) -> Result<String> {
    field_type
        .canonical_code()
        .ok_or_else(|| Error::invalid_argument("an unknown field type has no field code"))
}
