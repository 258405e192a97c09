//! Cursor-based document writer.
use super::editor::ParagraphEditor;
use super::format::ParagraphFormat;
use super::paragraph::Paragraph;
use super::run::{Font, Run};
use super::section::Section;
use super::text::{LINE_BREAK_CHAR, PAGE_BREAK_CHAR};
use super::Document;
use crate::common::{Error, NodeId, Result};
use crate::fields::{FieldRange, FieldType};
use crate::revision::ContentChange;

/// Kind of break for [`DocumentBuilder::insert_break`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakType {
    /// Line break within the paragraph
    Line,
    Page,
    /// Start a new paragraph
    Paragraph,
    /// Start a new section
    Section,
}

/// Writes content at a cursor, the way a user types.
///
/// The cursor starts at the end of the document. Text is written with the
/// builder's current [`Font`]; all edits go through the document's revision
/// tracker.
///
/// # Examples
///
/// ```rust
/// use quire::{Document, DocumentBuilder};
///
/// let mut doc = Document::new();
/// let mut builder = DocumentBuilder::new(&mut doc);
/// builder.writeln("Hello world!")?;
/// builder.write("Second line.")?;
///
/// assert_eq!(doc.text(), "Hello world!\rSecond line.\u{c}");
/// # Ok::<(), quire::Error>(())
/// ```
#[derive(Debug)]
pub struct DocumentBuilder<'a> {
    doc: &'a mut Document,
    section: usize,
    paragraph: usize,
    font: Font,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        doc.normalize();
        let section = doc.sections.len() - 1;
        let paragraph = doc.sections[section].body.paragraphs.len() - 1;
        Self {
            doc,
            section,
            paragraph,
            font: Font::default(),
        }
    }

    #[inline]
    pub fn document(&self) -> &Document {
        self.doc
    }

    /// Font applied to text written from now on.
    #[inline]
    pub fn font(&self) -> &Font {
        &self.font
    }

    #[inline]
    pub fn font_mut(&mut self) -> &mut Font {
        &mut self.font
    }

    /// Paragraph under the cursor.
    pub fn current_paragraph(&self) -> Result<&Paragraph> {
        self.doc
            .sections
            .get(self.section)
            .and_then(|s| s.body.paragraph(self.paragraph))
            .ok_or_else(|| Error::structural("builder cursor is outside the document"))
    }

    fn editor(&mut self) -> Result<ParagraphEditor<'_>> {
        let Document {
            sections,
            properties,
            tracker,
            settings,
        } = &mut *self.doc;
        let paragraph = sections
            .get_mut(self.section)
            .and_then(|s| s.body.paragraphs.get_mut(self.paragraph))
            .ok_or_else(|| Error::structural("builder cursor is outside the document"))?;
        Ok(ParagraphEditor::new(paragraph, properties, settings, tracker))
    }

    /// Write text into the current paragraph.
    pub fn write(&mut self, text: &str) -> Result<NodeId> {
        let run = Run::with_font(text, self.font.clone());
        Ok(self.editor()?.append_run(run))
    }

    /// Write text and end the paragraph.
    pub fn writeln(&mut self, text: &str) -> Result<NodeId> {
        if !text.is_empty() {
            self.write(text)?;
        }
        self.insert_paragraph()
    }

    /// End the current paragraph and start a new one with the same format.
    pub fn insert_paragraph(&mut self) -> Result<NodeId> {
        let format = self.current_paragraph()?.format().clone();
        let index = self.paragraph + 1;
        let Document {
            sections, tracker, ..
        } = &mut *self.doc;
        let body = sections
            .get_mut(self.section)
            .map(|s| &mut s.body)
            .ok_or_else(|| Error::structural("builder cursor is outside the document"))?;
        let id = body.insert_paragraph(index, Paragraph::with_format(format), tracker)?;
        self.paragraph = index;
        Ok(id)
    }

    pub fn insert_break(&mut self, break_type: BreakType) -> Result<()> {
        match break_type {
            BreakType::Line => {
                self.write(&LINE_BREAK_CHAR.to_string())?;
            },
            BreakType::Page => {
                self.write(&PAGE_BREAK_CHAR.to_string())?;
            },
            BreakType::Paragraph => {
                self.insert_paragraph()?;
            },
            BreakType::Section => {
                let format = self.current_paragraph()?.format().clone();
                let mut section = Section::new();
                if let Some(first) = section.body.paragraphs.first_mut() {
                    first.format = format;
                    if let Some(mark) = self.doc.tracker.stamp() {
                        first.change = Some(ContentChange::Inserted(mark));
                    }
                }
                let index = self.section + 1;
                self.doc.sections.insert(index, section);
                self.section = index;
                self.paragraph = 0;
            },
        }
        Ok(())
    }

    /// Insert a field at the cursor and evaluate it.
    pub fn insert_field(&mut self, code: &str) -> Result<FieldRange> {
        Ok(self.editor()?.append_field(code))
    }

    pub fn insert_field_type(&mut self, field_type: FieldType, update: bool) -> Result<FieldRange> {
        self.editor()?.append_field_type(field_type, update)
    }

    /// Insert a TOC field with the given switches, e.g. `\o "1-3" \h \z \u`.
    /// The table itself is not generated.
    pub fn insert_table_of_contents(&mut self, switches: &str) -> Result<FieldRange> {
        let code = format!(" TOC {} ", switches.trim());
        let mut editor = self.editor()?;
        Ok(editor.append_field_with_placeholder(&code, ""))
    }

    /// Mark the current paragraph break as a style separator and start a new
    /// paragraph, so text before and after can carry different styles while
    /// sharing one visual line.
    pub fn insert_style_separator(&mut self) -> Result<NodeId> {
        self.editor()?.set_break_is_style_separator(true);
        self.insert_paragraph()
    }

    /// Change the format of the current paragraph.
    pub fn update_paragraph_format<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ParagraphFormat),
    {
        self.editor()?.update_format(f);
        Ok(())
    }
}
