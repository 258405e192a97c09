//! Body: the ordered paragraphs of a section.
use super::paragraph::Paragraph;
use super::text::{PARAGRAPH_BREAK_CHAR, SECTION_BREAK_CHAR};
use crate::common::{Error, NodeId, Result};
use crate::revision::{ContentChange, Revision, RevisionTracker};
use serde::{Deserialize, Serialize};

/// Ordered paragraphs of one section.
///
/// A body always holds at least one paragraph that is not pending deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub(crate) paragraphs: Vec<Paragraph>,
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

impl Body {
    /// Create a body with one empty paragraph.
    pub fn new() -> Self {
        Self {
            paragraphs: vec![Paragraph::new()],
        }
    }

    #[inline]
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Number of paragraphs, including those pending deletion.
    #[inline]
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    #[inline]
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    #[inline]
    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.paragraphs.get_mut(index)
    }

    pub fn first_paragraph(&self) -> Option<&Paragraph> {
        self.paragraphs.first()
    }

    pub fn last_paragraph(&self) -> Option<&Paragraph> {
        self.paragraphs.last()
    }

    /// Index of the paragraph with the given id.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.paragraphs.iter().position(|p| p.id == id)
    }

    /// Append a paragraph. While tracking it is marked as inserted.
    pub fn append_paragraph(&mut self, paragraph: Paragraph, tracker: &mut RevisionTracker) -> NodeId {
        let index = self.paragraphs.len();
        self.place(index, paragraph, tracker)
    }

    /// Insert a paragraph at `index` (`0..=paragraph_count()`).
    pub fn insert_paragraph(
        &mut self,
        index: usize,
        paragraph: Paragraph,
        tracker: &mut RevisionTracker,
    ) -> Result<NodeId> {
        if index > self.paragraphs.len() {
            return Err(Error::invalid_argument(format!(
                "paragraph index {index} out of range (count {})",
                self.paragraphs.len()
            )));
        }
        Ok(self.place(index, paragraph, tracker))
    }

    fn place(&mut self, index: usize, mut paragraph: Paragraph, tracker: &mut RevisionTracker) -> NodeId {
        if let Some(mark) = tracker.stamp() {
            paragraph.change = Some(ContentChange::Inserted(mark));
        }
        let id = paragraph.id;
        self.paragraphs.insert(index, paragraph);
        id
    }

    /// Remove the paragraph at `index`.
    ///
    /// While tracking, the paragraph is marked as deleted and stays in the
    /// body (`Ok(None)`), unless it is itself pending insertion, in which case
    /// it is removed outright. Untracked removal returns the detached
    /// paragraph. Removing the last paragraph not pending deletion fails with
    /// `StructuralInvariant`.
    pub fn remove_paragraph(
        &mut self,
        index: usize,
        tracker: &mut RevisionTracker,
    ) -> Result<Option<Paragraph>> {
        let Some(target) = self.paragraphs.get(index) else {
            return Err(Error::invalid_argument(format!(
                "paragraph index {index} out of range (count {})",
                self.paragraphs.len()
            )));
        };
        if !target.is_delete_revision() && self.live_count() == 1 {
            return Err(Error::structural("a body must keep at least one paragraph"));
        }

        if !tracker.is_tracking() || target.is_insert_revision() {
            return Ok(Some(self.paragraphs.remove(index)));
        }
        if !target.is_delete_revision()
            && let Some(mark) = tracker.stamp()
        {
            self.paragraphs[index].change = Some(ContentChange::Deleted(mark));
        }
        Ok(None)
    }

    /// Text of one paragraph followed by its terminator: `\r`, or `\f` for
    /// the last paragraph of the body.
    pub fn paragraph_text(&self, index: usize) -> Option<String> {
        let paragraph = self.paragraphs.get(index)?;
        let mut text = paragraph.text();
        if index + 1 == self.paragraphs.len() {
            text.push(SECTION_BREAK_CHAR);
        } else {
            text.push(PARAGRAPH_BREAK_CHAR);
        }
        Some(text)
    }

    /// Text of all paragraphs with terminators.
    pub fn text(&self) -> String {
        (0..self.paragraphs.len())
            .filter_map(|index| self.paragraph_text(index))
            .collect()
    }

    pub fn has_revisions(&self) -> bool {
        self.paragraphs.iter().any(Paragraph::has_revisions)
    }

    pub(crate) fn collect_revisions(&self, out: &mut Vec<Revision>) {
        for paragraph in &self.paragraphs {
            paragraph.collect_revisions(out);
        }
    }

    fn live_count(&self) -> usize {
        self.paragraphs.iter().filter(|p| !p.is_delete_revision()).count()
    }

    /// Apply every pending change. Paragraphs pending deletion are detached,
    /// emptied, and returned.
    pub(crate) fn accept_revisions(&mut self) -> (Vec<Paragraph>, usize) {
        let mut detached = Vec::new();
        let mut resolved = 0;
        let mut kept = Vec::with_capacity(self.paragraphs.len());
        for mut paragraph in self.paragraphs.drain(..) {
            match paragraph.change.take() {
                Some(ContentChange::Deleted(_)) => {
                    paragraph.content.clear();
                    paragraph.format_change = None;
                    detached.push(paragraph);
                    resolved += 1;
                },
                Some(ContentChange::Inserted(_)) => {
                    resolved += 1 + paragraph.accept_content_revisions();
                    kept.push(paragraph);
                },
                None => {
                    resolved += paragraph.accept_content_revisions();
                    kept.push(paragraph);
                },
            }
        }
        self.paragraphs = kept;
        self.ensure_paragraph();
        (detached, resolved)
    }

    /// Undo every pending change. Paragraphs pending insertion are detached,
    /// emptied, and returned.
    pub(crate) fn reject_revisions(&mut self) -> (Vec<Paragraph>, usize) {
        let mut detached = Vec::new();
        let mut resolved = 0;
        let mut kept = Vec::with_capacity(self.paragraphs.len());
        for mut paragraph in self.paragraphs.drain(..) {
            match paragraph.change.take() {
                Some(ContentChange::Inserted(_)) => {
                    paragraph.content.clear();
                    paragraph.format_change = None;
                    detached.push(paragraph);
                    resolved += 1;
                },
                Some(ContentChange::Deleted(_)) => {
                    resolved += 1 + paragraph.reject_content_revisions();
                    kept.push(paragraph);
                },
                None => {
                    resolved += paragraph.reject_content_revisions();
                    kept.push(paragraph);
                },
            }
        }
        self.paragraphs = kept;
        self.ensure_paragraph();
        (detached, resolved)
    }

    /// Restore the at-least-one-paragraph invariant.
    pub(crate) fn ensure_paragraph(&mut self) {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::new());
        }
    }
}
