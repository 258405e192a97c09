//! Paragraphs: ordered inline content plus paragraph formatting.
//!
//! Mutations that can be tracked take the document's [`RevisionTracker`]
//! explicitly. Content created inside a paragraph that is itself pending
//! insertion is covered by the paragraph's own mark and is not stamped again;
//! format changes are always stamped.
use super::format::{ParagraphFormat, TabAlignment, TabStops};
use super::node::{FieldChar, Inline};
use super::run::{Font, Run};
use crate::common::{Error, NodeId, Result};
use crate::fields::{Field, FieldCode, FieldContext, FieldRange, FieldType};
use crate::revision::{
    ContentChange, FormatChange, Revision, RevisionFlags, RevisionMark, RevisionTarget,
    RevisionTracker, RevisionType,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Marker positions of one field within `content`.
#[derive(Debug, Clone, Copy)]
struct FieldBounds {
    start: usize,
    separator: Option<usize>,
    end: usize,
}

/// A paragraph.
///
/// Cloning a paragraph creates new nodes: the clone and every item of its
/// content get fresh [`NodeId`]s, so ids stay unique within a document.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(skip, default = "NodeId::next")]
    pub(crate) id: NodeId,
    #[serde(default)]
    pub(crate) content: Vec<Inline>,
    #[serde(default)]
    pub(crate) format: ParagraphFormat,
    #[serde(default)]
    pub(crate) break_is_style_separator: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) change: Option<ContentChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) format_change: Option<FormatChange>,
}

impl Clone for Paragraph {
    fn clone(&self) -> Self {
        Self {
            id: NodeId::next(),
            content: self.content.clone(),
            format: self.format.clone(),
            break_is_style_separator: self.break_is_style_separator,
            change: self.change.clone(),
            format_change: self.format_change.clone(),
        }
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new() -> Self {
        Self::with_format(ParagraphFormat::default())
    }

    /// Create a paragraph holding a single run, or nothing if `text` is empty.
    pub fn with_text(text: &str) -> Self {
        let mut paragraph = Self::new();
        if !text.is_empty() {
            paragraph.content.push(Inline::Run(Run::new(text)));
        }
        paragraph
    }

    /// Create an empty paragraph with the given format.
    pub fn with_format(format: ParagraphFormat) -> Self {
        Self {
            id: NodeId::next(),
            content: Vec::new(),
            format,
            break_is_style_separator: false,
            change: None,
            format_change: None,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    // ---- content access ----

    /// Ordered content: runs and field markers.
    #[inline]
    pub fn content(&self) -> &[Inline] {
        &self.content
    }

    /// Number of content items, field markers included.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(Inline::as_run)
    }

    pub fn run_count(&self) -> usize {
        self.runs().count()
    }

    /// Mutable access to a run's text and font. Edits through this reference
    /// are not tracked.
    pub fn run_mut(&mut self, id: NodeId) -> Option<&mut Run> {
        self.content
            .iter_mut()
            .find(|node| node.id() == id)
            .and_then(Inline::as_run_mut)
    }

    /// Index of a content item.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.content.iter().position(|node| node.id() == id)
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_some()
    }

    /// Text of the paragraph with field markers rendered as control
    /// characters. No paragraph terminator is appended.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.content {
            node.push_text(&mut out);
        }
        out
    }

    // ---- runs ----

    /// Append a run at the end of the paragraph.
    pub fn append_run(&mut self, mut run: Run, tracker: &mut RevisionTracker) -> NodeId {
        if let Some(mark) = self.stamp(tracker) {
            run.change = Some(ContentChange::Inserted(mark));
        }
        let id = run.id;
        self.content.push(Inline::Run(run));
        id
    }

    /// Append text as a new run with default formatting.
    pub fn append_text(&mut self, text: &str, tracker: &mut RevisionTracker) -> NodeId {
        self.append_run(Run::new(text), tracker)
    }

    /// Insert a run before or after `reference`.
    ///
    /// With no reference the run goes to the end (`is_after`) or the start.
    pub fn insert_run(
        &mut self,
        mut run: Run,
        reference: Option<NodeId>,
        is_after: bool,
        tracker: &mut RevisionTracker,
    ) -> Result<NodeId> {
        let index = self.resolve_index(reference, is_after)?;
        if let Some(mark) = self.stamp(tracker) {
            run.change = Some(ContentChange::Inserted(mark));
        }
        let id = run.id;
        self.content.insert(index, Inline::Run(run));
        Ok(id)
    }

    /// Remove a run.
    ///
    /// While tracking, the run is marked deleted and stays in place (`Ok(None)`)
    /// unless it is itself pending insertion. Otherwise the detached run is
    /// returned. Field markers cannot be removed this way.
    pub fn remove_run(&mut self, id: NodeId, tracker: &mut RevisionTracker) -> Result<Option<Run>> {
        let index = self.position(id).ok_or_else(|| self.foreign_node(id))?;
        let Inline::Run(run) = &self.content[index] else {
            return Err(Error::invalid_argument(format!(
                "{id} is a field marker; use remove_field"
            )));
        };

        let physical = !tracker.is_tracking() || self.is_insert_revision() || run.is_insert_revision();
        if physical {
            return Ok(match self.content.remove(index) {
                Inline::Run(run) => Some(run),
                _ => None,
            });
        }
        if !run.is_delete_revision()
            && let Some(mark) = tracker.stamp()
        {
            self.content[index].set_change(Some(ContentChange::Deleted(mark)));
        }
        Ok(None)
    }

    /// Merge adjacent runs with identical formatting.
    ///
    /// Field markers are barriers. Returns the number of pairwise merges.
    pub fn join_runs_with_same_formatting(&mut self) -> usize {
        let mut merges = 0;
        let mut i = 0;
        while i + 1 < self.content.len() {
            let mergeable = match (&self.content[i], &self.content[i + 1]) {
                (Inline::Run(a), Inline::Run(b)) => a.can_merge(b),
                _ => false,
            };
            if !mergeable {
                i += 1;
                continue;
            }
            if let Inline::Run(next) = self.content.remove(i + 1)
                && let Some(Inline::Run(current)) = self.content.get_mut(i)
            {
                current.text.push_str(&next.text);
                merges += 1;
            }
        }
        trace!(paragraph = %self.id, merges, "joined runs");
        merges
    }

    // ---- fields ----

    /// Insert a field with an optional fixed result. Nothing is evaluated.
    ///
    /// Fails with `InvalidArgument` if `reference` is not in this paragraph or
    /// lies inside another field.
    pub fn insert_field_with_result(
        &mut self,
        code: &str,
        result: Option<&str>,
        reference: Option<NodeId>,
        is_after: bool,
        tracker: &mut RevisionTracker,
    ) -> Result<FieldRange> {
        let index = self.resolve_index(reference, is_after)?;
        if reference.is_some() && self.field_depth_at(index) > 0 {
            return Err(Error::invalid_argument(format!(
                "cannot insert a field inside another field of paragraph {}",
                self.id
            )));
        }
        Ok(self.splice_field(index, code, result, tracker))
    }

    /// Append a field with an optional fixed result at the end.
    pub fn append_field_with_result(
        &mut self,
        code: &str,
        result: Option<&str>,
        tracker: &mut RevisionTracker,
    ) -> FieldRange {
        let index = self.content.len();
        self.splice_field(index, code, result, tracker)
    }

    fn splice_field(
        &mut self,
        index: usize,
        code: &str,
        result: Option<&str>,
        tracker: &mut RevisionTracker,
    ) -> FieldRange {
        let field_type = FieldType::from_code(code);
        let start = FieldChar::new(field_type);
        let end = FieldChar::new(field_type);
        let range_start = start.id;
        let range_end = end.id;

        let mut nodes = Vec::with_capacity(5);
        nodes.push(Inline::FieldStart(start));
        nodes.push(Inline::Run(Run::new(code)));
        let separator = if field_type.has_separator() {
            let separator = FieldChar::new(field_type);
            let id = separator.id;
            nodes.push(Inline::FieldSeparator(separator));
            if let Some(result) = result
                && !result.is_empty()
            {
                nodes.push(Inline::Run(Run::new(result)));
            }
            Some(id)
        } else {
            None
        };
        nodes.push(Inline::FieldEnd(end));

        if let Some(mark) = self.stamp(tracker) {
            for node in &mut nodes {
                node.set_change(Some(ContentChange::Inserted(mark.clone())));
            }
        }
        self.content.splice(index..index, nodes);

        FieldRange {
            start: range_start,
            separator,
            end: range_end,
        }
    }

    /// Re-evaluate one field, identified by its start marker.
    ///
    /// Returns `Ok(false)` when the field type cannot be evaluated or has no
    /// result region; the field is left untouched in that case.
    pub fn update_field(&mut self, start: NodeId, ctx: &FieldContext<'_>) -> Result<bool> {
        let index = self.position(start).ok_or_else(|| self.foreign_node(start))?;
        if !matches!(self.content[index], Inline::FieldStart(_)) {
            return Err(Error::invalid_argument(format!("{start} is not a field start")));
        }
        let bounds = self
            .field_bounds(index)
            .ok_or_else(|| Error::structural(format!("field {start} has no end marker")))?;

        let code = FieldCode::parse(&self.code_text(&bounds));
        let field_type = code.field_type();
        self.retype_field(&bounds, field_type);
        if !field_type.has_separator() {
            return Ok(false);
        }
        let Some(result) = ctx.evaluate(&code) else {
            debug!(field = %field_type, "field type cannot be updated; result left untouched");
            return Ok(false);
        };

        let font = bounds
            .separator
            .and_then(|sep| self.content[sep + 1..bounds.end].iter().find_map(Inline::as_run))
            .map(|run| run.font.clone())
            .unwrap_or_else(Font::default);
        let change = self.content[bounds.start].change().cloned();

        let result_index = match bounds.separator {
            Some(sep) => {
                self.content.drain(sep + 1..bounds.end);
                sep + 1
            },
            None => {
                let mut separator = FieldChar::new(field_type);
                separator.change = change.clone();
                self.content.insert(bounds.end, Inline::FieldSeparator(separator));
                bounds.end + 1
            },
        };
        if !result.is_empty() {
            let mut run = Run::with_font(&result, font);
            run.change = change;
            self.content.insert(result_index, Inline::Run(run));
        }
        Ok(true)
    }

    /// Re-evaluate every field. Nested fields are updated before the fields
    /// that contain them. Returns how many fields were updated.
    pub fn update_fields(&mut self, ctx: &FieldContext<'_>) -> usize {
        let starts: Vec<NodeId> = self
            .content
            .iter()
            .filter_map(|node| match node {
                Inline::FieldStart(c) => Some(c.id),
                _ => None,
            })
            .collect();
        starts
            .into_iter()
            .rev()
            .filter(|start| matches!(self.update_field(*start, ctx), Ok(true)))
            .count()
    }

    /// Fields of this paragraph in reading order.
    pub fn fields(&self) -> Vec<Field> {
        self.content
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Inline::FieldStart(_)))
            .filter_map(|(index, _)| self.field_bounds(index))
            .map(|bounds| {
                let code = self.code_text(&bounds);
                let result = bounds.separator.map(|sep| {
                    let mut text = String::new();
                    for node in &self.content[sep + 1..bounds.end] {
                        node.push_text(&mut text);
                    }
                    text
                });
                Field {
                    field_type: FieldType::from_code(&code),
                    code,
                    result,
                    range: self.range_of(&bounds),
                }
            })
            .collect()
    }

    /// Remove a whole field, identified by its start marker.
    ///
    /// While tracking, the field's nodes are marked deleted; nodes that were
    /// themselves pending insertion are dropped.
    pub fn remove_field(&mut self, start: NodeId, tracker: &mut RevisionTracker) -> Result<()> {
        let index = self.position(start).ok_or_else(|| self.foreign_node(start))?;
        if !matches!(self.content[index], Inline::FieldStart(_)) {
            return Err(Error::invalid_argument(format!("{start} is not a field start")));
        }
        let bounds = self
            .field_bounds(index)
            .ok_or_else(|| Error::structural(format!("field {start} has no end marker")))?;

        let removed: Vec<Inline> = self.content.drain(bounds.start..=bounds.end).collect();
        if !tracker.is_tracking() || self.is_insert_revision() {
            return Ok(());
        }
        let Some(mark) = tracker.stamp() else {
            return Ok(());
        };
        let kept: Vec<Inline> = removed
            .into_iter()
            .filter(|node| !node.is_insert_revision())
            .map(|mut node| {
                if !node.is_delete_revision() {
                    node.set_change(Some(ContentChange::Deleted(mark.clone())));
                }
                node
            })
            .collect();
        self.content.splice(bounds.start..bounds.start, kept);
        Ok(())
    }

    // ---- format ----

    #[inline]
    pub fn format(&self) -> &ParagraphFormat {
        &self.format
    }

    /// Change the paragraph format.
    ///
    /// While tracking, the first effective change records the format it
    /// replaced, so rejecting restores it. The format change is independent
    /// of a pending insertion or deletion of the paragraph.
    pub fn update_format<F>(&mut self, tracker: &mut RevisionTracker, f: F)
    where
        F: FnOnce(&mut ParagraphFormat),
    {
        let previous = self.format.clone();
        f(&mut self.format);
        if self.format == previous || self.format_change.is_some() {
            return;
        }
        if let Some(mark) = tracker.stamp() {
            self.format_change = Some(FormatChange { mark, previous });
        }
    }

    /// Tab stops that actually apply, i.e. not `Clear` entries.
    pub fn effective_tab_stops(&self) -> TabStops {
        let mut stops = TabStops::default();
        for stop in self.format.tab_stops.iter() {
            if stop.alignment != TabAlignment::Clear {
                stops.add(stop.position, stop.alignment, stop.leader);
            }
        }
        stops
    }

    /// Whether the paragraph mark is a style separator (hidden paragraph
    /// break joining this paragraph with the next).
    #[inline]
    pub fn break_is_style_separator(&self) -> bool {
        self.break_is_style_separator
    }

    // ---- revisions ----

    #[inline]
    pub fn change(&self) -> Option<&ContentChange> {
        self.change.as_ref()
    }

    #[inline]
    pub fn format_change(&self) -> Option<&FormatChange> {
        self.format_change.as_ref()
    }

    pub fn is_insert_revision(&self) -> bool {
        self.change.as_ref().is_some_and(ContentChange::is_insert)
    }

    pub fn is_delete_revision(&self) -> bool {
        self.change.as_ref().is_some_and(ContentChange::is_delete)
    }

    #[inline]
    pub fn is_format_revision(&self) -> bool {
        self.format_change.is_some()
    }

    pub fn revision_flags(&self) -> RevisionFlags {
        let mut flags = RevisionFlags::empty();
        flags.set(RevisionFlags::INSERT, self.is_insert_revision());
        flags.set(RevisionFlags::DELETE, self.is_delete_revision());
        flags.set(RevisionFlags::FORMAT, self.is_format_revision());
        flags
    }

    /// Whether this paragraph or anything in it has a pending change.
    pub fn has_revisions(&self) -> bool {
        self.change.is_some()
            || self.format_change.is_some()
            || self.content.iter().any(|node| node.change().is_some())
    }

    pub(crate) fn collect_revisions(&self, out: &mut Vec<Revision>) {
        if let Some(change) = &self.change {
            out.push(Revision::new(
                change.revision_type(),
                change.mark().clone(),
                RevisionTarget::Paragraph(self.id),
                self.text(),
            ));
        }
        if let Some(format_change) = &self.format_change {
            out.push(Revision::new(
                RevisionType::FormatChange,
                format_change.mark.clone(),
                RevisionTarget::Paragraph(self.id),
                String::new(),
            ));
        }

        // Consecutive nodes stamped with the same mark form one revision.
        let mut i = 0;
        while i < self.content.len() {
            let Some(change) = self.content[i].change() else {
                i += 1;
                continue;
            };
            let node = self.content[i].id();
            let mut text = String::new();
            let mut j = i;
            while j < self.content.len() && self.content[j].change() == Some(change) {
                self.content[j].push_text(&mut text);
                j += 1;
            }
            out.push(Revision::new(
                change.revision_type(),
                change.mark().clone(),
                RevisionTarget::Inline {
                    paragraph: self.id,
                    node,
                },
                text,
            ));
            i = j;
        }
    }

    /// Apply inline and format changes. Returns how many marks were resolved.
    pub(crate) fn accept_content_revisions(&mut self) -> usize {
        let before = self.content.len();
        self.content.retain(|node| !node.is_delete_revision());
        let mut resolved = before - self.content.len();
        for node in &mut self.content {
            if node.change().is_some() {
                node.set_change(None);
                resolved += 1;
            }
        }
        if self.format_change.take().is_some() {
            resolved += 1;
        }
        resolved
    }

    /// Undo inline and format changes. Returns how many marks were resolved.
    pub(crate) fn reject_content_revisions(&mut self) -> usize {
        let before = self.content.len();
        self.content.retain(|node| !node.is_insert_revision());
        let mut resolved = before - self.content.len();
        for node in &mut self.content {
            if node.change().is_some() {
                node.set_change(None);
                resolved += 1;
            }
        }
        if let Some(format_change) = self.format_change.take() {
            self.format = format_change.previous;
            resolved += 1;
        }
        resolved
    }

    /// Every revision id stored in this paragraph.
    pub(crate) fn revision_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.change
            .iter()
            .map(|c| c.mark().id())
            .chain(self.format_change.iter().map(|c| c.mark.id()))
            .chain(self.content.iter().filter_map(|n| n.change().map(|c| c.mark().id())))
    }

    // ---- internals ----

    fn stamp(&self, tracker: &mut RevisionTracker) -> Option<RevisionMark> {
        if self.is_insert_revision() {
            None
        } else {
            tracker.stamp()
        }
    }

    fn foreign_node(&self, id: NodeId) -> Error {
        Error::invalid_argument(format!("node {id} is not part of paragraph {}", self.id))
    }

    fn resolve_index(&self, reference: Option<NodeId>, is_after: bool) -> Result<usize> {
        match reference {
            None if is_after => Ok(self.content.len()),
            None => Ok(0),
            Some(id) => {
                let position = self.position(id).ok_or_else(|| self.foreign_node(id))?;
                Ok(if is_after { position + 1 } else { position })
            },
        }
    }

    /// Number of fields open at `index`.
    fn field_depth_at(&self, index: usize) -> usize {
        let mut depth = 0usize;
        for node in &self.content[..index] {
            match node {
                Inline::FieldStart(_) => depth += 1,
                Inline::FieldEnd(_) => depth = depth.saturating_sub(1),
                _ => {},
            }
        }
        depth
    }

    fn field_bounds(&self, start: usize) -> Option<FieldBounds> {
        let mut depth = 0usize;
        let mut separator = None;
        for (offset, node) in self.content[start + 1..].iter().enumerate() {
            let index = start + 1 + offset;
            match node {
                Inline::FieldStart(_) => depth += 1,
                Inline::FieldSeparator(_) if depth == 0 => separator = Some(index),
                Inline::FieldEnd(_) if depth == 0 => {
                    return Some(FieldBounds {
                        start,
                        separator,
                        end: index,
                    });
                },
                Inline::FieldEnd(_) => depth -= 1,
                _ => {},
            }
        }
        None
    }

    fn code_text(&self, bounds: &FieldBounds) -> String {
        let code_end = bounds.separator.unwrap_or(bounds.end);
        self.content[bounds.start + 1..code_end]
            .iter()
            .filter_map(Inline::as_run)
            .map(Run::text)
            .collect()
    }

    fn range_of(&self, bounds: &FieldBounds) -> FieldRange {
        FieldRange {
            start: self.content[bounds.start].id(),
            separator: bounds.separator.map(|sep| self.content[sep].id()),
            end: self.content[bounds.end].id(),
        }
    }

    /// Check that field markers are balanced: every separator and end closes
    /// an open start, and a field has at most one separator.
    pub(crate) fn check_field_markers(&self) -> Result<()> {
        // One entry per open field: whether its separator was seen.
        let mut open: Vec<bool> = Vec::new();
        for node in &self.content {
            match node {
                Inline::FieldStart(_) => open.push(false),
                Inline::FieldSeparator(c) => match open.last_mut() {
                    Some(seen) if !*seen => *seen = true,
                    Some(_) => {
                        return Err(Error::InvalidFormat(format!(
                            "field separator {} follows another separator",
                            c.id
                        )));
                    },
                    None => {
                        return Err(Error::InvalidFormat(format!(
                            "field separator {} without a matching field start",
                            c.id
                        )));
                    },
                },
                Inline::FieldEnd(c) => {
                    if open.pop().is_none() {
                        return Err(Error::InvalidFormat(format!(
                            "field end {} without a matching field start",
                            c.id
                        )));
                    }
                },
                Inline::Run(_) => {},
            }
        }
        if !open.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "unterminated field in paragraph {}",
                self.id
            )));
        }
        Ok(())
    }

    /// Derive every field's type from its code. Used after decoding, where
    /// markers arrive untyped.
    pub(crate) fn refresh_field_types(&mut self) {
        let starts: Vec<usize> = self
            .content
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Inline::FieldStart(_)))
            .map(|(index, _)| index)
            .collect();
        for start in starts {
            if let Some(bounds) = self.field_bounds(start) {
                let field_type = FieldCode::parse(&self.code_text(&bounds)).field_type();
                self.retype_field(&bounds, field_type);
            }
        }
    }

    fn retype_field(&mut self, bounds: &FieldBounds, field_type: FieldType) {
        let markers = [Some(bounds.start), bounds.separator, Some(bounds.end)];
        for index in markers.into_iter().flatten() {
            if let Inline::FieldStart(c) | Inline::FieldSeparator(c) | Inline::FieldEnd(c) =
                &mut self.content[index]
            {
                c.field_type = field_type;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BuiltInProperties;
    use crate::document::format::{StyleIdentifier, TabLeader};
    use crate::fields::{DateLocale, FixedClock};
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 11, 5)
                .unwrap()
                .and_hms_opt(9, 41, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_text_renders_field_markers() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::new();
        para.append_field_with_result(" AUTHOR ", Some("Test Author"), &mut tracker);
        para.append_text("Hello World!", &mut tracker);
        assert_eq!(para.text(), "\u{13} AUTHOR \u{14}Test Author\u{15}Hello World!");
    }

    #[test]
    fn test_listnum_has_no_separator() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::new();
        let range = para.append_field_with_result(" LISTNUM ", Some("ignored"), &mut tracker);
        assert!(range.separator.is_none());
        assert_eq!(para.text(), "\u{13} LISTNUM \u{15}");
    }

    #[test]
    fn test_insert_before_and_after_reference() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::new();
        let run = para.append_text("Hello World!", &mut tracker);

        para.insert_field_with_result(" QUOTE \"A\" ", Some("A"), Some(run), false, &mut tracker)
            .unwrap();
        para.insert_field_with_result(" QUOTE \"B\" ", Some("B"), Some(run), true, &mut tracker)
            .unwrap();
        assert_eq!(
            para.text(),
            "\u{13} QUOTE \"A\" \u{14}A\u{15}Hello World!\u{13} QUOTE \"B\" \u{14}B\u{15}"
        );
    }

    #[test]
    fn test_insert_with_foreign_reference_fails() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::with_text("Hello");
        let other = Paragraph::with_text("Other");
        let foreign = other.runs().next().unwrap().id();

        let before = para.text();
        let err = para
            .insert_field_with_result(" AUTHOR ", None, Some(foreign), true, &mut tracker)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(para.text(), before);
    }

    #[test]
    fn test_insert_inside_field_fails() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::new();
        para.append_field_with_result(" QUOTE \"x\" ", Some("x"), &mut tracker);
        let inner = para.content()[1].id();

        let err = para
            .insert_field_with_result(" AUTHOR ", None, Some(inner), true, &mut tracker)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(para.child_count(), 5);
    }

    #[test]
    fn test_update_field_matches_immediate_evaluation() {
        let mut props = BuiltInProperties::new();
        props.set_author("Test Author");
        let clock = clock();
        let locale = DateLocale::default();
        let ctx = FieldContext::new(&props, &clock, &locale);
        let mut tracker = RevisionTracker::new();

        let mut para = Paragraph::new();
        let range = para.append_field_with_result(" AUTHOR ", None, &mut tracker);
        assert_eq!(para.text(), "\u{13} AUTHOR \u{14}\u{15}");
        assert!(para.update_field(range.start, &ctx).unwrap());
        assert_eq!(para.text(), "\u{13} AUTHOR \u{14}Test Author\u{15}");

        // A second update replaces rather than appends.
        assert!(para.update_field(range.start, &ctx).unwrap());
        assert_eq!(para.fields()[0].result(), Some("Test Author"));
    }

    #[test]
    fn test_update_unsupported_field_is_untouched() {
        let props = BuiltInProperties::new();
        let clock = clock();
        let locale = DateLocale::default();
        let ctx = FieldContext::new(&props, &clock, &locale);
        let mut tracker = RevisionTracker::new();

        let mut para = Paragraph::new();
        let range = para.append_field_with_result(" PAGE ", Some("7"), &mut tracker);
        assert!(!para.update_field(range.start, &ctx).unwrap());
        assert_eq!(para.text(), "\u{13} PAGE \u{14}7\u{15}");
        assert_eq!(para.update_fields(&ctx), 0);
    }

    #[test]
    fn test_update_field_rejects_non_start() {
        let props = BuiltInProperties::new();
        let clock = clock();
        let locale = DateLocale::default();
        let ctx = FieldContext::new(&props, &clock, &locale);
        let mut tracker = RevisionTracker::new();

        let mut para = Paragraph::new();
        let range = para.append_field_with_result(" DATE ", None, &mut tracker);
        assert!(matches!(
            para.update_field(range.end, &ctx),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_join_runs_with_same_formatting() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::new();
        para.append_text("Run 1. ", &mut tracker);
        para.append_text("Run 2. ", &mut tracker);
        para.append_text("Run 3. ", &mut tracker);
        para.append_run(
            Run::with_font("Run 4. ", Font::new().with_style(StyleIdentifier::Emphasis)),
            &mut tracker,
        );

        assert_eq!(para.join_runs_with_same_formatting(), 2);
        let texts: Vec<&str> = para.runs().map(Run::text).collect();
        assert_eq!(texts, ["Run 1. Run 2. Run 3. ", "Run 4. "]);
        assert_eq!(para.join_runs_with_same_formatting(), 0);
    }

    #[test]
    fn test_field_markers_block_merging() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::new();
        para.append_text("before ", &mut tracker);
        para.append_field_with_result(" QUOTE \"x\" ", Some("x"), &mut tracker);
        para.append_text(" after", &mut tracker);
        assert_eq!(para.join_runs_with_same_formatting(), 0);
        assert_eq!(para.run_count(), 4);
    }

    #[test]
    fn test_remove_run_rejects_markers() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::new();
        let range = para.append_field_with_result(" DATE ", None, &mut tracker);
        assert!(matches!(
            para.remove_run(range.start, &mut tracker),
            Err(Error::InvalidArgument(_))
        ));
        let run = para.append_text("x", &mut tracker);
        assert_eq!(para.remove_run(run, &mut tracker).unwrap().unwrap().text(), "x");
    }

    #[test]
    fn test_remove_field() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::with_text("a");
        let range = para.append_field_with_result(" AUTHOR ", Some("x"), &mut tracker);
        para.remove_field(range.start, &mut tracker).unwrap();
        assert_eq!(para.text(), "a");
        assert!(para.fields().is_empty());
    }

    #[test]
    fn test_check_field_markers() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::with_text("a");
        para.append_field_with_result(" AUTHOR ", Some("x"), &mut tracker);
        para.append_field_with_result(" LISTNUM ", None, &mut tracker);
        assert!(para.check_field_markers().is_ok());

        let mut doubled = para.clone();
        doubled
            .content
            .insert(2, Inline::FieldSeparator(FieldChar::new(FieldType::Author)));
        assert!(matches!(doubled.check_field_markers(), Err(Error::InvalidFormat(_))));

        let mut stray = para.clone();
        stray
            .content
            .insert(0, Inline::FieldEnd(FieldChar::new(FieldType::Unknown)));
        assert!(matches!(stray.check_field_markers(), Err(Error::InvalidFormat(_))));

        let mut open = para;
        open.content.pop();
        assert!(matches!(open.check_field_markers(), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_effective_tab_stops_skip_clear() {
        let mut tracker = RevisionTracker::new();
        let mut para = Paragraph::new();
        assert_eq!(para.effective_tab_stops().len(), 0);
        para.update_format(&mut tracker, |format| {
            format.tab_stops.add(72.0, TabAlignment::Left, TabLeader::Dashes);
            format.tab_stops.add(216.0, TabAlignment::Center, TabLeader::Dashes);
            format.tab_stops.add(360.0, TabAlignment::Right, TabLeader::Dashes);
            format.tab_stops.add(400.0, TabAlignment::Clear, TabLeader::None);
        });
        assert_eq!(para.format().tab_stops.len(), 4);
        assert_eq!(para.effective_tab_stops().len(), 3);
        assert!(!para.is_format_revision());
    }
}
