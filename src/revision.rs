//! Track changes (revisions) for the document model.
//!
//! While tracking is enabled, structural edits are not applied outright: new
//! paragraphs and inline nodes carry an insertion mark, removed ones stay in
//! place with a deletion mark, and paragraph format edits remember the format
//! they replaced. Accepting or rejecting resolves every pending mark at once.
//!
//! # Architecture
//!
//! - `RevisionTracker`: the on/off state plus author and date of the current
//!   tracking session. It is passed explicitly to mutation operations.
//! - `RevisionMark`: who made a change and when, stamped on the changed node
//! - `ContentChange` / `FormatChange`: the pending change stored on a node
//! - `Revision`: a read-only view of one pending change, for reporting
//!
//! # Example
//!
//! ```rust
//! use quire::Document;
//!
//! let mut doc = Document::new();
//! doc.start_track_revisions("John Doe", None);
//! doc.first_body_editor()?.append_paragraph("Tracked text.");
//!
//! assert_eq!(doc.revisions().len(), 1);
//! doc.accept_all_revisions();
//! assert!(doc.revisions().is_empty());
//! # Ok::<(), quire::Error>(())
//! ```
use crate::common::NodeId;
use crate::document::ParagraphFormat;
use bitflags::bitflags;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Type of tracked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevisionType {
    /// Content insertion
    Insert,
    /// Content deletion
    Delete,
    /// Paragraph formatting change
    FormatChange,
}

impl fmt::Display for RevisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "Insert"),
            Self::Delete => write!(f, "Delete"),
            Self::FormatChange => write!(f, "Format Change"),
        }
    }
}

bitflags! {
    /// Pending revision kinds on a single paragraph.
    ///
    /// The three kinds are independent; a paragraph inserted while tracking can
    /// also carry a format change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RevisionFlags: u8 {
        const INSERT = 0b001;
        const DELETE = 0b010;
        const FORMAT = 0b100;
    }
}

/// Author and time stamped on a pending change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMark {
    id: u32,
    author: String,
    date: NaiveDateTime,
}

impl RevisionMark {
    pub fn new(id: u32, author: String, date: NaiveDateTime) -> Self {
        Self { id, author, date }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[inline]
    pub fn date(&self) -> NaiveDateTime {
        self.date
    }
}

/// A pending insertion or deletion of a paragraph or inline node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentChange {
    Inserted(RevisionMark),
    Deleted(RevisionMark),
}

impl ContentChange {
    #[inline]
    pub fn mark(&self) -> &RevisionMark {
        match self {
            Self::Inserted(mark) | Self::Deleted(mark) => mark,
        }
    }

    #[inline]
    pub fn revision_type(&self) -> RevisionType {
        match self {
            Self::Inserted(_) => RevisionType::Insert,
            Self::Deleted(_) => RevisionType::Delete,
        }
    }

    #[inline]
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }

    #[inline]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }
}

/// A pending paragraph format change, holding the format it replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatChange {
    pub(crate) mark: RevisionMark,
    pub(crate) previous: ParagraphFormat,
}

impl FormatChange {
    #[inline]
    pub fn mark(&self) -> &RevisionMark {
        &self.mark
    }

    /// Format in effect before the first tracked change.
    #[inline]
    pub fn previous(&self) -> &ParagraphFormat {
        &self.previous
    }
}

/// What a revision applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevisionTarget {
    Paragraph(NodeId),
    Inline { paragraph: NodeId, node: NodeId },
}

/// A pending change, as reported by [`crate::Document::revisions`].
#[derive(Debug, Clone)]
pub struct Revision {
    /// Text content affected by this revision
    text: String,
    mark: RevisionMark,
    target: RevisionTarget,
    revision_type: RevisionType,
}

impl Revision {
    pub(crate) fn new(
        revision_type: RevisionType,
        mark: RevisionMark,
        target: RevisionTarget,
        text: String,
    ) -> Self {
        Self {
            text,
            mark,
            target,
            revision_type,
        }
    }

    #[inline]
    pub fn revision_type(&self) -> RevisionType {
        self.revision_type
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.mark.id
    }

    #[inline]
    pub fn author(&self) -> &str {
        &self.mark.author
    }

    #[inline]
    pub fn date(&self) -> NaiveDateTime {
        self.mark.date
    }

    #[inline]
    pub fn target(&self) -> RevisionTarget {
        self.target
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackingSession {
    author: String,
    date: NaiveDateTime,
}

/// Revision tracking state of one document.
///
/// Disabled by default. Mutations consult [`RevisionTracker::stamp`]: it returns
/// a fresh mark while tracking and `None` otherwise. The session is not
/// serialized; a decoded document starts with tracking disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionTracker {
    #[serde(skip)]
    session: Option<TrackingSession>,
    next_id: u32,
}

impl RevisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable tracking; subsequent changes are attributed to `author` at `date`.
    ///
    /// Calling this while already tracking switches the author and date.
    pub fn start(&mut self, author: &str, date: NaiveDateTime) {
        debug!(author, %date, "revision tracking started");
        self.session = Some(TrackingSession {
            author: author.to_string(),
            date,
        });
    }

    /// Disable tracking. Pending revisions stay pending.
    pub fn stop(&mut self) {
        if self.session.take().is_some() {
            debug!("revision tracking stopped");
        }
    }

    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// Author of the current tracking session.
    pub fn author(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.author.as_str())
    }

    /// Date of the current tracking session.
    pub fn date(&self) -> Option<NaiveDateTime> {
        self.session.as_ref().map(|s| s.date)
    }

    /// A new revision mark if tracking is enabled.
    pub fn stamp(&mut self) -> Option<RevisionMark> {
        let session = self.session.as_ref()?;
        let mark = RevisionMark::new(self.next_id, session.author.clone(), session.date);
        self.next_id += 1;
        Some(mark)
    }

    /// Make sure ids handed out later do not collide with `id`.
    pub(crate) fn observe_id(&mut self, id: u32) {
        if id >= self.next_id {
            self.next_id = id + 1;
        }
    }
}
