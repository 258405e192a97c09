//! Inline content items of a paragraph.
use super::run::Run;
use super::text::{FIELD_END_CHAR, FIELD_SEPARATOR_CHAR, FIELD_START_CHAR};
use crate::common::NodeId;
use crate::fields::FieldType;
use crate::revision::ContentChange;
use serde::{Deserialize, Serialize};

/// A field boundary marker. Clones get a fresh [`NodeId`].
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldChar {
    #[serde(skip, default = "NodeId::next")]
    pub(crate) id: NodeId,
    pub(crate) field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) change: Option<ContentChange>,
}

impl Clone for FieldChar {
    fn clone(&self) -> Self {
        Self {
            id: NodeId::next(),
            field_type: self.field_type,
            change: self.change.clone(),
        }
    }
}

impl FieldChar {
    pub(crate) fn new(field_type: FieldType) -> Self {
        Self {
            id: NodeId::next(),
            field_type,
            change: None,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Type of the field this marker belongs to.
    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

/// One item of a paragraph's ordered content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Inline {
    Run(Run),
    FieldStart(FieldChar),
    FieldSeparator(FieldChar),
    FieldEnd(FieldChar),
}

impl Inline {
    pub fn id(&self) -> NodeId {
        match self {
            Inline::Run(run) => run.id,
            Inline::FieldStart(c) | Inline::FieldSeparator(c) | Inline::FieldEnd(c) => c.id,
        }
    }

    pub fn change(&self) -> Option<&ContentChange> {
        match self {
            Inline::Run(run) => run.change.as_ref(),
            Inline::FieldStart(c) | Inline::FieldSeparator(c) | Inline::FieldEnd(c) => {
                c.change.as_ref()
            },
        }
    }

    pub(crate) fn set_change(&mut self, change: Option<ContentChange>) {
        match self {
            Inline::Run(run) => run.change = change,
            Inline::FieldStart(c) | Inline::FieldSeparator(c) | Inline::FieldEnd(c) => {
                c.change = change
            },
        }
    }

    #[inline]
    pub fn is_insert_revision(&self) -> bool {
        self.change().is_some_and(ContentChange::is_insert)
    }

    #[inline]
    pub fn is_delete_revision(&self) -> bool {
        self.change().is_some_and(ContentChange::is_delete)
    }

    #[inline]
    pub fn as_run(&self) -> Option<&Run> {
        match self {
            Inline::Run(run) => Some(run),
            _ => None,
        }
    }

    #[inline]
    pub fn as_run_mut(&mut self) -> Option<&mut Run> {
        match self {
            Inline::Run(run) => Some(run),
            _ => None,
        }
    }

    /// Whether this item is a field boundary marker.
    #[inline]
    pub fn is_field_char(&self) -> bool {
        !matches!(self, Inline::Run(_))
    }

    /// Append the extracted text of this item.
    pub(crate) fn push_text(&self, out: &mut String) {
        match self {
            Inline::Run(run) => out.push_str(&run.text),
            Inline::FieldStart(_) => out.push(FIELD_START_CHAR),
            Inline::FieldSeparator(_) => out.push(FIELD_SEPARATOR_CHAR),
            Inline::FieldEnd(_) => out.push(FIELD_END_CHAR),
        }
    }
}
