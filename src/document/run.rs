//! Text runs and character formatting.
use super::format::{StyleIdentifier, UnderlineStyle};
use crate::common::NodeId;
use crate::revision::ContentChange;
use serde::{Deserialize, Serialize};

/// Character formatting of a run.
///
/// Two runs with equal fonts are candidates for merging; every attribute
/// takes part in the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Font family, `None` inherits from the style
    pub name: Option<String>,
    /// Size in points, `None` inherits from the style
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: Option<UnderlineStyle>,
    /// RGB hex color such as `"FF0000"`
    pub color: Option<String>,
    /// Highlight color name such as `"yellow"`
    pub highlight: Option<String>,
    pub style_identifier: StyleIdentifier,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: None,
            size: None,
            bold: false,
            italic: false,
            underline: None,
            color: None,
            highlight: None,
            style_identifier: StyleIdentifier::DefaultParagraphFont,
        }
    }
}

impl Font {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a character style.
    pub fn with_style(mut self, style: StyleIdentifier) -> Self {
        self.style_identifier = style;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }
}

/// A span of text sharing one set of character formatting.
///
/// Cloning a run creates a new node: the clone gets a fresh [`NodeId`].
#[derive(Debug, Serialize, Deserialize)]
pub struct Run {
    #[serde(skip, default = "NodeId::next")]
    pub(crate) id: NodeId,
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) font: Font,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) change: Option<ContentChange>,
}

impl Clone for Run {
    fn clone(&self) -> Self {
        Self {
            id: NodeId::next(),
            text: self.text.clone(),
            font: self.font.clone(),
            change: self.change.clone(),
        }
    }
}

impl Run {
    /// Create a run with default formatting.
    pub fn new(text: &str) -> Self {
        Self::with_font(text, Font::default())
    }

    pub fn with_font(text: &str, font: Font) -> Self {
        Self {
            id: NodeId::next(),
            text: text.to_string(),
            font,
            change: None,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    #[inline]
    pub fn font(&self) -> &Font {
        &self.font
    }

    #[inline]
    pub fn font_mut(&mut self) -> &mut Font {
        &mut self.font
    }

    /// Pending insertion or deletion of this run.
    #[inline]
    pub fn change(&self) -> Option<&ContentChange> {
        self.change.as_ref()
    }

    pub fn is_insert_revision(&self) -> bool {
        self.change.as_ref().is_some_and(ContentChange::is_insert)
    }

    pub fn is_delete_revision(&self) -> bool {
        self.change.as_ref().is_some_and(ContentChange::is_delete)
    }

    /// Whether `other` can be merged into this run.
    pub(crate) fn can_merge(&self, other: &Run) -> bool {
        self.font == other.font && self.change == other.change
    }
}
