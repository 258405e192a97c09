//! Formatting types for paragraphs and runs.
//!
//! Everything here is plain configuration data: explicit structs and enums
//! rather than property bags. Lengths are in points.
use serde::{Deserialize, Serialize};

/// Line spacing options for paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum LineSpacing {
    /// Single line spacing
    #[default]
    Single,
    /// 1.5 line spacing
    OneAndHalf,
    /// Double line spacing
    Double,
    /// Multiple line spacing (e.g., 1.15)
    Multiple(f64),
    /// Exact spacing in points
    Exact(f64),
    /// At least spacing in points
    AtLeast(f64),
}

/// Paragraph alignment options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ParagraphAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl ParagraphAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "both",
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "both" | "distribute" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Underline styles for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnderlineStyle {
    Single,
    Double,
    Thick,
    Dotted,
    Dashed,
    DotDash,
    DotDotDash,
    Wave,
}

impl UnderlineStyle {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Thick => "thick",
            Self::Dotted => "dotted",
            Self::Dashed => "dash",
            Self::DotDash => "dotDash",
            Self::DotDotDash => "dotDotDash",
            Self::Wave => "wave",
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "single" => Some(Self::Single),
            "double" => Some(Self::Double),
            "thick" => Some(Self::Thick),
            "dotted" => Some(Self::Dotted),
            "dash" => Some(Self::Dashed),
            "dotDash" => Some(Self::DotDash),
            "dotDotDash" => Some(Self::DotDotDash),
            "wave" => Some(Self::Wave),
            _ => None,
        }
    }
}

/// Built-in style identifiers.
///
/// Only the styles the model needs to tell apart; style inheritance is not
/// resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StyleIdentifier {
    #[default]
    Normal,
    DefaultParagraphFont,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Title,
    Subtitle,
    Quote,
    IntenseQuote,
    Emphasis,
    Strong,
    Hyperlink,
}

impl StyleIdentifier {
    /// Style id as written in WordprocessingML.
    pub fn style_id(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::DefaultParagraphFont => "DefaultParagraphFont",
            Self::Heading1 => "Heading1",
            Self::Heading2 => "Heading2",
            Self::Heading3 => "Heading3",
            Self::Heading4 => "Heading4",
            Self::Heading5 => "Heading5",
            Self::Heading6 => "Heading6",
            Self::Title => "Title",
            Self::Subtitle => "Subtitle",
            Self::Quote => "Quote",
            Self::IntenseQuote => "IntenseQuote",
            Self::Emphasis => "Emphasis",
            Self::Strong => "Strong",
            Self::Hyperlink => "Hyperlink",
        }
    }

    /// Look up a style by its WordprocessingML id.
    pub fn from_style_id(id: &str) -> Option<Self> {
        Some(match id {
            "Normal" => Self::Normal,
            "DefaultParagraphFont" => Self::DefaultParagraphFont,
            "Heading1" => Self::Heading1,
            "Heading2" => Self::Heading2,
            "Heading3" => Self::Heading3,
            "Heading4" => Self::Heading4,
            "Heading5" => Self::Heading5,
            "Heading6" => Self::Heading6,
            "Title" => Self::Title,
            "Subtitle" => Self::Subtitle,
            "Quote" => Self::Quote,
            "IntenseQuote" => Self::IntenseQuote,
            "Emphasis" => Self::Emphasis,
            "Strong" => Self::Strong,
            "Hyperlink" => Self::Hyperlink,
            _ => return None,
        })
    }

    /// Whether this is one of the heading styles.
    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            Self::Heading1
                | Self::Heading2
                | Self::Heading3
                | Self::Heading4
                | Self::Heading5
                | Self::Heading6
        )
    }
}

/// Tab stop alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TabAlignment {
    #[default]
    Left,
    Center,
    Right,
    Decimal,
    Bar,
    /// Clears an inherited tab stop at this position
    Clear,
}

impl TabAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Decimal => "decimal",
            Self::Bar => "bar",
            Self::Clear => "clear",
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "decimal" => Some(Self::Decimal),
            "bar" => Some(Self::Bar),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

/// Leader character drawn up to a tab stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TabLeader {
    #[default]
    None,
    Dots,
    Dashes,
    Line,
    Heavy,
    MiddleDot,
}

impl TabLeader {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Dots => "dot",
            Self::Dashes => "hyphen",
            Self::Line => "underscore",
            Self::Heavy => "heavy",
            Self::MiddleDot => "middleDot",
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "dot" => Some(Self::Dots),
            "hyphen" => Some(Self::Dashes),
            "underscore" => Some(Self::Line),
            "heavy" => Some(Self::Heavy),
            "middleDot" => Some(Self::MiddleDot),
            _ => None,
        }
    }
}

/// A single tab stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TabStop {
    /// Position from the paragraph's leading edge, in points
    pub position: f64,
    pub alignment: TabAlignment,
    pub leader: TabLeader,
}

/// Tab stops of a paragraph, kept sorted by position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabStops {
    stops: Vec<TabStop>,
}

impl TabStops {
    /// Add a tab stop. A stop already at `position` is replaced.
    pub fn add(&mut self, position: f64, alignment: TabAlignment, leader: TabLeader) {
        let stop = TabStop {
            position,
            alignment,
            leader,
        };
        match self
            .stops
            .binary_search_by(|s| s.position.total_cmp(&position))
        {
            Ok(index) => self.stops[index] = stop,
            Err(index) => self.stops.insert(index, stop),
        }
    }

    /// Remove the tab stop at `position`. Returns whether one was removed.
    pub fn remove_by_position(&mut self, position: f64) -> bool {
        match self
            .stops
            .binary_search_by(|s| s.position.total_cmp(&position))
        {
            Ok(index) => {
                self.stops.remove(index);
                true
            },
            Err(_) => false,
        }
    }

    /// Get the tab stop at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&TabStop> {
        self.stops.get(index)
    }

    /// First tab stop strictly after `position`.
    pub fn after(&self, position: f64) -> Option<&TabStop> {
        self.stops.iter().find(|s| s.position > position)
    }

    /// Last tab stop strictly before `position`.
    pub fn before(&self, position: f64) -> Option<&TabStop> {
        self.stops.iter().rev().find(|s| s.position < position)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn clear(&mut self) {
        self.stops.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TabStop> {
        self.stops.iter()
    }
}

/// Position of a drop cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DropCapPosition {
    /// No drop cap
    #[default]
    None,
    /// Dropped within the text
    Normal,
    /// Dropped into the margin
    Margin,
}

impl DropCapPosition {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Normal => "drop",
            Self::Margin => "margin",
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "drop" => Some(Self::Normal),
            "margin" => Some(Self::Margin),
            _ => None,
        }
    }
}

/// How a frame's height is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HeightRule {
    #[default]
    Auto,
    AtLeast,
    Exactly,
}

impl HeightRule {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::AtLeast => "atLeast",
            Self::Exactly => "exact",
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Self::Auto),
            "atLeast" => Some(Self::AtLeast),
            "exact" => Some(Self::Exactly),
            _ => None,
        }
    }
}

/// Anchor for a frame's horizontal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RelativeHorizontalPosition {
    Margin,
    Page,
    #[default]
    Column,
}

impl RelativeHorizontalPosition {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Margin => "margin",
            Self::Page => "page",
            Self::Column => "text",
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "margin" => Some(Self::Margin),
            "page" => Some(Self::Page),
            "text" => Some(Self::Column),
            _ => None,
        }
    }
}

/// Anchor for a frame's vertical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RelativeVerticalPosition {
    #[default]
    Margin,
    Page,
    Paragraph,
}

impl RelativeVerticalPosition {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Margin => "margin",
            Self::Page => "page",
            Self::Paragraph => "text",
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "margin" => Some(Self::Margin),
            "page" => Some(Self::Page),
            "text" => Some(Self::Paragraph),
            _ => None,
        }
    }
}

/// Horizontal alignment of a frame relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HorizontalAlignment {
    /// Positioned by `horizontal_position`
    #[default]
    None,
    Left,
    Center,
    Right,
    Inside,
    Outside,
}

impl HorizontalAlignment {
    pub(crate) fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
            Self::Inside => Some("inside"),
            Self::Outside => Some("outside"),
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "inside" => Some(Self::Inside),
            "outside" => Some(Self::Outside),
            _ => None,
        }
    }
}

/// Vertical alignment of a frame relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VerticalAlignment {
    /// Positioned by `vertical_position`
    #[default]
    None,
    Inline,
    Top,
    Center,
    Bottom,
    Inside,
    Outside,
}

impl VerticalAlignment {
    pub(crate) fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Inline => Some("inline"),
            Self::Top => Some("top"),
            Self::Center => Some("center"),
            Self::Bottom => Some("bottom"),
            Self::Inside => Some("inside"),
            Self::Outside => Some("outside"),
        }
    }

    pub(crate) fn from_wml(s: &str) -> Option<Self> {
        match s {
            "inline" => Some(Self::Inline),
            "top" => Some(Self::Top),
            "center" => Some(Self::Center),
            "bottom" => Some(Self::Bottom),
            "inside" => Some(Self::Inside),
            "outside" => Some(Self::Outside),
            _ => None,
        }
    }
}

/// Frame (text box) positioning of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameFormat {
    pub width: f64,
    pub height: f64,
    pub height_rule: HeightRule,
    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
    pub horizontal_position: f64,
    pub relative_horizontal_position: RelativeHorizontalPosition,
    pub horizontal_distance_from_text: f64,
    pub vertical_position: f64,
    pub relative_vertical_position: RelativeVerticalPosition,
    pub vertical_distance_from_text: f64,
}

/// Non-content formatting state of a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphFormat {
    pub alignment: ParagraphAlignment,
    pub style_identifier: StyleIdentifier,
    pub line_spacing: LineSpacing,
    /// Spacing before, in points
    pub space_before: f64,
    /// Spacing after, in points
    pub space_after: f64,
    pub left_indent: f64,
    pub right_indent: f64,
    /// Negative values are a hanging indent
    pub first_line_indent: f64,
    pub keep_with_next: bool,
    pub tab_stops: TabStops,
    pub drop_cap_position: DropCapPosition,
    pub lines_to_drop: u8,
    pub far_east_line_break_control: bool,
    pub word_wrap: bool,
    pub hanging_punctuation: bool,
    /// Present when the paragraph is laid out as a frame
    pub frame: Option<FrameFormat>,
}

impl Default for ParagraphFormat {
    fn default() -> Self {
        Self {
            alignment: ParagraphAlignment::Left,
            style_identifier: StyleIdentifier::Normal,
            line_spacing: LineSpacing::Single,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
            right_indent: 0.0,
            first_line_indent: 0.0,
            keep_with_next: false,
            tab_stops: TabStops::default(),
            drop_cap_position: DropCapPosition::None,
            lines_to_drop: 1,
            far_east_line_break_control: true,
            word_wrap: true,
            hanging_punctuation: true,
            frame: None,
        }
    }
}

impl ParagraphFormat {
    /// Whether the paragraph is laid out as a frame.
    #[inline]
    pub fn is_frame(&self) -> bool {
        self.frame.is_some()
    }

    /// Whether any Asian typography flag differs from Word's defaults.
    pub fn has_asian_typography_overrides(&self) -> bool {
        !self.far_east_line_break_control || !self.word_wrap || !self.hanging_punctuation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_stops_sorted_and_replaced() {
        let mut tabs = TabStops::default();
        tabs.add(216.0, TabAlignment::Center, TabLeader::Dashes);
        tabs.add(72.0, TabAlignment::Left, TabLeader::Dots);
        tabs.add(360.0, TabAlignment::Right, TabLeader::Line);
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs.get(0).unwrap().position, 72.0);
        assert_eq!(tabs.get(2).unwrap().position, 360.0);

        tabs.add(72.0, TabAlignment::Decimal, TabLeader::None);
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs.get(0).unwrap().alignment, TabAlignment::Decimal);

        assert_eq!(tabs.after(72.0).unwrap().position, 216.0);
        assert_eq!(tabs.before(216.0).unwrap().position, 72.0);
        assert!(tabs.after(360.0).is_none());

        assert!(tabs.remove_by_position(216.0));
        assert!(!tabs.remove_by_position(216.0));
        assert_eq!(tabs.len(), 2);
    }

    #[test]
    fn test_default_paragraph_format() {
        let format = ParagraphFormat::default();
        assert_eq!(format.drop_cap_position, DropCapPosition::None);
        assert!(!format.is_frame());
        assert!(format.far_east_line_break_control);
        assert!(format.word_wrap);
        assert!(format.hanging_punctuation);
        assert!(!format.has_asian_typography_overrides());
    }

    #[test]
    fn test_style_id_lookup() {
        assert_eq!(
            StyleIdentifier::from_style_id("Heading1"),
            Some(StyleIdentifier::Heading1)
        );
        assert!(StyleIdentifier::Heading1.is_heading());
        assert!(!StyleIdentifier::Quote.is_heading());
        assert_eq!(StyleIdentifier::from_style_id("Nope"), None);
    }
}
