//! Control characters used in extracted text.
//!
//! Field markers and breaks are rendered as single characters so that the
//! flat text of a paragraph keeps the structure of its content.

/// Start of a field
pub const FIELD_START_CHAR: char = '\u{13}';
/// Boundary between a field's code and its result
pub const FIELD_SEPARATOR_CHAR: char = '\u{14}';
/// End of a field
pub const FIELD_END_CHAR: char = '\u{15}';
/// Terminates every paragraph except the last of a body
pub const PARAGRAPH_BREAK_CHAR: char = '\r';
/// Terminates the last paragraph of a body
pub const SECTION_BREAK_CHAR: char = '\u{c}';
pub const PAGE_BREAK_CHAR: char = '\u{c}';
pub const LINE_BREAK_CHAR: char = '\u{b}';
pub const TAB_CHAR: char = '\t';
