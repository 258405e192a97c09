//! Fields: inline instructions such as `AUTHOR` or `DATE` whose result text is
//! computed from the document.
//!
//! A field lives in a paragraph's content as three markers with runs between
//! them:
//!
//! ```text
//! FieldStart  <code runs>  FieldSeparator  <result runs>  FieldEnd
//! ```
//!
//! LISTNUM fields have no separator and no result region. This module holds
//! the type table, the field-code parser, and the evaluator; the markers
//! themselves are part of [`crate::document`].

pub mod code;
pub mod datetime;
pub mod eval;
pub mod types;

pub use code::{FieldCode, FieldSwitch};
pub use datetime::{DateLocale, format_date_picture};
pub use eval::{Clock, FieldContext, FixedClock, SystemClock, apply_general_format};
pub use types::FieldType;

use crate::common::NodeId;

/// Ids of the markers of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldRange {
    pub start: NodeId,
    /// `None` for fields without a result region (LISTNUM)
    pub separator: Option<NodeId>,
    pub end: NodeId,
}

/// Read-only view of a field in a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) field_type: FieldType,
    pub(crate) code: String,
    pub(crate) result: Option<String>,
    pub(crate) range: FieldRange,
}

impl Field {
    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Field code text, e.g. `" AUTHOR "`.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Result text, `None` when the field has no separator.
    #[inline]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    #[inline]
    pub fn range(&self) -> FieldRange {
        self.range
    }

    /// Parse the code of this field.
    pub fn parsed_code(&self) -> FieldCode {
        FieldCode::parse(&self.code)
    }
}
