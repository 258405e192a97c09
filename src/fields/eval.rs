//! Field evaluation against document properties, a clock, and a locale.
use super::code::FieldCode;
use super::datetime::{DateLocale, format_date_picture};
use super::types::FieldType;
use crate::common::BuiltInProperties;
use chrono::{Local, NaiveDateTime};
use std::fmt;
use tracing::trace;

/// Source of the current time for DATE and TIME fields.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant. Useful for deterministic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Everything a field needs to compute its result.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    properties: &'a BuiltInProperties,
    clock: &'a dyn Clock,
    locale: &'a DateLocale,
}

impl<'a> FieldContext<'a> {
    pub fn new(properties: &'a BuiltInProperties, clock: &'a dyn Clock, locale: &'a DateLocale) -> Self {
        Self {
            properties,
            clock,
            locale,
        }
    }

    #[inline]
    pub fn properties(&self) -> &BuiltInProperties {
        self.properties
    }

    #[inline]
    pub fn locale(&self) -> &DateLocale {
        self.locale
    }

    /// Compute the result text of a field.
    ///
    /// Returns `None` for field types that cannot be evaluated here (PAGE,
    /// TOC, REF, ...). Document-property fields whose property is unset
    /// evaluate to an empty string.
    pub fn evaluate(&self, code: &FieldCode) -> Option<String> {
        let props = self.properties;
        let raw = match code.field_type() {
            FieldType::Date => {
                let picture = code.date_picture().unwrap_or(self.locale.date_pattern());
                format_date_picture(&self.clock.now(), picture, self.locale)
            },
            FieldType::Time => {
                let picture = code.date_picture().unwrap_or(self.locale.time_pattern());
                format_date_picture(&self.clock.now(), picture, self.locale)
            },
            FieldType::CreateDate => self.format_stored_date(code, props.created),
            FieldType::SaveDate => self.format_stored_date(code, props.last_saved),
            FieldType::Author => props.author().to_string(),
            FieldType::Title => props.title.clone().unwrap_or_default(),
            FieldType::Subject => props.subject.clone().unwrap_or_default(),
            FieldType::Keywords => props.keywords.clone().unwrap_or_default(),
            FieldType::Comments => props.comments.clone().unwrap_or_default(),
            FieldType::LastSavedBy => props.last_saved_by.clone().unwrap_or_default(),
            FieldType::Quote => code.arguments().first().cloned().unwrap_or_default(),
            FieldType::ListNum
            | FieldType::Page
            | FieldType::NumPages
            | FieldType::Toc
            | FieldType::Ref
            | FieldType::Hyperlink
            | FieldType::MergeField
            | FieldType::Unknown => {
                trace!(field = %code.field_type(), "field type not evaluable");
                return None;
            },
        };

        let result = match code.general_format() {
            Some(format) => apply_general_format(&raw, format),
            None => raw,
        };
        trace!(field = %code.field_type(), result = %result, "field evaluated");
        Some(result)
    }

    fn format_stored_date(&self, code: &FieldCode, value: Option<NaiveDateTime>) -> String {
        let Some(value) = value else {
            return String::new();
        };
        match code.date_picture() {
            Some(picture) => format_date_picture(&value, picture, self.locale),
            None => {
                let picture = format!("{} {}", self.locale.date_pattern(), self.locale.time_pattern());
                format_date_picture(&value, &picture, self.locale)
            },
        }
    }
}

/// Apply a `\*` text format. Unknown formats (including `MERGEFORMAT`) leave
/// the text unchanged.
pub fn apply_general_format(text: &str, format: &str) -> String {
    if format.eq_ignore_ascii_case("Upper") {
        text.to_uppercase()
    } else if format.eq_ignore_ascii_case("Lower") {
        text.to_lowercase()
    } else if format.eq_ignore_ascii_case("Caps") {
        let mut out = String::with_capacity(text.len());
        let mut at_word_start = true;
        for c in text.chars() {
            if at_word_start && c.is_alphabetic() {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = c.is_whitespace();
        }
        out
    } else if format.eq_ignore_ascii_case("FirstCap") {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        text.to_string()
    }
}
