//! Field types and the static name table.
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a field, determined by the first word of its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Date,
    Time,
    Author,
    ListNum,
    Quote,
    Title,
    Subject,
    Keywords,
    Comments,
    LastSavedBy,
    CreateDate,
    SaveDate,
    Page,
    NumPages,
    Toc,
    Ref,
    Hyperlink,
    MergeField,
    /// A field code whose name is not in the table
    Unknown,
}

/// Field names as they appear in field codes, keyed in upper case.
static FIELD_NAMES: phf::Map<&'static str, FieldType> = phf_map! {
    "DATE" => FieldType::Date,
    "TIME" => FieldType::Time,
    "AUTHOR" => FieldType::Author,
    "LISTNUM" => FieldType::ListNum,
    "QUOTE" => FieldType::Quote,
    "TITLE" => FieldType::Title,
    "SUBJECT" => FieldType::Subject,
    "KEYWORDS" => FieldType::Keywords,
    "COMMENTS" => FieldType::Comments,
    "LASTSAVEDBY" => FieldType::LastSavedBy,
    "CREATEDATE" => FieldType::CreateDate,
    "SAVEDATE" => FieldType::SaveDate,
    "PAGE" => FieldType::Page,
    "NUMPAGES" => FieldType::NumPages,
    "TOC" => FieldType::Toc,
    "REF" => FieldType::Ref,
    "HYPERLINK" => FieldType::Hyperlink,
    "MERGEFIELD" => FieldType::MergeField,
};

impl FieldType {
    /// Look up a field name (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        if let Some(ty) = FIELD_NAMES.get(name) {
            return *ty;
        }
        FIELD_NAMES
            .get(name.to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(Self::Unknown)
    }

    /// Determine the type of a full field code such as `" TIME \@ \"HH:mm\" "`.
    pub fn from_code(code: &str) -> Self {
        code.split_whitespace()
            .next()
            .map(Self::from_name)
            .unwrap_or(Self::Unknown)
    }

    /// Name used in field codes, `None` for [`FieldType::Unknown`].
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Author => "AUTHOR",
            Self::ListNum => "LISTNUM",
            Self::Quote => "QUOTE",
            Self::Title => "TITLE",
            Self::Subject => "SUBJECT",
            Self::Keywords => "KEYWORDS",
            Self::Comments => "COMMENTS",
            Self::LastSavedBy => "LASTSAVEDBY",
            Self::CreateDate => "CREATEDATE",
            Self::SaveDate => "SAVEDATE",
            Self::Page => "PAGE",
            Self::NumPages => "NUMPAGES",
            Self::Toc => "TOC",
            Self::Ref => "REF",
            Self::Hyperlink => "HYPERLINK",
            Self::MergeField => "MERGEFIELD",
            Self::Unknown => return None,
        })
    }

    /// Canonical field code for this type, e.g. `" AUTHOR "`.
    pub fn canonical_code(&self) -> Option<String> {
        self.name().map(|name| format!(" {} ", name))
    }

    /// Whether fields of this type have a separator and result region.
    ///
    /// LISTNUM fields consist of start, code, and end only.
    #[inline]
    pub fn has_separator(&self) -> bool {
        !matches!(self, Self::ListNum)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("UNKNOWN"))
    }
}
