//! Built-in document properties.
//!
//! These are the standard summary properties a Word document carries (author,
//! title, and so on). Document-property fields such as `AUTHOR` and `TITLE`
//! evaluate against this structure.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Standard built-in document properties.
///
/// Unset text properties are `None`; fields that read them resolve to an empty
/// result rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuiltInProperties {
    /// Document author/creator
    pub author: Option<String>,
    /// Document title
    pub title: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Keywords associated with the document
    pub keywords: Option<String>,
    /// Document description/comments
    pub comments: Option<String>,
    /// Last person to save the document
    pub last_saved_by: Option<String>,
    /// Company/organization
    pub company: Option<String>,
    /// Document category
    pub category: Option<String>,
    /// Creation time
    pub created: Option<NaiveDateTime>,
    /// Last save time
    pub last_saved: Option<NaiveDateTime>,
    /// Revision number as stored in the file. Saving writes it unchanged.
    pub revision_number: u32,
}

impl BuiltInProperties {
    /// Create an empty property set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the author. An empty string clears the property.
    pub fn set_author(&mut self, author: &str) {
        self.author = non_empty(author);
    }

    /// Set the title. An empty string clears the property.
    pub fn set_title(&mut self, title: &str) {
        self.title = non_empty(title);
    }

    /// Author, or an empty string when unset.
    #[inline]
    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or("")
    }

    /// Check if the properties contain any actual data.
    ///
    /// Returns true if at least one field is populated.
    pub fn has_data(&self) -> bool {
        self.author.is_some()
            || self.title.is_some()
            || self.subject.is_some()
            || self.keywords.is_some()
            || self.comments.is_some()
            || self.last_saved_by.is_some()
            || self.company.is_some()
            || self.category.is_some()
            || self.created.is_some()
            || self.last_saved.is_some()
            || self.revision_number > 0
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
