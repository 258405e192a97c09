//! Document sections.
use super::body::Body;
use serde::{Deserialize, Serialize};

/// A section of a document. Each section owns one body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub(crate) body: Body,
}

impl Section {
    /// Create a section whose body holds one empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(body: Body) -> Self {
        Self { body }
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
