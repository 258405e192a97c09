//! Per-document settings for field evaluation.
use crate::fields::{Clock, DateLocale, FixedClock, SystemClock};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Settings injected into a [`super::Document`].
///
/// The clock and locale drive DATE, TIME, CREATEDATE and SAVEDATE fields and
/// the default revision date. Use a fixed clock for reproducible output.
///
/// # Examples
///
/// ```rust
/// use quire::{Document, DocumentSettings};
/// use quire::fields::DateLocale;
///
/// let settings = DocumentSettings::new().with_locale(DateLocale::en_gb());
/// let doc = Document::with_settings(settings);
/// assert_eq!(doc.settings().locale().date_pattern(), "dd/MM/yyyy");
/// ```
#[derive(Debug, Clone)]
pub struct DocumentSettings {
    pub(crate) locale: DateLocale,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            locale: DateLocale::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl DocumentSettings {
    /// Settings with the en-US locale and the system clock.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: DateLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Freeze the clock at `now`.
    pub fn with_fixed_time(self, now: NaiveDateTime) -> Self {
        self.with_clock(Arc::new(FixedClock(now)))
    }

    #[inline]
    pub fn locale(&self) -> &DateLocale {
        &self.locale
    }

    #[inline]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
