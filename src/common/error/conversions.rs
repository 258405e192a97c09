//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert errors raised by
//! the codec crates into the unified Error type.

use super::types::Error;

#[cfg(feature = "wordml")]
impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

#[cfg(feature = "wordml")]
impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlError(err.to_string())
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Error::InvalidFormat(err.to_string())
    }
}
