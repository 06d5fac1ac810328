//! Transliterator trait for script-conversion services.
//!
//! Transliteration and gloss translation are external, naturally stateful
//! services. At the pipeline boundary they are modeled strictly as pure
//! synchronous functions: text in, text out, or an explicit failure. The
//! renderer degrades a failure to "pass through untransformed text" plus a
//! warning; it never aborts the run.

use std::fmt::Debug;
use thiserror::Error;

/// Target scheme of a transliteration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Romanized Pali with diacritics (the storage script).
    Roman,
    Devanagari,
    Sinhala,
    Thai,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Roman => "roman",
            Scheme::Devanagari => "devanagari",
            Scheme::Sinhala => "sinhala",
            Scheme::Thai => "thai",
        }
    }
}

/// Error type for transliteration operations.
#[derive(Error, Debug, Clone)]
pub enum TransliterationError {
    #[error("Scheme {0} is not supported by this service")]
    UnsupportedScheme(&'static str),

    #[error("Transliteration service failed: {0}")]
    ServiceFailed(String),
}

/// A synchronous, pure transliteration service.
pub trait Transliterator: Send + Sync + Debug {
    /// Converts `text` from romanized Pali into `scheme`.
    fn transliterate(&self, text: &str, scheme: Scheme) -> Result<String, TransliterationError>;

    /// Returns a human-readable name for this service (for logging).
    fn name(&self) -> &'static str;
}

/// A transliterator that supports only the storage script and returns the
/// input unchanged. The default when no external service is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransliterator;

impl Transliterator for NoopTransliterator {
    fn transliterate(&self, text: &str, scheme: Scheme) -> Result<String, TransliterationError> {
        match scheme {
            Scheme::Roman => Ok(text.to_string()),
            other => Err(TransliterationError::UnsupportedScheme(other.as_str())),
        }
    }

    fn name(&self) -> &'static str {
        "NoopTransliterator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_passes_roman_through() {
        let service = NoopTransliterator;
        assert_eq!(
            service.transliterate("dhamma", Scheme::Roman).unwrap(),
            "dhamma"
        );
    }

    #[test]
    fn noop_rejects_other_schemes() {
        let service = NoopTransliterator;
        assert!(service.transliterate("dhamma", Scheme::Devanagari).is_err());
    }
}
