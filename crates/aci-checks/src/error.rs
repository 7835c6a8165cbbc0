//! Typed errors for agent output parsing.
//!
//! Parsing fails loudly: a structurally wrong record aborts its section
//! instead of being silently skipped. Check evaluation itself is total and
//! reports problems as severities, never as errors.

use thiserror::Error;

/// Errors raised while turning recorded agent output into typed records.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A header line is not `<<<name>>>` or `<<<name:sep(N)>>>`.
    #[error("malformed section header: {header:?}")]
    Header { header: String },

    /// The separator code in a section header is not a valid character.
    #[error("section {section}: separator code {code} is not a valid character")]
    Separator { section: String, code: u32 },

    /// A record line has the wrong number of fields for its section schema.
    #[error("section {section}: expected {expected} fields, got {got}: {line:?}")]
    FieldCount {
        section: &'static str,
        expected: usize,
        got: usize,
        line: String,
    },

    /// A field value failed to parse as its declared type.
    #[error("section {section}: field {field} has invalid value {value:?}")]
    Field {
        section: &'static str,
        field: &'static str,
        value: String,
    },

    /// A section that must consist of exactly one record had another shape.
    #[error("section {section} must be a single line but is {got} lines")]
    SingleLine { section: &'static str, got: usize },
}

/// Shorthand for results produced by the parsing layer.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
