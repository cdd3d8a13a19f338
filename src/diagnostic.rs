use std::fmt;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Severity {
    /// Informational, e.g. a 999 comment surfaced from the stream.
    Note,
    /// The condition was recovered from; data may have been dropped or applied permissively.
    Warning,
    /// The record is structurally usable but failed validation.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What went wrong, as a machine-matchable category.  The message carries the detail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DiagnosticKind {
    Comment,
    UnknownRecordKind,
    UnknownGroupCode,
    MalformedTag,
    VersionMismatch,
    MissingRequiredField,
    InvalidFieldValue,
    PayloadLengthMismatch,
    UnexpectedEndOfStream,
}

/// A single non-fatal condition encountered while decoding or encoding, ordered by arrival.
/// `offset` is the line number (or byte offset for binary sources) the condition was seen at.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub offset: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        kind: DiagnosticKind,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            severity,
            kind,
            offset,
            message: message.into(),
        }
    }
    pub fn note(kind: DiagnosticKind, offset: usize, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Note, kind, offset, message)
    }
    pub fn warning(kind: DiagnosticKind, offset: usize, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, kind, offset, message)
    }
    pub fn error(kind: DiagnosticKind, offset: usize, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, kind, offset, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at line/offset {}",
            self.severity, self.message, self.offset
        )
    }
}
