use std::error;
use std::fmt;
use std::io;
use std::num;

use crate::CodePair;

#[derive(Debug)]
pub enum DxfError {
    IoError(io::Error),
    ParseFloatError(num::ParseFloatError, usize),
    ParseIntError(num::ParseIntError, usize),
    ParseError(usize),
    UnexpectedCode(i32, usize),
    UnexpectedCodePair(CodePair, String),
    UnexpectedEndOfInput,
    WrongValueType(usize),
    UnsupportedVersion(String),
    MissingRequiredField {
        record_kind: String,
        field: String,
    },
    InvalidFieldValue {
        record_kind: String,
        field: String,
        reason: String,
    },
    UnknownField {
        record_kind: String,
        field: String,
    },
    StillLinkedChainNode,
    MismatchedChainKind {
        expected: String,
        actual: String,
    },
    InvalidSchema(String),
    RegistryFrozen(String),
}

impl DxfError {
    /// Only stream faults are unrecoverable; everything else is handled by attaching a
    /// diagnostic to the in-flight decode and continuing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DxfError::IoError(_))
    }
}

impl From<io::Error> for DxfError {
    fn from(ioe: io::Error) -> DxfError {
        DxfError::IoError(ioe)
    }
}

impl fmt::Display for DxfError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DxfError::IoError(ref e) => write!(formatter, "{}", e),
            DxfError::ParseFloatError(ref e, o) => write!(formatter, "{} at line/offset {}", e, o),
            DxfError::ParseIntError(ref e, o) => write!(formatter, "{} at line/offset {}", e, o),
            DxfError::ParseError(o) => write!(
                formatter,
                "there was a general parsing error at line/offset {}",
                o
            ),
            DxfError::UnexpectedCode(c, o) => write!(
                formatter,
                "an unexpected code '{}' was encountered at line/offset {}",
                c, o
            ),
            DxfError::UnexpectedCodePair(ref cp, ref s) => write!(
                formatter,
                "the code pair '{:?}' was not expected at this time: {} at line/offset {}",
                cp, s, cp.offset
            ),
            DxfError::UnexpectedEndOfInput => write!(
                formatter,
                "the input unexpectedly ended before the record was completely loaded"
            ),
            DxfError::WrongValueType(o) => write!(
                formatter,
                "the CodePairValue does not contain the requested type at line/offset {}",
                o
            ),
            DxfError::UnsupportedVersion(ref v) => {
                write!(formatter, "the version '{}' is not supported", v)
            }
            DxfError::MissingRequiredField {
                ref record_kind,
                ref field,
            } => write!(
                formatter,
                "the required field '{}' of record kind '{}' has no value",
                field, record_kind
            ),
            DxfError::InvalidFieldValue {
                ref record_kind,
                ref field,
                ref reason,
            } => write!(
                formatter,
                "the field '{}' of record kind '{}' has an invalid value: {}",
                field, record_kind, reason
            ),
            DxfError::UnknownField {
                ref record_kind,
                ref field,
            } => write!(
                formatter,
                "the record kind '{}' has no field named '{}'",
                record_kind, field
            ),
            DxfError::StillLinkedChainNode => write!(
                formatter,
                "the chain node still has a successor and must be detached before release"
            ),
            DxfError::MismatchedChainKind {
                ref expected,
                ref actual,
            } => write!(
                formatter,
                "the chain holds '{}' records and cannot accept a '{}'",
                expected, actual
            ),
            DxfError::InvalidSchema(ref s) => write!(formatter, "the schema is invalid: {}", s),
            DxfError::RegistryFrozen(ref kind) => write!(
                formatter,
                "the schema registry is frozen; '{}' cannot be registered",
                kind
            ),
        }
    }
}

impl error::Error for DxfError {
    fn cause(&self) -> Option<&dyn error::Error> {
        match *self {
            DxfError::IoError(ref e) => Some(e),
            DxfError::ParseFloatError(ref e, _) => Some(e),
            DxfError::ParseIntError(ref e, _) => Some(e),
            _ => None,
        }
    }
}
