// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec error taxonomy.
//!
//! Every failure raised while encoding or decoding a message is a
//! [`CodecError`]. Errors raised deep inside nested values are wrapped with
//! the path of the enclosing fields as they unwind, so a failure reads like:
//!
//! ```text
//! field 'operands[2].operation.operator': unknown enum value 77 for calculator.Operator
//! ```

use std::fmt;
use std::io;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Serialization / deserialization failure.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input ended before a complete value was read.
    #[error("truncated input")]
    TruncatedInput,

    /// Varint did not terminate within `max` bytes, or overflowed its width.
    #[error("varint too long (more than {max} bytes)")]
    VarintTooLong { max: usize },

    /// Wire type or JSON token incompatible with the declared field type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Field id or name not declared by the struct (strict mode, builder).
    #[error("unknown field {0}")]
    UnknownField(String),

    /// Positional (compact) JSON form carried more elements than fields.
    #[error("unexpected field: {0}")]
    UnexpectedField(String),

    /// Enum value or name not declared by the enum (strict mode).
    #[error("unknown enum value {value} for {enum_name}")]
    UnknownEnumValue { enum_name: String, value: String },

    /// Builder invariant violated (required field missing, union arity).
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Lexical or structural JSON error.
    #[error("malformed json at line {line}, column {column}: {message} (near `{snippet}`)")]
    MalformedJson {
        line: usize,
        column: usize,
        snippet: String,
        message: String,
    },

    /// Messages and containers nested deeper than the decoder accepts.
    #[error("nesting deeper than {max} levels")]
    NestingTooDeep { max: usize },

    /// Container count that the input cannot back with data.
    #[error("container of {count} zero-width items exceeds the limit of {max}")]
    ContainerTooLarge { count: u64, max: u64 },

    /// Descriptor handle not known to the serializer's registry.
    #[error("unknown type {0}")]
    UnknownType(String),

    #[error("i/o error: {0}")]
    Io(#[source] io::Error),

    /// Error raised while handling the value at `path`.
    #[error("field '{path}': {source}")]
    InField {
        path: String,
        #[source]
        source: Box<CodecError>,
    },
}

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// Struct field name.
    Field(&'a str),
    /// List or set element index.
    Index(usize),
    /// Map entry, rendered as its key.
    Key(String),
}

impl fmt::Display for PathSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Key(k) => write!(f, "[{k}]"),
        }
    }
}

impl CodecError {
    pub(crate) fn mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Prefix the error path with `segment` (called while unwinding outward).
    #[must_use]
    pub fn in_field(self, segment: PathSegment<'_>) -> Self {
        match self {
            Self::InField { path, source } => {
                let joined = if path.starts_with('[') {
                    format!("{segment}{path}")
                } else {
                    format!("{segment}.{path}")
                };
                Self::InField {
                    path: joined,
                    source,
                }
            }
            other => Self::InField {
                path: segment.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Field path of the failure, if any was recorded.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::InField { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The underlying error with path context stripped.
    pub fn root(&self) -> &CodecError {
        match self {
            Self::InField { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedInput
        } else {
            Self::Io(e)
        }
    }
}
