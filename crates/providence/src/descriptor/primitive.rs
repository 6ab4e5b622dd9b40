// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type tags and primitive descriptors.

use std::fmt;

use crate::message::Value;

/// Closed set of type kinds; every descriptor exposes exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Void,
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    Enum,
    Message,
    List,
    Set,
    Map,
}

impl TypeTag {
    /// IDL spelling of the tag.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Double => "double",
            Self::String => "string",
            Self::Binary => "binary",
            Self::Enum => "enum",
            Self::Message => "message",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in scalar types.
///
/// Two primitive descriptors are equal iff they are the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveDescriptor {
    Void,
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
}

impl PrimitiveDescriptor {
    pub const ALL: [PrimitiveDescriptor; 9] = [
        Self::Void,
        Self::Bool,
        Self::Byte,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::Double,
        Self::String,
        Self::Binary,
    ];

    pub const fn tag(self) -> TypeTag {
        match self {
            Self::Void => TypeTag::Void,
            Self::Bool => TypeTag::Bool,
            Self::Byte => TypeTag::Byte,
            Self::I16 => TypeTag::I16,
            Self::I32 => TypeTag::I32,
            Self::I64 => TypeTag::I64,
            Self::Double => TypeTag::Double,
            Self::String => TypeTag::String,
            Self::Binary => TypeTag::Binary,
        }
    }

    pub const fn name(self) -> &'static str {
        self.tag().name()
    }

    /// Look up a primitive by its IDL name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Implicit default: `false` for bool, zero for numbers, none otherwise.
    pub fn default_value(self) -> Option<Value> {
        match self {
            Self::Bool => Some(Value::Bool(false)),
            Self::Byte => Some(Value::Byte(0)),
            Self::I16 => Some(Value::I16(0)),
            Self::I32 => Some(Value::I32(0)),
            Self::I64 => Some(Value::I64(0)),
            Self::Double => Some(Value::Double(0.0)),
            Self::Void | Self::String | Self::Binary => None,
        }
    }
}

impl fmt::Display for PrimitiveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
