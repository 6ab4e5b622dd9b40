// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors
//!
//! Immutable runtime description of a schema: primitives, containers,
//! enums and struct/union/exception messages.
//!
//! Struct and enum types are referenced through [`TypeRef`] handles that
//! are resolved via the [`TypeRegistry`] owning them, so mutually recursive
//! schemas never have to be constructed as infinite trees.
//!
//! # Example
//!
//! ```rust
//! use providence::descriptor::{Descriptor, FieldDescriptor, RegistryBuilder, StructDef};
//!
//! let mut builder = RegistryBuilder::new();
//! let point = builder
//!     .struct_type(
//!         StructDef::new("geo", "Point")
//!             .field(FieldDescriptor::new(1, "x", Descriptor::DOUBLE).required())
//!             .field(FieldDescriptor::new(2, "y", Descriptor::DOUBLE).required())
//!             .compactible(),
//!     )
//!     .unwrap();
//! let registry = builder.build().unwrap();
//!
//! let desc = registry.struct_descriptor(&point).unwrap();
//! assert_eq!(desc.qualified_name(), "geo.Point");
//! assert!(desc.is_simple());
//! ```

mod enums;
mod field;
mod primitive;
mod registry;
mod structs;

use std::fmt;
use std::sync::Arc;

pub use enums::{EnumDef, EnumDescriptor, EnumEntry};
pub use field::FieldDescriptor;
pub use primitive::{PrimitiveDescriptor, TypeTag};
pub use registry::{Declared, RegistryBuilder, RegistryError, TypeRegistry};
pub use structs::{MessageVariant, StructDef, StructDescriptor};

/// Handle to a struct or enum declared in a [`TypeRegistry`].
///
/// Equality compares both the registry slot and the qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    index: u32,
    name: Arc<str>,
}

impl TypeRef {
    pub(crate) fn new(index: u32, name: &str) -> Self {
        Self {
            index,
            name: Arc::from(name),
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }

    /// Qualified `package.Name` of the referenced type.
    pub fn qualified_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Type of a field, container item or map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    Primitive(PrimitiveDescriptor),
    Enum(TypeRef),
    Message(TypeRef),
    List(Box<Descriptor>),
    Set(Box<Descriptor>),
    Map(Box<Descriptor>, Box<Descriptor>),
}

impl Descriptor {
    pub const VOID: Descriptor = Descriptor::Primitive(PrimitiveDescriptor::Void);
    pub const BOOL: Descriptor = Descriptor::Primitive(PrimitiveDescriptor::Bool);
    pub const BYTE: Descriptor = Descriptor::Primitive(PrimitiveDescriptor::Byte);
    pub const I16: Descriptor = Descriptor::Primitive(PrimitiveDescriptor::I16);
    pub const I32: Descriptor = Descriptor::Primitive(PrimitiveDescriptor::I32);
    pub const I64: Descriptor = Descriptor::Primitive(PrimitiveDescriptor::I64);
    pub const DOUBLE: Descriptor = Descriptor::Primitive(PrimitiveDescriptor::Double);
    pub const STRING: Descriptor = Descriptor::Primitive(PrimitiveDescriptor::String);
    pub const BINARY: Descriptor = Descriptor::Primitive(PrimitiveDescriptor::Binary);

    pub fn list(item: Descriptor) -> Self {
        Self::List(Box::new(item))
    }

    pub fn set(item: Descriptor) -> Self {
        Self::Set(Box::new(item))
    }

    pub fn map(key: Descriptor, item: Descriptor) -> Self {
        Self::Map(Box::new(key), Box::new(item))
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Primitive(p) => p.tag(),
            Self::Enum(_) => TypeTag::Enum,
            Self::Message(_) => TypeTag::Message,
            Self::List(_) => TypeTag::List,
            Self::Set(_) => TypeTag::Set,
            Self::Map(..) => TypeTag::Map,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_) | Self::Map(..))
    }

    /// Item descriptor of a list or set, value descriptor of a map.
    pub fn item(&self) -> Option<&Descriptor> {
        match self {
            Self::List(item) | Self::Set(item) | Self::Map(_, item) => Some(item),
            _ => None,
        }
    }

    /// Implicit default value for the type, if it has one.
    pub fn default_value(&self) -> Option<crate::message::Value> {
        match self {
            Self::Primitive(p) => p.default_value(),
            _ => None,
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Enum(r) | Self::Message(r) => write!(f, "{r}"),
            Self::List(item) => write!(f, "list<{item}>"),
            Self::Set(item) => write!(f, "set<{item}>"),
            Self::Map(key, item) => write!(f, "map<{key},{item}>"),
        }
    }
}
