// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct, union and exception descriptors.

use std::collections::HashMap;
use std::fmt;

use crate::descriptor::{Descriptor, FieldDescriptor, TypeRef};

/// Kind of message a struct descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageVariant {
    #[default]
    Struct,
    /// Exactly one field set per instance.
    Union,
    Exception,
}

impl fmt::Display for MessageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Exception => "exception",
        })
    }
}

/// Struct declaration, handed to [`RegistryBuilder::struct_type`](super::RegistryBuilder::struct_type).
#[derive(Debug, Clone)]
pub struct StructDef {
    pub(crate) package: String,
    pub(crate) name: String,
    pub(crate) variant: MessageVariant,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) compactible: bool,
}

impl StructDef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            variant: MessageVariant::Struct,
            fields: Vec::new(),
            compactible: false,
        }
    }

    pub fn union(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(package, name).variant(MessageVariant::Union)
    }

    pub fn exception(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(package, name).variant(MessageVariant::Exception)
    }

    pub fn variant(mut self, variant: MessageVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Append a field; declaration order is preserved.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Allow positional (compact) JSON encoding of instances.
    pub fn compactible(mut self) -> Self {
        self.compactible = true;
        self
    }

    pub(crate) fn qualified_name(&self) -> String {
        qualify(&self.package, &self.name)
    }
}

pub(crate) fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

/// Ordered field list plus the flags computed at definition time.
#[derive(Debug)]
pub struct StructDescriptor {
    type_ref: TypeRef,
    package: String,
    name: String,
    variant: MessageVariant,
    fields: Vec<FieldDescriptor>,
    by_key: HashMap<u16, usize>,
    by_name: HashMap<String, usize>,
    simple: bool,
    compactible: bool,
}

impl StructDescriptor {
    pub(crate) fn new(type_ref: TypeRef, def: StructDef) -> Self {
        let by_key = def
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.key(), i))
            .collect();
        let by_name = def
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().to_string(), i))
            .collect();
        let simple = def
            .fields
            .iter()
            .all(|f| !f.descriptor().is_container() && !matches!(f.descriptor(), Descriptor::Message(_)));
        Self {
            type_ref,
            package: def.package,
            name: def.name,
            variant: def.variant,
            fields: def.fields,
            by_key,
            by_name,
            simple,
            compactible: def.compactible,
        }
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        self.type_ref.qualified_name()
    }

    pub fn variant(&self) -> MessageVariant {
        self.variant
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, key: u16) -> Option<&FieldDescriptor> {
        self.by_key.get(&key).map(|&i| &self.fields[i])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// True iff no field is a container or a message.
    pub fn is_simple(&self) -> bool {
        self.simple
    }

    /// Schema-declared eligibility for positional JSON encoding.
    pub fn is_compactible(&self) -> bool {
        self.compactible
    }
}

impl PartialEq for StructDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_ref == other.type_ref
    }
}

impl Eq for StructDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(def: StructDef) -> StructDescriptor {
        let name = def.qualified_name();
        StructDescriptor::new(TypeRef::new(0, &name), def)
    }

    #[test]
    fn test_lookup_and_order() {
        let desc = describe(
            StructDef::new("test", "Item")
                .field(FieldDescriptor::new(7, "name", Descriptor::STRING))
                .field(FieldDescriptor::new(2, "id", Descriptor::I32)),
        );
        assert_eq!(desc.qualified_name(), "test.Item");
        assert_eq!(desc.field(2).map(|f| f.name()), Some("id"));
        assert_eq!(desc.field_by_name("name").map(|f| f.key()), Some(7));
        assert!(desc.field(1).is_none());
        let keys: Vec<_> = desc.fields().iter().map(|f| f.key()).collect();
        assert_eq!(keys, [7, 2]);
    }

    #[test]
    fn test_is_simple() {
        let simple = describe(
            StructDef::new("test", "Flat")
                .field(FieldDescriptor::new(1, "a", Descriptor::I32))
                .field(FieldDescriptor::new(2, "b", Descriptor::Enum(TypeRef::new(0, "test.E")))),
        );
        assert!(simple.is_simple());

        let nested = describe(
            StructDef::new("test", "Nested")
                .field(FieldDescriptor::new(1, "inner", Descriptor::Message(TypeRef::new(1, "test.Flat")))),
        );
        assert!(!nested.is_simple());

        let list = describe(
            StructDef::new("test", "Listy")
                .field(FieldDescriptor::new(1, "items", Descriptor::list(Descriptor::I32))),
        );
        assert!(!list.is_simple());
    }

    #[test]
    fn test_empty_package_qualifies_bare_name() {
        assert_eq!(qualify("", "Bare"), "Bare");
        assert_eq!(qualify("a.b", "C"), "a.b.C");
    }
}
