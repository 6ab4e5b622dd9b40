// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum descriptors.

use std::collections::HashMap;

use crate::descriptor::TypeRef;

/// One declared `(value, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub value: i32,
    pub name: String,
}

/// Enum declaration, handed to [`RegistryBuilder::enum_type`](super::RegistryBuilder::enum_type).
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub(crate) package: String,
    pub(crate) name: String,
    pub(crate) entries: Vec<EnumEntry>,
}

impl EnumDef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add a value.
    pub fn value(mut self, value: i32, name: impl Into<String>) -> Self {
        self.entries.push(EnumEntry {
            value,
            name: name.into(),
        });
        self
    }
}

/// Ordered `(value, name)` pairs with lookup both ways.
///
/// Values are unique by integer and by name; the registry rejects
/// duplicates before a descriptor is created.
#[derive(Debug)]
pub struct EnumDescriptor {
    type_ref: TypeRef,
    package: String,
    name: String,
    entries: Vec<EnumEntry>,
    by_value: HashMap<i32, usize>,
    by_name: HashMap<String, usize>,
}

impl EnumDescriptor {
    pub(crate) fn new(type_ref: TypeRef, def: EnumDef) -> Self {
        let by_value = def
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.value, i))
            .collect();
        let by_name = def
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Self {
            type_ref,
            package: def.package,
            name: def.name,
            entries: def.entries,
            by_value,
            by_name,
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

    /// Entries in declaration order.
    pub fn entries(&self) -> &[EnumEntry] {
        &self.entries
    }

    pub fn by_value(&self, value: i32) -> Option<&EnumEntry> {
        self.by_value.get(&value).map(|&i| &self.entries[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&EnumEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }
}

impl PartialEq for EnumDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_ref == other.type_ref
    }
}
