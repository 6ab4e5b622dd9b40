// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry: the constructed-once owner of all declared types.
//!
//! A [`RegistryBuilder`] collects enum and struct declarations (structs may
//! be forward-declared to build recursive schemas), validates them and
//! freezes them into an immutable [`TypeRegistry`] shared through `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::descriptor::enums::{EnumDef, EnumDescriptor};
use crate::descriptor::structs::{qualify, MessageVariant, StructDef, StructDescriptor};
use crate::descriptor::{Descriptor, TypeRef};

// ============================================================================
// Errors
// ============================================================================

/// Schema rejected while building a registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("type {0} declared twice")]
    DuplicateType(String),

    #[error("{type_name}.{field}: field key 0 is reserved")]
    ReservedFieldKey { type_name: String, field: String },

    #[error("{type_name}: duplicate field key {key}")]
    DuplicateFieldKey { type_name: String, key: u16 },

    #[error("{type_name}: duplicate field name {name}")]
    DuplicateFieldName { type_name: String, name: String },

    #[error("{type_name}: duplicate enum value {value}")]
    DuplicateEnumValue { type_name: String, value: i32 },

    #[error("{type_name}: duplicate enum name {name}")]
    DuplicateEnumName { type_name: String, name: String },

    #[error("{0} is declared but never defined")]
    Undefined(String),

    #[error("{0}: only structs can be compactible")]
    NotCompactible(String),

    #[error("{type_name}.{field}: default value does not match the field type")]
    InvalidDefault { type_name: String, field: String },

    #[error("{type_name}: references unknown type {referenced}")]
    UnknownReference {
        type_name: String,
        referenced: String,
    },
}

// ============================================================================
// Registry
// ============================================================================

/// A named struct or enum.
#[derive(Debug, Clone)]
pub enum Declared {
    Struct(Arc<StructDescriptor>),
    Enum(Arc<EnumDescriptor>),
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Struct(usize),
    Enum(usize),
}

/// Read-only table of declared types keyed by qualified name.
#[derive(Debug)]
pub struct TypeRegistry {
    structs: Vec<Arc<StructDescriptor>>,
    enums: Vec<Arc<EnumDescriptor>>,
    by_name: HashMap<String, Slot>,
}

impl TypeRegistry {
    /// Look up a type by its qualified `package.Name`.
    pub fn resolve(&self, qualified_name: &str) -> Option<Declared> {
        match self.by_name.get(qualified_name)? {
            Slot::Struct(i) => Some(Declared::Struct(Arc::clone(&self.structs[*i]))),
            Slot::Enum(i) => Some(Declared::Enum(Arc::clone(&self.enums[*i]))),
        }
    }

    /// Look up a struct, union or exception by qualified name.
    pub fn find_struct(&self, qualified_name: &str) -> Option<&Arc<StructDescriptor>> {
        match self.by_name.get(qualified_name)? {
            Slot::Struct(i) => Some(&self.structs[*i]),
            Slot::Enum(_) => None,
        }
    }

    pub fn find_enum(&self, qualified_name: &str) -> Option<&Arc<EnumDescriptor>> {
        match self.by_name.get(qualified_name)? {
            Slot::Enum(i) => Some(&self.enums[*i]),
            Slot::Struct(_) => None,
        }
    }

    /// Resolve a struct handle. `None` if the handle belongs to another registry.
    pub fn struct_descriptor(&self, r: &TypeRef) -> Option<&Arc<StructDescriptor>> {
        self.structs
            .get(r.index())
            .filter(|d| d.type_ref() == r)
    }

    /// Resolve an enum handle. `None` if the handle belongs to another registry.
    pub fn enum_descriptor(&self, r: &TypeRef) -> Option<&Arc<EnumDescriptor>> {
        self.enums.get(r.index()).filter(|d| d.type_ref() == r)
    }

    pub fn structs(&self) -> impl Iterator<Item = &Arc<StructDescriptor>> {
        self.structs.iter()
    }

    pub fn enums(&self) -> impl Iterator<Item = &Arc<EnumDescriptor>> {
        self.enums.iter()
    }

    /// Number of declared types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.structs.len() + self.enums.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects declarations and produces a validated [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    structs: Vec<(String, Option<Arc<StructDescriptor>>)>,
    enums: Vec<Arc<EnumDescriptor>>,
    by_name: HashMap<String, Slot>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward-declare a struct so other types can reference it before it is
    /// defined. Declaring the same struct twice returns the same handle.
    pub fn declare_struct(
        &mut self,
        package: &str,
        name: &str,
    ) -> Result<TypeRef, RegistryError> {
        let qualified = qualify(package, name);
        match self.by_name.get(&qualified) {
            Some(Slot::Struct(i)) => Ok(TypeRef::new(*i as u32, &qualified)),
            Some(Slot::Enum(_)) => Err(RegistryError::DuplicateType(qualified)),
            None => {
                let index = self.structs.len();
                self.structs.push((qualified.clone(), None));
                self.by_name.insert(qualified.clone(), Slot::Struct(index));
                Ok(TypeRef::new(index as u32, &qualified))
            }
        }
    }

    /// Define a struct, union or exception (filling a forward declaration of
    /// the same name if there is one).
    pub fn struct_type(&mut self, def: StructDef) -> Result<TypeRef, RegistryError> {
        let qualified = def.qualified_name();
        validate_struct(&qualified, &def)?;

        let index = match self.by_name.get(&qualified) {
            Some(Slot::Struct(i)) if self.structs[*i].1.is_none() => *i,
            Some(_) => return Err(RegistryError::DuplicateType(qualified)),
            None => {
                let index = self.structs.len();
                self.structs.push((qualified.clone(), None));
                self.by_name.insert(qualified.clone(), Slot::Struct(index));
                index
            }
        };

        let type_ref = TypeRef::new(index as u32, &qualified);
        log::trace!(
            "[registry] defined {} {} ({} fields)",
            def.variant,
            qualified,
            def.fields.len()
        );
        self.structs[index].1 = Some(Arc::new(StructDescriptor::new(type_ref.clone(), def)));
        Ok(type_ref)
    }

    /// Define an enum.
    pub fn enum_type(&mut self, def: EnumDef) -> Result<TypeRef, RegistryError> {
        let qualified = qualify(&def.package, &def.name);
        if self.by_name.contains_key(&qualified) {
            return Err(RegistryError::DuplicateType(qualified));
        }
        let mut values = HashMap::new();
        let mut names = HashMap::new();
        for entry in &def.entries {
            if values.insert(entry.value, ()).is_some() {
                return Err(RegistryError::DuplicateEnumValue {
                    type_name: qualified,
                    value: entry.value,
                });
            }
            if names.insert(entry.name.as_str(), ()).is_some() {
                return Err(RegistryError::DuplicateEnumName {
                    type_name: qualified,
                    name: entry.name.clone(),
                });
            }
        }

        let index = self.enums.len();
        let type_ref = TypeRef::new(index as u32, &qualified);
        self.enums
            .push(Arc::new(EnumDescriptor::new(type_ref.clone(), def)));
        self.by_name.insert(qualified, Slot::Enum(index));
        Ok(type_ref)
    }

    /// Validate cross references and freeze the registry.
    pub fn build(self) -> Result<Arc<TypeRegistry>, RegistryError> {
        let mut structs = Vec::with_capacity(self.structs.len());
        for (name, slot) in self.structs {
            structs.push(slot.ok_or(RegistryError::Undefined(name))?);
        }
        let registry = TypeRegistry {
            structs,
            enums: self.enums,
            by_name: self.by_name,
        };

        for desc in &registry.structs {
            for field in desc.fields() {
                check_references(&registry, desc.qualified_name(), field.descriptor())?;
            }
        }

        log::debug!(
            "[registry] built with {} structs, {} enums",
            registry.structs.len(),
            registry.enums.len()
        );
        Ok(Arc::new(registry))
    }
}

fn validate_struct(qualified: &str, def: &StructDef) -> Result<(), RegistryError> {
    if def.compactible && def.variant != MessageVariant::Struct {
        return Err(RegistryError::NotCompactible(qualified.to_string()));
    }
    let mut keys = HashMap::new();
    let mut names = HashMap::new();
    for field in &def.fields {
        if field.key() == 0 {
            return Err(RegistryError::ReservedFieldKey {
                type_name: qualified.to_string(),
                field: field.name().to_string(),
            });
        }
        if keys.insert(field.key(), ()).is_some() {
            return Err(RegistryError::DuplicateFieldKey {
                type_name: qualified.to_string(),
                key: field.key(),
            });
        }
        if names.insert(field.name(), ()).is_some() {
            return Err(RegistryError::DuplicateFieldName {
                type_name: qualified.to_string(),
                name: field.name().to_string(),
            });
        }
        if let Some(default) = field.default_value() {
            if !default.conforms_to(field.descriptor()) {
                return Err(RegistryError::InvalidDefault {
                    type_name: qualified.to_string(),
                    field: field.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_references(
    registry: &TypeRegistry,
    owner: &str,
    descriptor: &Descriptor,
) -> Result<(), RegistryError> {
    let unknown = |r: &TypeRef| RegistryError::UnknownReference {
        type_name: owner.to_string(),
        referenced: r.qualified_name().to_string(),
    };
    match descriptor {
        Descriptor::Primitive(_) => Ok(()),
        Descriptor::Enum(r) => registry.enum_descriptor(r).map(|_| ()).ok_or_else(|| unknown(r)),
        Descriptor::Message(r) => registry
            .struct_descriptor(r)
            .map(|_| ())
            .ok_or_else(|| unknown(r)),
        Descriptor::List(item) | Descriptor::Set(item) => {
            check_references(registry, owner, item)
        }
        Descriptor::Map(key, item) => {
            check_references(registry, owner, key)?;
            check_references(registry, owner, item)
        }
    }
}
