// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic message builder.

use std::collections::{BTreeMap, BTreeSet};
use std::iter;
use std::sync::Arc;

use crate::descriptor::{Descriptor, FieldDescriptor, MessageVariant, StructDescriptor};
use crate::error::{CodecError, PathSegment, Result};
use crate::message::{Message, Value};

/// Mutable scratch state for a [`Message`].
///
/// `set` and `clear` may be called in any order; the variant invariants
/// (required fields present, exactly one field for unions) are only checked
/// by [`MessageBuilder::build`]. Every field touched since the builder was
/// created is reported by [`MessageBuilder::modified_fields`].
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    descriptor: Arc<StructDescriptor>,
    values: BTreeMap<u16, Value>,
    modified: BTreeSet<u16>,
}

impl MessageBuilder {
    /// Empty builder for messages of type `descriptor`.
    pub fn new(descriptor: &Arc<StructDescriptor>) -> Self {
        Self::from_parts(Arc::clone(descriptor), BTreeMap::new())
    }

    pub(crate) fn from_parts(
        descriptor: Arc<StructDescriptor>,
        values: BTreeMap<u16, Value>,
    ) -> Self {
        Self {
            descriptor,
            values,
            modified: BTreeSet::new(),
        }
    }

    pub fn descriptor(&self) -> &Arc<StructDescriptor> {
        &self.descriptor
    }

    /// Set field `key`, replacing any previous value.
    ///
    /// Sets and maps are normalized at every level, so duplicate items and
    /// repeated keys collapse as in [`Value::set_of`] and [`Value::map_of`].
    ///
    /// # Errors
    ///
    /// `UnknownField` if the struct has no such key, `TypeMismatch` if the
    /// value does not conform to the field type.
    pub fn set(&mut self, key: u16, value: impl Into<Value>) -> Result<&mut Self> {
        let value = value.into().normalized();
        let field = field_of(&self.descriptor, key)?;
        if !value.conforms_to(field.descriptor()) {
            return Err(CodecError::mismatch(field.descriptor(), value.tag())
                .in_field(PathSegment::Field(field.name())));
        }
        self.store(key, value);
        Ok(self)
    }

    /// Set a field by name.
    pub fn set_by_name(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let key = self
            .descriptor
            .field_by_name(name)
            .map(|f| f.key())
            .ok_or_else(|| {
                CodecError::UnknownField(format!("'{name}' in {}", self.descriptor.qualified_name()))
            })?;
        self.set(key, value)
    }

    /// Append `item` to a list field, or add it to a set field.
    ///
    /// # Errors
    ///
    /// `UnknownField` for an undeclared key, `TypeMismatch` if the field is
    /// not a list or set or the item does not conform to its item type.
    pub fn add_to(&mut self, key: u16, item: impl Into<Value>) -> Result<&mut Self> {
        let item = item.into().normalized();
        let descriptor = Arc::clone(&self.descriptor);
        let field = field_of(&descriptor, key)?;
        let in_field = |e: CodecError| e.in_field(PathSegment::Field(field.name()));
        let (is_set, item_type) = match field.descriptor() {
            Descriptor::List(item_type) => (false, item_type),
            Descriptor::Set(item_type) => (true, item_type),
            other => return Err(in_field(CodecError::mismatch("list or set field", other))),
        };
        if !item.conforms_to(item_type) {
            return Err(in_field(CodecError::mismatch(item_type, item.tag())));
        }
        let updated = match self.values.remove(&key) {
            Some(Value::Set(items)) if is_set => Value::set_of(items.into_iter().chain(iter::once(item))),
            Some(Value::List(mut items)) if !is_set => {
                items.push(item);
                Value::List(items)
            }
            _ if is_set => Value::Set(vec![item]),
            _ => Value::List(vec![item]),
        };
        self.store(key, updated);
        Ok(self)
    }

    /// Put one entry into a map field, replacing the value of an equal key.
    ///
    /// # Errors
    ///
    /// Same as [`MessageBuilder::add_to`], for map fields.
    pub fn put_in(
        &mut self,
        key: u16,
        map_key: impl Into<Value>,
        item: impl Into<Value>,
    ) -> Result<&mut Self> {
        let (map_key, item) = (map_key.into().normalized(), item.into().normalized());
        let descriptor = Arc::clone(&self.descriptor);
        let field = field_of(&descriptor, key)?;
        let in_field = |e: CodecError| e.in_field(PathSegment::Field(field.name()));
        let Descriptor::Map(key_type, item_type) = field.descriptor() else {
            return Err(in_field(CodecError::mismatch("map field", field.descriptor())));
        };
        if !map_key.conforms_to(key_type) {
            return Err(in_field(CodecError::mismatch(key_type, map_key.tag())));
        }
        if !item.conforms_to(item_type) {
            return Err(in_field(CodecError::mismatch(item_type, item.tag())));
        }
        let entries = match self.values.remove(&key) {
            Some(Value::Map(entries)) => entries,
            _ => Vec::new(),
        };
        self.store(key, Value::map_of(entries.into_iter().chain(iter::once((map_key, item)))));
        Ok(self)
    }

    /// Merge the present fields of `from` into this builder.
    ///
    /// Nested messages are merged recursively, sets take the union and maps
    /// take every entry of `from`. Any other value, lists included, replaces
    /// the current one. Merging a union that has a different field set than
    /// this builder switches the union over to that field.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `from` is of another struct type, or any error from
    /// building a merged nested message.
    pub fn merge(&mut self, from: &Message) -> Result<&mut Self> {
        if from.descriptor().type_ref() != self.descriptor.type_ref() {
            return Err(CodecError::mismatch(
                self.descriptor.qualified_name(),
                from.descriptor().qualified_name(),
            ));
        }
        let union = self.descriptor.variant() == MessageVariant::Union;
        for (field, value) in from.present_fields() {
            let key = field.key();
            if union && !self.values.contains_key(&key) {
                let previous: Vec<u16> = self.values.keys().copied().collect();
                for k in previous {
                    self.clear(k);
                }
            }
            let merged = match (self.values.get(&key), value) {
                (Some(Value::Message(current)), Value::Message(update)) => {
                    let mut nested = current.mutate();
                    nested
                        .merge(update)
                        .map_err(|e| e.in_field(PathSegment::Field(field.name())))?;
                    Value::Message(
                        nested
                            .build()
                            .map_err(|e| e.in_field(PathSegment::Field(field.name())))?,
                    )
                }
                (Some(Value::Set(current)), Value::Set(update)) => {
                    Value::set_of(current.iter().chain(update).cloned())
                }
                (Some(Value::Map(current)), Value::Map(update)) => {
                    Value::map_of(current.iter().chain(update).cloned())
                }
                (_, value) => value.clone(),
            };
            self.store(key, merged);
        }
        Ok(self)
    }

    /// Store an already type-checked value (decoders).
    pub(crate) fn insert(&mut self, key: u16, value: Value) {
        self.store(key, value);
    }

    fn store(&mut self, key: u16, value: Value) {
        self.values.insert(key, value);
        self.modified.insert(key);
    }

    /// Remove field `key`; no-op if absent.
    pub fn clear(&mut self, key: u16) -> &mut Self {
        if self.values.remove(&key).is_some() {
            self.modified.insert(key);
        }
        self
    }

    /// Whether field `key` was set, cleared or merged through this builder.
    pub fn is_modified(&self, key: u16) -> bool {
        self.modified.contains(&key)
    }

    /// Fields touched through this builder, in declaration order.
    pub fn modified_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.descriptor
            .fields()
            .iter()
            .filter(|f| self.modified.contains(&f.key()))
    }

    pub fn has(&self, key: u16) -> bool {
        self.values.contains_key(&key)
    }

    pub fn get(&self, key: u16) -> Option<&Value> {
        self.values.get(&key)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check the variant invariants.
    ///
    /// # Errors
    ///
    /// `InvalidMessage` naming the first missing required field, or the
    /// number of set fields of a union that does not have exactly one.
    pub fn validate(&self) -> Result<()> {
        let desc = &self.descriptor;
        if desc.variant() == MessageVariant::Union {
            if self.values.len() != 1 {
                let set: Vec<&str> = desc
                    .fields()
                    .iter()
                    .filter(|f| self.values.contains_key(&f.key()))
                    .map(|f| f.name())
                    .collect();
                return Err(CodecError::InvalidMessage(format!(
                    "union {} requires exactly one field set, found {} [{}]",
                    desc.qualified_name(),
                    set.len(),
                    set.join(", ")
                )));
            }
            return Ok(());
        }
        match desc
            .fields()
            .iter()
            .find(|f| f.is_required() && !self.values.contains_key(&f.key()))
        {
            Some(missing) => Err(CodecError::InvalidMessage(format!(
                "required field '{}' missing in {}",
                missing.name(),
                desc.qualified_name()
            ))),
            None => Ok(()),
        }
    }

    /// Freeze into a [`Message`].
    pub fn build(self) -> Result<Message> {
        self.validate()?;
        Ok(Message::from_parts(self.descriptor, self.values))
    }
}

fn field_of(descriptor: &StructDescriptor, key: u16) -> Result<&FieldDescriptor> {
    descriptor.field(key).ok_or_else(|| {
        CodecError::UnknownField(format!("{key} in {}", descriptor.qualified_name()))
    })
}
