// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{FieldDescriptor, MessageVariant, StructDescriptor};
use crate::message::{compact, MessageBuilder, Value};

/// Immutable instance of a struct, union or exception.
///
/// Values are keyed by field key; iteration always follows the declaration
/// order of the descriptor. Create one with a [`MessageBuilder`] and derive
/// modified copies with [`Message::mutate`].
#[derive(Debug, Clone)]
pub struct Message {
    descriptor: Arc<StructDescriptor>,
    values: BTreeMap<u16, Value>,
}

impl Message {
    pub(crate) fn from_parts(descriptor: Arc<StructDescriptor>, values: BTreeMap<u16, Value>) -> Self {
        Self { descriptor, values }
    }

    pub fn descriptor(&self) -> &Arc<StructDescriptor> {
        &self.descriptor
    }

    pub fn has(&self, key: u16) -> bool {
        self.values.contains_key(&key)
    }

    /// 0 if absent, element count for containers, 1 for other present fields.
    pub fn num(&self, key: u16) -> usize {
        self.values.get(&key).map_or(0, Value::len)
    }

    pub fn get(&self, key: u16) -> Option<&Value> {
        self.values.get(&key)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let field = self.descriptor.field_by_name(name)?;
        self.values.get(&field.key())
    }

    /// Present value, else the field's declared or implicit default.
    pub fn get_or_default(&self, key: u16) -> Option<Value> {
        match self.values.get(&key) {
            Some(value) => Some(value.clone()),
            None => self.descriptor.field(key)?.effective_default(),
        }
    }

    /// Set field of a union; `None` for other variants or an empty union.
    pub fn union_field(&self) -> Option<&FieldDescriptor> {
        if self.descriptor.variant() != MessageVariant::Union {
            return None;
        }
        self.present_fields().next().map(|(field, _)| field)
    }

    /// Present fields with their values, in declaration order.
    pub fn present_fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.descriptor
            .fields()
            .iter()
            .filter_map(|field| self.values.get(&field.key()).map(|value| (field, value)))
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the present fields form a declaration-order prefix.
    pub fn is_compact(&self) -> bool {
        compact::is_compact(self)
    }

    /// Builder pre-populated with a copy of every value.
    pub fn mutate(&self) -> MessageBuilder {
        MessageBuilder::from_parts(Arc::clone(&self.descriptor), self.values.clone())
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && self.values == other.values
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.descriptor.qualified_name())?;
        for (i, (field, value)) in self.present_fields().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", field.name(), value)?;
        }
        f.write_str("}")
    }
}
