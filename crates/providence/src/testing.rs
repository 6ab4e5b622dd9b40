// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Random message generation for round-trip testing.
//!
//! Enabled with the `testing` feature.
//!
//! ```rust
//! use providence::descriptor::{Descriptor, FieldDescriptor, RegistryBuilder, StructDef};
//! use providence::serializer::{BinarySerializer, Serializer};
//! use providence::testing::MessageGenerator;
//!
//! let mut types = RegistryBuilder::new();
//! types
//!     .struct_type(StructDef::new("t", "S").field(FieldDescriptor::new(1, "v", Descriptor::I64)))
//!     .unwrap();
//! let registry = types.build().unwrap();
//! let desc = registry.find_struct("t.S").unwrap();
//!
//! let mut generator = MessageGenerator::with_seed(&registry, 7);
//! let binary = BinarySerializer::new(&registry);
//! for _ in 0..10 {
//!     let msg = generator.generate(desc);
//!     assert_eq!(binary.from_slice(&binary.to_vec(&msg).unwrap(), desc).unwrap(), msg);
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::descriptor::{
    Descriptor, FieldDescriptor, MessageVariant, PrimitiveDescriptor, StructDescriptor,
    TypeRegistry,
};
use crate::message::{Binary, EnumValue, Message, Value};

/// Characters strings are drawn from: plain ASCII plus JSON escapes,
/// control characters and multi-byte code points.
const STRING_CHARS: &[char] = &[
    'a', 'b', 'c', 'x', 'y', 'z', 'A', 'Q', '0', '7', ' ', '_', '-', '.', '"', '\\', '/', '\n',
    '\t', '\r', '\u{1}', '\u{7f}', 'é', 'ß', 'Ω', '日', '本', '\u{2028}', '🦀', '🎉',
];

/// Generates random messages conforming to a struct descriptor.
#[derive(Debug)]
pub struct MessageGenerator {
    registry: Arc<TypeRegistry>,
    rng: fastrand::Rng,
    fill_rate: f64,
    max_depth: usize,
    max_items: usize,
}

impl MessageGenerator {
    pub fn new(registry: &Arc<TypeRegistry>) -> Self {
        Self::with_rng(registry, fastrand::Rng::new())
    }

    /// Deterministic generator.
    pub fn with_seed(registry: &Arc<TypeRegistry>, seed: u64) -> Self {
        Self::with_rng(registry, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(registry: &Arc<TypeRegistry>, rng: fastrand::Rng) -> Self {
        Self {
            registry: Arc::clone(registry),
            rng,
            fill_rate: 0.7,
            max_depth: 4,
            max_items: 5,
        }
    }

    /// Probability of setting an optional field (clamped to `0.0..=1.0`).
    pub fn fill_rate(mut self, rate: f64) -> Self {
        self.fill_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Nesting depth after which optional struct fields stay unset and
    /// containers are empty.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_items(mut self, items: usize) -> Self {
        self.max_items = items;
        self
    }

    /// Random message of type `descriptor`.
    ///
    /// Required fields are always set and unions get exactly one field.
    pub fn generate(&mut self, descriptor: &Arc<StructDescriptor>) -> Message {
        self.generate_at(descriptor, 0)
    }

    fn generate_at(&mut self, descriptor: &Arc<StructDescriptor>, depth: usize) -> Message {
        let mut values = BTreeMap::new();

        if descriptor.variant() == MessageVariant::Union {
            let mut candidates: Vec<&FieldDescriptor> = descriptor
                .fields()
                .iter()
                .filter(|f| depth < self.max_depth || !is_nested(f.descriptor()))
                .collect();
            if candidates.is_empty() {
                candidates = descriptor.fields().iter().collect();
            }
            self.rng.shuffle(&mut candidates);
            for field in candidates {
                if let Some(value) = self.value(field.descriptor(), depth) {
                    values.insert(field.key(), value);
                    break;
                }
            }
            return Message::from_parts(Arc::clone(descriptor), values);
        }

        for field in descriptor.fields() {
            let wanted = field.is_required()
                || (self.rng.f64() < self.fill_rate
                    && (depth < self.max_depth || !is_nested(field.descriptor())));
            if !wanted {
                continue;
            }
            if let Some(value) = self.value(field.descriptor(), depth) {
                values.insert(field.key(), value);
            }
        }
        Message::from_parts(Arc::clone(descriptor), values)
    }

    /// `None` only for enums without values.
    fn value(&mut self, descriptor: &Descriptor, depth: usize) -> Option<Value> {
        let value = match descriptor {
            Descriptor::Primitive(p) => self.primitive(*p),
            Descriptor::Enum(r) => {
                let registry = Arc::clone(&self.registry);
                let desc = registry.enum_descriptor(r)?;
                let entries = desc.entries();
                if entries.is_empty() {
                    return None;
                }
                let entry = &entries[self.rng.usize(..entries.len())];
                Value::Enum(EnumValue::from_value(desc, entry.value)?)
            }
            Descriptor::Message(r) => {
                let desc = Arc::clone(self.registry.struct_descriptor(r)?);
                Value::Message(self.generate_at(&desc, depth + 1))
            }
            Descriptor::List(item) => Value::List(self.items(item, depth)),
            Descriptor::Set(item) => Value::set_of(self.items(item, depth)),
            Descriptor::Map(key, item) => {
                let count = self.count(depth);
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    if let (Some(k), Some(v)) =
                        (self.value(key, depth), self.value(item, depth))
                    {
                        entries.push((k, v));
                    }
                }
                Value::map_of(entries)
            }
        };
        Some(value)
    }

    fn items(&mut self, item: &Descriptor, depth: usize) -> Vec<Value> {
        let count = self.count(depth);
        (0..count).filter_map(|_| self.value(item, depth)).collect()
    }

    fn count(&mut self, depth: usize) -> usize {
        if depth >= self.max_depth {
            0
        } else {
            self.rng.usize(..=self.max_items)
        }
    }

    fn primitive(&mut self, p: PrimitiveDescriptor) -> Value {
        match p {
            PrimitiveDescriptor::Void => Value::Void,
            PrimitiveDescriptor::Bool => Value::Bool(self.rng.bool()),
            PrimitiveDescriptor::Byte => Value::Byte(self.rng.i8(..)),
            PrimitiveDescriptor::I16 => Value::I16(self.rng.i16(..)),
            PrimitiveDescriptor::I32 => Value::I32(self.rng.i32(..)),
            PrimitiveDescriptor::I64 => Value::I64(self.rng.i64(..)),
            PrimitiveDescriptor::Double => Value::Double(self.double()),
            PrimitiveDescriptor::String => {
                let len = self.rng.usize(..=self.max_items * 4);
                Value::String(
                    (0..len)
                        .map(|_| STRING_CHARS[self.rng.usize(..STRING_CHARS.len())])
                        .collect(),
                )
            }
            PrimitiveDescriptor::Binary => {
                let len = self.rng.usize(..=self.max_items * 4);
                Value::Binary(Binary::new(
                    (0..len).map(|_| self.rng.u8(..)).collect::<Vec<u8>>(),
                ))
            }
        }
    }

    /// Finite doubles over a wide range of magnitudes.
    fn double(&mut self) -> f64 {
        match self.rng.u8(..4) {
            0 => f64::from(self.rng.i32(-1000..1000)),
            1 => self.rng.f64() - 0.5,
            _ => (self.rng.f64() - 0.5) * 10f64.powi(self.rng.i32(-12..=15)),
        }
    }
}

fn is_nested(descriptor: &Descriptor) -> bool {
    matches!(descriptor, Descriptor::Message(_)) || descriptor.is_container()
}
