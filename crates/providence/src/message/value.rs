// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message field values.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::descriptor::{Descriptor, EnumDescriptor, TypeTag};
use crate::message::Message;
use crate::serializer::json::number::format_double;

/// Accepts base64 with or without trailing padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ============================================================================
// Binary
// ============================================================================

/// Owned byte string (`binary` fields).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Binary(Vec<u8>);

impl Binary {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode standard-alphabet base64, padding optional.
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        LENIENT_BASE64.decode(encoded.trim()).map(Self)
    }

    /// Standard-alphabet base64 with padding.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Binary {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// EnumValue
// ============================================================================

/// A declared value of an enum.
#[derive(Debug, Clone)]
pub struct EnumValue {
    descriptor: Arc<EnumDescriptor>,
    index: usize,
}

impl EnumValue {
    /// Value with integer `value`, if declared.
    pub fn from_value(descriptor: &Arc<EnumDescriptor>, value: i32) -> Option<Self> {
        let index = descriptor.entries().iter().position(|e| e.value == value)?;
        Some(Self {
            descriptor: Arc::clone(descriptor),
            index,
        })
    }

    /// Value named `name`, if declared.
    pub fn from_name(descriptor: &Arc<EnumDescriptor>, name: &str) -> Option<Self> {
        let index = descriptor.entries().iter().position(|e| e.name == name)?;
        Some(Self {
            descriptor: Arc::clone(descriptor),
            index,
        })
    }

    pub fn value(&self) -> i32 {
        self.descriptor.entries()[self.index].value
    }

    pub fn name(&self) -> &str {
        &self.descriptor.entries()[self.index].name
    }

    pub fn descriptor(&self) -> &Arc<EnumDescriptor> {
        &self.descriptor
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.type_ref() == other.descriptor.type_ref() && self.index == other.index
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Value
// ============================================================================

/// Field value, one variant per [`TypeTag`].
///
/// `Set` elements are unique and `Map` keys are unique; build them with
/// [`Value::set_of`] and [`Value::map_of`]. Set and map equality ignores
/// order, list equality does not.
#[derive(Debug, Clone)]
pub enum Value {
    Void,
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(String),
    Binary(Binary),
    Enum(EnumValue),
    Message(Message),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Set value with duplicates removed (first occurrence kept).
    pub fn set_of(items: impl IntoIterator<Item = Value>) -> Self {
        let mut index = EqualityIndex::default();
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            if index.position(&item, &unique, |v| v).is_none() {
                index.insert(&item, unique.len());
                unique.push(item);
            }
        }
        Self::Set(unique)
    }

    /// Map value; a repeated key replaces the earlier entry's value.
    pub fn map_of(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut index = EqualityIndex::default();
        let mut unique: Vec<(Value, Value)> = Vec::new();
        for (key, item) in entries {
            match index.position(&key, &unique, |(k, _)| k) {
                Some(i) => unique[i].1 = item,
                None => {
                    index.insert(&key, unique.len());
                    unique.push((key, item));
                }
            }
        }
        Self::Map(unique)
    }

    /// Restore the set and map invariants at every level of a value built
    /// by hand (`Value::Set(vec![..])`).
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::List(items) => Self::List(items.into_iter().map(Self::normalized).collect()),
            Self::Set(items) => Self::set_of(items.into_iter().map(Self::normalized)),
            Self::Map(entries) => Self::map_of(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.normalized(), v.normalized())),
            ),
            other => other,
        }
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Void => TypeTag::Void,
            Self::Bool(_) => TypeTag::Bool,
            Self::Byte(_) => TypeTag::Byte,
            Self::I16(_) => TypeTag::I16,
            Self::I32(_) => TypeTag::I32,
            Self::I64(_) => TypeTag::I64,
            Self::Double(_) => TypeTag::Double,
            Self::String(_) => TypeTag::String,
            Self::Binary(_) => TypeTag::Binary,
            Self::Enum(_) => TypeTag::Enum,
            Self::Message(_) => TypeTag::Message,
            Self::List(_) => TypeTag::List,
            Self::Set(_) => TypeTag::Set,
            Self::Map(_) => TypeTag::Map,
        }
    }

    /// Whether this value can be stored in a field of type `descriptor`.
    ///
    /// Enum and message values are matched by their type handle; container
    /// values are checked element by element.
    pub fn conforms_to(&self, descriptor: &Descriptor) -> bool {
        match (self, descriptor) {
            (Self::Enum(e), Descriptor::Enum(r)) => e.descriptor().type_ref() == r,
            (Self::Message(m), Descriptor::Message(r)) => m.descriptor().type_ref() == r,
            (Self::List(items), Descriptor::List(item))
            | (Self::Set(items), Descriptor::Set(item)) => {
                items.iter().all(|v| v.conforms_to(item))
            }
            (Self::Map(entries), Descriptor::Map(key, item)) => entries
                .iter()
                .all(|(k, v)| k.conforms_to(key) && v.conforms_to(item)),
            (value, Descriptor::Primitive(p)) => value.tag() == p.tag(),
            _ => false,
        }
    }

    /// Element count for containers, 1 for scalars.
    pub fn len(&self) -> usize {
        match self {
            Self::List(items) | Self::Set(items) => items.len(),
            Self::Map(entries) => entries.len(),
            _ => 1,
        }
    }

    /// True for empty containers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            Self::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Self::I16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer variant widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Elements of a list or a set.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Void, Self::Void) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Message(a), Self::Message(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            _ => false,
        }
    }
}

/// Positions of values in a `Vec`, bucketed by [`equality_hash`].
#[derive(Default)]
struct EqualityIndex {
    buckets: HashMap<u64, Vec<usize>>,
}

impl EqualityIndex {
    fn position<T>(&self, value: &Value, slots: &[T], key: impl Fn(&T) -> &Value) -> Option<usize> {
        self.buckets
            .get(&equality_hash(value))?
            .iter()
            .copied()
            .find(|&i| key(&slots[i]) == value)
    }

    fn insert(&mut self, value: &Value, position: usize) {
        self.buckets
            .entry(equality_hash(value))
            .or_default()
            .push(position);
    }
}

/// Hash consistent with `PartialEq for Value`: equal values hash alike.
///
/// Doubles hash `-0.0` as `0.0` and every NaN alike. Messages and
/// containers hash by kind only, since their equality ignores order.
fn equality_hash(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.tag().hash(&mut hasher);
    match value {
        Value::Void | Value::Message(_) | Value::List(_) | Value::Set(_) | Value::Map(_) => {}
        Value::Bool(v) => v.hash(&mut hasher),
        Value::Byte(v) => v.hash(&mut hasher),
        Value::I16(v) => v.hash(&mut hasher),
        Value::I32(v) => v.hash(&mut hasher),
        Value::I64(v) => v.hash(&mut hasher),
        Value::Double(v) => {
            let bits = if v.is_nan() {
                f64::NAN.to_bits()
            } else if *v == 0.0 {
                0
            } else {
                v.to_bits()
            };
            bits.hash(&mut hasher);
        }
        Value::String(s) => s.hash(&mut hasher),
        Value::Binary(b) => b.hash(&mut hasher),
        Value::Enum(e) => {
            e.descriptor.type_ref().hash(&mut hasher);
            e.index.hash(&mut hasher);
        }
    }
    hasher.finish()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::Double(v) => f.write_str(&format_double(*v)),
            Self::String(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            Self::Binary(b) => write!(f, "b64({})", b.to_base64()),
            Self::Enum(e) => write!(f, "{e}"),
            Self::Message(m) => write!(f, "{m}"),
            Self::List(items) | Self::Set(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i8 => Byte,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f64 => Double,
    String => String,
    Binary => Binary,
    EnumValue => Enum,
    Message => Message,
    Vec<Value> => List,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Binary(Binary(v))
    }
}
