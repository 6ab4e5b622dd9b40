// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serializers
//!
//! Wire encodings of [`Message`]s, all driven by the struct descriptors:
//!
//! - [`BinarySerializer`]: tagged fields, zigzag varints, big-endian doubles,
//!   or the Thrift binary protocol with [`Encoding::Fixed`]
//! - [`JsonSerializer`]: id-keyed, name-keyed or pretty JSON
//!
//! Serializers are stateless apart from their options and the shared
//! [`TypeRegistry`], so one instance can serve any number of threads.
//!
//! # Example
//!
//! ```rust
//! use providence::descriptor::{Descriptor, FieldDescriptor, RegistryBuilder, StructDef};
//! use providence::message::MessageBuilder;
//! use providence::serializer::{Format, Serializer, SerializerProvider};
//!
//! let mut types = RegistryBuilder::new();
//! types
//!     .struct_type(
//!         StructDef::new("shop", "Item")
//!             .field(FieldDescriptor::new(1, "name", Descriptor::STRING))
//!             .field(FieldDescriptor::new(2, "count", Descriptor::I32)),
//!     )
//!     .unwrap();
//! let registry = types.build().unwrap();
//! let item = registry.find_struct("shop.Item").unwrap();
//!
//! let mut builder = MessageBuilder::new(item);
//! builder.set(1, "lamp").unwrap().set(2, 3).unwrap();
//! let msg = builder.build().unwrap();
//!
//! let provider = SerializerProvider::new(&registry);
//! let json = provider.for_format(Format::Json).unwrap();
//! assert_eq!(json.to_vec(&msg).unwrap(), br#"{"1":"lamp","2":3}"#);
//! assert_eq!(json.from_slice(br#"{"name":"lamp","count":3}"#, item).unwrap(), msg);
//! ```

pub mod binary;
pub mod json;
pub mod stream;
pub mod varint;

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SerializerConfig;
use crate::descriptor::{StructDescriptor, TypeRef, TypeRegistry};
use crate::error::{CodecError, PathSegment, Result};
use crate::message::{EnumValue, Message, Value};

pub use binary::{BinarySerializer, Encoding, WireType};
pub use json::{JsonFormat, JsonSerializer};
pub use stream::{MessageReader, MessageWriter};

// ============================================================================
// Serializer trait
// ============================================================================

/// Converts messages to and from one wire encoding.
pub trait Serializer: Send + Sync {
    /// Write `message`, returning the number of bytes written.
    fn serialize(&self, output: &mut dyn Write, message: &Message) -> Result<usize>;

    /// Read one message of type `descriptor`.
    fn deserialize(
        &self,
        input: &mut dyn Read,
        descriptor: &Arc<StructDescriptor>,
    ) -> Result<Message>;

    fn mime_type(&self) -> &'static str;

    /// True for non-textual encodings.
    fn binary_protocol(&self) -> bool;

    fn to_vec(&self, message: &Message) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.serialize(&mut out, message)?;
        Ok(out)
    }

    fn from_slice(&self, mut bytes: &[u8], descriptor: &Arc<StructDescriptor>) -> Result<Message> {
        self.deserialize(&mut bytes, descriptor)
    }
}

// ============================================================================
// Formats
// ============================================================================

/// Built-in encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    #[default]
    Binary,
    /// Field ids as keys, enums as numbers.
    Json,
    /// Field names as keys, enums as names.
    NamedJson,
    /// Named JSON spread over indented lines.
    PrettyJson,
    /// Thrift binary protocol.
    ThriftBinary,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Self::Binary,
        Self::Json,
        Self::NamedJson,
        Self::PrettyJson,
        Self::ThriftBinary,
    ];

    /// Mime types accepted in place of the canonical ones.
    const ALIASES: [(&'static str, Format); 1] = [("application/x-thrift", Self::ThriftBinary)];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Json => "json",
            Self::NamedJson => "named-json",
            Self::PrettyJson => "pretty-json",
            Self::ThriftBinary => "thrift-binary",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Binary => BinarySerializer::MIME_TYPE,
            Self::Json => JsonSerializer::MIME_TYPE,
            Self::NamedJson => JsonSerializer::JSON_MIME_TYPE,
            Self::PrettyJson => JsonSerializer::PRETTY_MIME_TYPE,
            Self::ThriftBinary => BinarySerializer::THRIFT_MIME_TYPE,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Match a mime type, ignoring parameters such as `; charset=utf-8`.
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let bare = normalize_mime(mime_type);
        Self::ALL
            .into_iter()
            .find(|f| f.mime_type() == bare)
            .or_else(|| {
                Self::ALIASES
                    .into_iter()
                    .find_map(|(alias, f)| (alias == bare).then_some(f))
            })
    }

    /// Create a serializer for this format.
    pub fn serializer(
        self,
        registry: &Arc<TypeRegistry>,
        config: &SerializerConfig,
    ) -> Arc<dyn Serializer> {
        match self {
            Self::Binary => {
                Arc::new(BinarySerializer::new(registry).with_strict(config.strict))
            }
            Self::Json => Arc::new(JsonSerializer::new(registry).with_strict(config.strict)),
            Self::NamedJson => {
                Arc::new(JsonSerializer::named(registry).with_strict(config.strict))
            }
            Self::PrettyJson => Arc::new(
                JsonSerializer::pretty(registry)
                    .with_strict(config.strict)
                    .with_format(config.json.clone()),
            ),
            Self::ThriftBinary => {
                Arc::new(BinarySerializer::thrift(registry).with_strict(config.strict))
            }
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

// ============================================================================
// Provider
// ============================================================================

/// Serializers keyed by mime type.
pub struct SerializerProvider {
    serializers: HashMap<String, Arc<dyn Serializer>>,
    default_mime: String,
}

impl SerializerProvider {
    /// All built-in formats, lenient, binary as default.
    pub fn new(registry: &Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, &SerializerConfig::default())
    }

    /// All built-in formats with the config's strictness and JSON layout;
    /// the config's format becomes the default.
    pub fn with_config(registry: &Arc<TypeRegistry>, config: &SerializerConfig) -> Self {
        let mut provider = Self {
            serializers: HashMap::new(),
            default_mime: config.format.mime_type().to_string(),
        };
        for format in Format::ALL {
            provider.register(format.serializer(registry, config));
        }
        provider
    }

    /// Register (or replace) the serializer for its mime type.
    pub fn register(&mut self, serializer: Arc<dyn Serializer>) {
        log::debug!("[provider] registered {}", serializer.mime_type());
        self.serializers
            .insert(serializer.mime_type().to_string(), serializer);
    }

    /// Look up by mime type; aliases of built-in formats resolve to the
    /// format's canonical mime type.
    pub fn get(&self, mime_type: &str) -> Option<&Arc<dyn Serializer>> {
        let bare = normalize_mime(mime_type);
        self.serializers.get(&bare).or_else(|| {
            Format::from_mime_type(&bare).and_then(|f| self.serializers.get(f.mime_type()))
        })
    }

    pub fn for_format(&self, format: Format) -> Option<&Arc<dyn Serializer>> {
        self.get(format.mime_type())
    }

    pub fn default_serializer(&self) -> Option<&Arc<dyn Serializer>> {
        self.serializers.get(&self.default_mime)
    }

    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.serializers.keys().map(String::as_str)
    }
}

// ============================================================================
// Shared codec helpers
// ============================================================================

/// Write adapter counting bytes passed through.
pub(crate) struct CountingWriter<'a> {
    inner: &'a mut dyn Write,
    count: usize,
}

impl<'a> CountingWriter<'a> {
    pub(crate) fn new(inner: &'a mut dyn Write) -> Self {
        Self { inner, count: 0 }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }
}

impl Write for CountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// How an enum value was spelled on the wire.
pub(crate) enum EnumKey<'a> {
    Value(i32),
    Name(&'a str),
}

/// Resolve an enum value; unknown values fail in strict mode and are
/// dropped (`Ok(None)`) otherwise.
pub(crate) fn resolve_enum(
    registry: &TypeRegistry,
    r: &TypeRef,
    key: EnumKey<'_>,
    strict: bool,
) -> Result<Option<Value>> {
    let descriptor = registry
        .enum_descriptor(r)
        .ok_or_else(|| CodecError::UnknownType(r.to_string()))?;
    let (found, spelled) = match key {
        EnumKey::Value(v) => (EnumValue::from_value(descriptor, v), v.to_string()),
        EnumKey::Name(name) => (EnumValue::from_name(descriptor, name), name.to_string()),
    };
    match found {
        Some(value) => Ok(Some(Value::Enum(value))),
        None if strict => Err(CodecError::UnknownEnumValue {
            enum_name: r.to_string(),
            value: spelled,
        }),
        None => {
            log::warn!("dropping unknown {} value {}", r, spelled);
            Ok(None)
        }
    }
}

pub(crate) fn resolve_struct<'a>(
    registry: &'a TypeRegistry,
    r: &TypeRef,
) -> Result<&'a Arc<StructDescriptor>> {
    registry
        .struct_descriptor(r)
        .ok_or_else(|| CodecError::UnknownType(r.to_string()))
}

/// Deepest nesting of messages and containers the decoders accept.
pub const MAX_DEPTH: usize = 64;

/// Enter one nesting level below `depth`.
pub(crate) fn descend(depth: usize) -> Result<usize> {
    if depth >= MAX_DEPTH {
        return Err(CodecError::NestingTooDeep { max: MAX_DEPTH });
    }
    Ok(depth + 1)
}

/// Path segment naming a map entry by its key.
pub(crate) fn key_segment(key: &Value) -> PathSegment<'static> {
    match key {
        Value::String(s) => PathSegment::Key(s.clone()),
        other => PathSegment::Key(other.to_string()),
    }
}
