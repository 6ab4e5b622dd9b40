// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Providence
//!
//! Descriptor-driven message serialization, wire compatible with Thrift
//! style schemas:
//! - [`descriptor`]: runtime schema (primitives, containers, enums, structs,
//!   unions, exceptions) held in a [`TypeRegistry`]
//! - [`message`]: generic immutable messages and their builders
//! - [`serializer`]: binary and JSON codecs, message streams
//!
//! # Quick Start
//!
//! ```rust
//! use providence::{
//!     Descriptor, FieldDescriptor, Format, MessageBuilder, RegistryBuilder, Serializer,
//!     SerializerProvider, StructDef,
//! };
//!
//! let mut types = RegistryBuilder::new();
//! types
//!     .struct_type(
//!         StructDef::new("shop", "Category")
//!             .field(FieldDescriptor::new(1, "name", Descriptor::STRING))
//!             .field(FieldDescriptor::new(2, "id", Descriptor::I32))
//!             .compactible(),
//!     )
//!     .unwrap();
//! let registry = types.build().unwrap();
//! let category = registry.find_struct("shop.Category").unwrap();
//!
//! let mut builder = MessageBuilder::new(category);
//! builder.set(1, "my_category").unwrap().set(2, 44).unwrap();
//! let msg = builder.build().unwrap();
//!
//! let provider = SerializerProvider::new(&registry);
//! let json = provider.for_format(Format::Json).unwrap();
//! assert_eq!(json.to_vec(&msg).unwrap(), br#"["my_category",44]"#);
//!
//! let binary = provider.for_format(Format::Binary).unwrap();
//! let bytes = binary.to_vec(&msg).unwrap();
//! assert_eq!(binary.from_slice(&bytes, category).unwrap(), msg);
//! ```
//!
//! # Format Comparison
//!
//! | Format | Mime type | Keys | Readable |
//! |--------|-----------|------|----------|
//! | binary | `application/vnd.morimekta.providence.binary` | ids | [X] |
//! | json | `application/vnd.morimekta.providence.json` | ids | [OK] |
//! | named-json | `application/json` | names | [OK] |
//! | pretty-json | `text/plain` | names | [OK] |
//! | thrift-binary | `application/vnd.apache.thrift.binary` | ids | [X] |
//!
//! Decoders reject input nested deeper than [`serializer::MAX_DEPTH`]
//! levels with [`CodecError::NestingTooDeep`].
//!
//! # Logging
//!
//! Uses the `log` facade: `warn` when unknown fields or enum values are
//! dropped, `debug` for registry and provider setup, `trace` per message.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod message;
pub mod serializer;

#[cfg(feature = "testing")]
pub mod testing;

pub use config::{ConfigError, SerializerConfig};
pub use descriptor::{
    Descriptor, EnumDef, EnumDescriptor, FieldDescriptor, MessageVariant, PrimitiveDescriptor,
    RegistryBuilder, RegistryError, StructDef, StructDescriptor, TypeRef, TypeRegistry,
};
pub use error::{CodecError, PathSegment, Result};
pub use message::{Binary, EnumValue, Message, MessageBuilder, Value};
pub use serializer::{
    BinarySerializer, Encoding, Format, JsonFormat, JsonSerializer, MessageReader,
    MessageWriter, Serializer, SerializerProvider,
};
