// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic messages
//!
//! Type-erased instances of struct descriptors: [`Message`] is immutable,
//! [`MessageBuilder`] is its mutable companion, and [`Value`] holds one
//! field value.
//!
//! # Example
//!
//! ```rust
//! use providence::descriptor::{Descriptor, FieldDescriptor, RegistryBuilder, StructDef};
//! use providence::message::{MessageBuilder, Value};
//!
//! let mut types = RegistryBuilder::new();
//! types
//!     .struct_type(
//!         StructDef::new("shop", "Item")
//!             .field(FieldDescriptor::new(1, "name", Descriptor::STRING).required())
//!             .field(FieldDescriptor::new(2, "price", Descriptor::DOUBLE)),
//!     )
//!     .unwrap();
//! let registry = types.build().unwrap();
//! let item = registry.find_struct("shop.Item").unwrap();
//!
//! let mut builder = MessageBuilder::new(item);
//! builder.set(1, "lamp").unwrap().set(2, 19.5).unwrap();
//! let msg = builder.build().unwrap();
//!
//! assert_eq!(msg.get(2), Some(&Value::Double(19.5)));
//! assert_eq!(msg.mutate().build().unwrap(), msg);
//! ```

mod builder;
pub mod compact;
#[allow(clippy::module_inception)]
mod message;
mod value;

pub use builder::MessageBuilder;
pub use message::Message;
pub use value::{Binary, EnumValue, Value};
