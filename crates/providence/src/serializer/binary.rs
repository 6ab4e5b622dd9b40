// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary wire formats.
//!
//! # Format
//!
//! ```text
//! message := { field } STOP
//! field   := wire-type:u8  field-id  value
//! value   := (void)                      nothing
//!          | bool | byte                 1 byte
//!          | i16 | i32 | i64 | enum      integer
//!          | double                      8 bytes big-endian IEEE-754
//!          | string | binary             size, bytes
//!          | message                     nested message (own STOP)
//!          | list | set                  item-type:u8  size  items
//!          | map                         key-type:u8  item-type:u8  size  (key value)*
//! ```
//!
//! Two [`Encoding`]s fill in the integer slots:
//!
//! | Encoding | field-id | integer | size |
//! |----------|----------|---------|------|
//! | [`Encoding::Varint`] | varint | zigzag varint | varint |
//! | [`Encoding::Fixed`] (Thrift binary protocol) | i16 BE | i16/i32/i64 BE | i32 BE |
//!
//! Fields are written in declaration order. Unknown field ids are skipped on
//! read unless the serializer is strict. Nesting is limited to
//! [`MAX_DEPTH`](super::MAX_DEPTH) levels.

use std::io::{self, Read, Write};
use std::sync::Arc;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::descriptor::{Descriptor, PrimitiveDescriptor, StructDescriptor, TypeRegistry};
use crate::error::{CodecError, PathSegment, Result};
use crate::message::{Binary, Message, MessageBuilder, Value};
use crate::serializer::varint::{
    read_varint32, read_varint64, read_zigzag32, read_zigzag64, write_byte, write_varint,
    write_zigzag32, write_zigzag64,
};
use crate::serializer::{
    descend, key_segment, resolve_enum, resolve_struct, CountingWriter, EnumKey, Serializer,
};

/// Cap on up-front allocation for decoded containers.
const PREALLOCATE_LIMIT: usize = 1024;

/// Items a container of `void` elements may declare; they occupy no input.
pub const MAX_ZERO_WIDTH_ITEMS: u32 = 1 << 16;

/// Wire type byte preceding every field and container item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Stop = 0,
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    /// Also used for binary.
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl WireType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Stop,
            1 => Self::Void,
            2 => Self::Bool,
            3 => Self::Byte,
            4 => Self::Double,
            6 => Self::I16,
            8 => Self::I32,
            10 => Self::I64,
            11 => Self::String,
            12 => Self::Struct,
            13 => Self::Map,
            14 => Self::Set,
            15 => Self::List,
            _ => return None,
        })
    }

    /// Wire type used for values of `descriptor`.
    pub fn of(descriptor: &Descriptor) -> Self {
        match descriptor {
            Descriptor::Primitive(p) => match p {
                PrimitiveDescriptor::Void => Self::Void,
                PrimitiveDescriptor::Bool => Self::Bool,
                PrimitiveDescriptor::Byte => Self::Byte,
                PrimitiveDescriptor::I16 => Self::I16,
                PrimitiveDescriptor::I32 => Self::I32,
                PrimitiveDescriptor::I64 => Self::I64,
                PrimitiveDescriptor::Double => Self::Double,
                PrimitiveDescriptor::String | PrimitiveDescriptor::Binary => Self::String,
            },
            Descriptor::Enum(_) => Self::I32,
            Descriptor::Message(_) => Self::Struct,
            Descriptor::List(_) => Self::List,
            Descriptor::Set(_) => Self::Set,
            Descriptor::Map(..) => Self::Map,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Double => "double",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::String => "string",
            Self::Struct => "struct",
            Self::Map => "map",
            Self::Set => "set",
            Self::List => "list",
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// How integers, field ids and sizes are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Zigzag varint integers, varint field ids and sizes.
    #[default]
    Varint,
    /// Thrift binary protocol: big-endian fixed-width integers, i16 field
    /// ids and i32 sizes.
    Fixed,
}

impl Encoding {
    fn write_field_id(self, out: &mut dyn Write, key: u16) -> Result<()> {
        match self {
            Self::Varint => {
                write_varint(out, u64::from(key))?;
            }
            Self::Fixed => out.write_u16::<BigEndian>(key)?,
        }
        Ok(())
    }

    /// Field ids outside `u16` come back as-is so the caller can report them.
    fn read_field_id(self, input: &mut dyn Read) -> Result<u32> {
        match self {
            Self::Varint => read_varint32(input),
            Self::Fixed => Ok(u32::from(input.read_u16::<BigEndian>()?)),
        }
    }

    fn write_i16(self, out: &mut dyn Write, v: i16) -> Result<()> {
        match self {
            Self::Varint => {
                write_zigzag32(out, i32::from(v))?;
            }
            Self::Fixed => out.write_i16::<BigEndian>(v)?,
        }
        Ok(())
    }

    fn write_i32(self, out: &mut dyn Write, v: i32) -> Result<()> {
        match self {
            Self::Varint => {
                write_zigzag32(out, v)?;
            }
            Self::Fixed => out.write_i32::<BigEndian>(v)?,
        }
        Ok(())
    }

    fn write_i64(self, out: &mut dyn Write, v: i64) -> Result<()> {
        match self {
            Self::Varint => {
                write_zigzag64(out, v)?;
            }
            Self::Fixed => out.write_i64::<BigEndian>(v)?,
        }
        Ok(())
    }

    fn read_i16(self, input: &mut dyn Read) -> Result<i16> {
        match self {
            Self::Varint => {
                let v = read_zigzag32(input)?;
                i16::try_from(v).map_err(|_| CodecError::mismatch("i16", v))
            }
            Self::Fixed => Ok(input.read_i16::<BigEndian>()?),
        }
    }

    fn read_i32(self, input: &mut dyn Read) -> Result<i32> {
        match self {
            Self::Varint => read_zigzag32(input),
            Self::Fixed => Ok(input.read_i32::<BigEndian>()?),
        }
    }

    fn read_i64(self, input: &mut dyn Read) -> Result<i64> {
        match self {
            Self::Varint => read_zigzag64(input),
            Self::Fixed => Ok(input.read_i64::<BigEndian>()?),
        }
    }

    fn write_size(self, out: &mut dyn Write, len: usize) -> Result<()> {
        match self {
            Self::Varint => {
                let len = u32::try_from(len).map_err(|_| CodecError::mismatch("size below 2^32", len))?;
                write_varint(out, u64::from(len))?;
            }
            Self::Fixed => {
                let len = i32::try_from(len).map_err(|_| CodecError::mismatch("size below 2^31", len))?;
                out.write_i32::<BigEndian>(len)?;
            }
        }
        Ok(())
    }

    fn read_size(self, input: &mut dyn Read) -> Result<u32> {
        match self {
            Self::Varint => read_varint32(input),
            Self::Fixed => {
                let size = input.read_i32::<BigEndian>()?;
                u32::try_from(size).map_err(|_| CodecError::mismatch("size", size))
            }
        }
    }

    fn skip_integer(self, input: &mut dyn Read, wire: WireType) -> Result<()> {
        match (self, wire) {
            (Self::Varint, _) => {
                read_varint64(input)?;
            }
            (Self::Fixed, WireType::I16) => skip_bytes(input, 2)?,
            (Self::Fixed, WireType::I32) => skip_bytes(input, 4)?,
            (Self::Fixed, _) => skip_bytes(input, 8)?,
        }
        Ok(())
    }
}

// ============================================================================
// Serializer
// ============================================================================

/// Binary serializer.
///
/// Lenient by default: unknown field ids are skipped and unknown enum
/// values are dropped. A strict serializer fails on both.
#[derive(Debug, Clone)]
pub struct BinarySerializer {
    registry: Arc<TypeRegistry>,
    strict: bool,
    encoding: Encoding,
}

impl BinarySerializer {
    pub const MIME_TYPE: &'static str = "application/vnd.morimekta.providence.binary";
    pub const THRIFT_MIME_TYPE: &'static str = "application/vnd.apache.thrift.binary";

    /// Varint-encoded serializer.
    pub fn new(registry: &Arc<TypeRegistry>) -> Self {
        Self {
            registry: Arc::clone(registry),
            strict: false,
            encoding: Encoding::Varint,
        }
    }

    pub fn strict(registry: &Arc<TypeRegistry>) -> Self {
        Self::new(registry).with_strict(true)
    }

    /// Serializer speaking the Thrift binary protocol.
    pub fn thrift(registry: &Arc<TypeRegistry>) -> Self {
        Self::new(registry).with_encoding(Encoding::Fixed)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    // ------------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------------

    fn read_message(
        &self,
        input: &mut dyn Read,
        descriptor: &Arc<StructDescriptor>,
        depth: usize,
    ) -> Result<Message> {
        let mut builder = MessageBuilder::new(descriptor);
        loop {
            let wire = read_wire_type(input)?;
            if wire == WireType::Stop {
                break;
            }
            let id = self.encoding.read_field_id(input)?;
            let field = u16::try_from(id).ok().and_then(|key| descriptor.field(key));
            let Some(field) = field else {
                if self.strict {
                    return Err(CodecError::UnknownField(format!(
                        "{id} in {}",
                        descriptor.qualified_name()
                    )));
                }
                log::warn!(
                    "[binary] skipping unknown field {} ({}) in {}",
                    id,
                    wire.name(),
                    descriptor.qualified_name()
                );
                skip_value(input, self.encoding, wire, depth)?;
                continue;
            };

            let in_field = |e: CodecError| e.in_field(PathSegment::Field(field.name()));
            if wire != WireType::of(field.descriptor()) {
                return Err(in_field(CodecError::mismatch(field.descriptor(), wire.name())));
            }
            if let Some(value) = self
                .read_value(input, field.descriptor(), depth)
                .map_err(in_field)?
            {
                builder.insert(field.key(), value);
            }
        }
        builder.build()
    }

    /// `Ok(None)` means the value was consumed but dropped (unknown enum).
    fn read_value(
        &self,
        input: &mut dyn Read,
        descriptor: &Descriptor,
        depth: usize,
    ) -> Result<Option<Value>> {
        let enc = self.encoding;
        let value = match descriptor {
            Descriptor::Primitive(p) => match p {
                PrimitiveDescriptor::Void => Value::Void,
                PrimitiveDescriptor::Bool => Value::Bool(input.read_u8()? != 0),
                PrimitiveDescriptor::Byte => Value::Byte(input.read_i8()?),
                PrimitiveDescriptor::I16 => Value::I16(enc.read_i16(input)?),
                PrimitiveDescriptor::I32 => Value::I32(enc.read_i32(input)?),
                PrimitiveDescriptor::I64 => Value::I64(enc.read_i64(input)?),
                PrimitiveDescriptor::Double => Value::Double(input.read_f64::<BigEndian>()?),
                PrimitiveDescriptor::String => {
                    let bytes = read_bytes(input, enc)?;
                    Value::String(
                        String::from_utf8(bytes)
                            .map_err(|_| CodecError::mismatch("utf-8 string", "invalid utf-8"))?,
                    )
                }
                PrimitiveDescriptor::Binary => Value::Binary(Binary::from(read_bytes(input, enc)?)),
            },
            Descriptor::Enum(r) => {
                let v = enc.read_i32(input)?;
                return resolve_enum(&self.registry, r, EnumKey::Value(v), self.strict);
            }
            Descriptor::Message(r) => {
                let nested = resolve_struct(&self.registry, r)?;
                Value::Message(self.read_message(input, nested, descend(depth)?)?)
            }
            Descriptor::List(item) => Value::List(self.read_items(input, item, descend(depth)?)?),
            Descriptor::Set(item) => Value::set_of(self.read_items(input, item, descend(depth)?)?),
            Descriptor::Map(key, item) => {
                let depth = descend(depth)?;
                expect_wire_type(input, key)?;
                expect_wire_type(input, item)?;
                let count = enc.read_size(input)?;
                check_count(count, is_zero_width(key) && is_zero_width(item))?;
                let count = count as usize;
                let mut entries = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
                for i in 0..count {
                    let k = self
                        .read_value(input, key, depth)
                        .map_err(|e| e.in_field(PathSegment::Index(i)))?;
                    let segment = k.as_ref().map_or(PathSegment::Index(i), key_segment);
                    let v = self
                        .read_value(input, item, depth)
                        .map_err(|e| e.in_field(segment))?;
                    if let (Some(k), Some(v)) = (k, v) {
                        entries.push((k, v));
                    }
                }
                Value::map_of(entries)
            }
        };
        Ok(Some(value))
    }

    fn read_items(
        &self,
        input: &mut dyn Read,
        item: &Descriptor,
        depth: usize,
    ) -> Result<Vec<Value>> {
        expect_wire_type(input, item)?;
        let count = self.encoding.read_size(input)?;
        check_count(count, is_zero_width(item))?;
        let count = count as usize;
        let mut items = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
        for i in 0..count {
            let value = self
                .read_value(input, item, depth)
                .map_err(|e| e.in_field(PathSegment::Index(i)))?;
            items.extend(value);
        }
        Ok(items)
    }
}

impl Serializer for BinarySerializer {
    fn serialize(&self, output: &mut dyn Write, message: &Message) -> Result<usize> {
        let mut out = CountingWriter::new(output);
        write_message(&mut out, self.encoding, message)?;
        log::trace!(
            "[binary] wrote {} ({} bytes, {:?})",
            message.descriptor().qualified_name(),
            out.count(),
            self.encoding
        );
        Ok(out.count())
    }

    fn deserialize(
        &self,
        input: &mut dyn Read,
        descriptor: &Arc<StructDescriptor>,
    ) -> Result<Message> {
        self.read_message(input, descriptor, 0)
    }

    fn mime_type(&self) -> &'static str {
        match self.encoding {
            Encoding::Varint => Self::MIME_TYPE,
            Encoding::Fixed => Self::THRIFT_MIME_TYPE,
        }
    }

    fn binary_protocol(&self) -> bool {
        true
    }
}

// ----------------------------------------------------------------------------
// Encoding
// ----------------------------------------------------------------------------

fn write_message(out: &mut dyn Write, enc: Encoding, message: &Message) -> Result<()> {
    for (field, value) in message.present_fields() {
        write_byte(out, WireType::of(field.descriptor()) as u8)?;
        enc.write_field_id(out, field.key())?;
        write_value(out, enc, field.descriptor(), value)
            .map_err(|e| e.in_field(PathSegment::Field(field.name())))?;
    }
    write_byte(out, WireType::Stop as u8)?;
    Ok(())
}

fn write_value(
    out: &mut dyn Write,
    enc: Encoding,
    descriptor: &Descriptor,
    value: &Value,
) -> Result<()> {
    match (descriptor, value) {
        (_, Value::Void) => {}
        (_, Value::Bool(b)) => {
            write_byte(out, u8::from(*b))?;
        }
        (_, Value::Byte(b)) => out.write_i8(*b)?,
        (_, Value::I16(v)) => enc.write_i16(out, *v)?,
        (_, Value::I32(v)) => enc.write_i32(out, *v)?,
        (_, Value::I64(v)) => enc.write_i64(out, *v)?,
        (_, Value::Double(v)) => out.write_f64::<BigEndian>(*v)?,
        (_, Value::String(s)) => write_bytes(out, enc, s.as_bytes())?,
        (_, Value::Binary(b)) => write_bytes(out, enc, b.as_slice())?,
        (_, Value::Enum(e)) => enc.write_i32(out, e.value())?,
        (_, Value::Message(m)) => write_message(out, enc, m)?,
        (Descriptor::List(item), Value::List(items)) | (Descriptor::Set(item), Value::Set(items)) => {
            write_byte(out, WireType::of(item) as u8)?;
            enc.write_size(out, items.len())?;
            for (i, v) in items.iter().enumerate() {
                write_value(out, enc, item, v).map_err(|e| e.in_field(PathSegment::Index(i)))?;
            }
        }
        (Descriptor::Map(key, item), Value::Map(entries)) => {
            write_byte(out, WireType::of(key) as u8)?;
            write_byte(out, WireType::of(item) as u8)?;
            enc.write_size(out, entries.len())?;
            for (k, v) in entries {
                write_value(out, enc, key, k).map_err(|e| e.in_field(key_segment(k)))?;
                write_value(out, enc, item, v).map_err(|e| e.in_field(key_segment(k)))?;
            }
        }
        (descriptor, value) => return Err(CodecError::mismatch(descriptor, value.tag())),
    }
    Ok(())
}

fn write_bytes(out: &mut dyn Write, enc: Encoding, bytes: &[u8]) -> Result<()> {
    enc.write_size(out, bytes.len())?;
    out.write_all(bytes)?;
    Ok(())
}

// ----------------------------------------------------------------------------
// Reading helpers
// ----------------------------------------------------------------------------

fn read_wire_type(input: &mut dyn Read) -> Result<WireType> {
    let byte = input.read_u8()?;
    WireType::from_byte(byte).ok_or_else(|| CodecError::mismatch("wire type", format!("byte {byte}")))
}

/// Wire type of container items or keys; `Stop` is not a value.
fn read_item_wire_type(input: &mut dyn Read) -> Result<WireType> {
    match read_wire_type(input)? {
        WireType::Stop => Err(CodecError::mismatch("item wire type", "stop")),
        wire => Ok(wire),
    }
}

fn expect_wire_type(input: &mut dyn Read, descriptor: &Descriptor) -> Result<()> {
    let wire = read_wire_type(input)?;
    if wire != WireType::of(descriptor) {
        return Err(CodecError::mismatch(descriptor, wire.name()));
    }
    Ok(())
}

fn is_zero_width(descriptor: &Descriptor) -> bool {
    *descriptor == Descriptor::VOID
}

/// Zero-width items consume no input, so only their count bounds the loop.
fn check_count(count: u32, zero_width: bool) -> Result<()> {
    if zero_width && count > MAX_ZERO_WIDTH_ITEMS {
        return Err(CodecError::ContainerTooLarge {
            count: u64::from(count),
            max: u64::from(MAX_ZERO_WIDTH_ITEMS),
        });
    }
    Ok(())
}

fn read_bytes(input: &mut dyn Read, enc: Encoding) -> Result<Vec<u8>> {
    let len = enc.read_size(input)? as usize;
    let mut buf = Vec::with_capacity(len.min(PREALLOCATE_LIMIT * 64));
    Read::take(&mut *input, len as u64).read_to_end(&mut buf)?;
    if buf.len() < len {
        return Err(CodecError::TruncatedInput);
    }
    Ok(buf)
}

fn skip_bytes(input: &mut dyn Read, len: u64) -> Result<()> {
    let skipped = io::copy(&mut Read::take(&mut *input, len), &mut io::sink())?;
    if skipped < len {
        return Err(CodecError::TruncatedInput);
    }
    Ok(())
}

/// Consume one value of wire type `wire` without decoding it.
fn skip_value(input: &mut dyn Read, enc: Encoding, wire: WireType, depth: usize) -> Result<()> {
    match wire {
        WireType::Stop | WireType::Void => {}
        WireType::Bool | WireType::Byte => skip_bytes(input, 1)?,
        WireType::Double => skip_bytes(input, 8)?,
        WireType::I16 | WireType::I32 | WireType::I64 => enc.skip_integer(input, wire)?,
        WireType::String => {
            let len = enc.read_size(input)?;
            skip_bytes(input, u64::from(len))?;
        }
        WireType::Struct => {
            let depth = descend(depth)?;
            loop {
                let field_wire = read_wire_type(input)?;
                if field_wire == WireType::Stop {
                    break;
                }
                enc.read_field_id(input)?;
                skip_value(input, enc, field_wire, depth)?;
            }
        }
        WireType::List | WireType::Set => {
            let depth = descend(depth)?;
            let item = read_item_wire_type(input)?;
            let count = enc.read_size(input)?;
            check_count(count, item == WireType::Void)?;
            for _ in 0..count {
                skip_value(input, enc, item, depth)?;
            }
        }
        WireType::Map => {
            let depth = descend(depth)?;
            let key = read_item_wire_type(input)?;
            let item = read_item_wire_type(input)?;
            let count = enc.read_size(input)?;
            check_count(count, key == WireType::Void && item == WireType::Void)?;
            for _ in 0..count {
                skip_value(input, enc, key, depth)?;
                skip_value(input, enc, item, depth)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{EnumDef, FieldDescriptor, RegistryBuilder, StructDef};

    fn registry() -> Arc<TypeRegistry> {
        let mut builder = RegistryBuilder::new();
        let level = builder
            .enum_type(EnumDef::new("t", "Level").value(1, "LOW").value(2, "HIGH"))
            .expect("enum");
        builder
            .struct_type(
                StructDef::new("t", "Sample")
                    .field(FieldDescriptor::new(1, "flag", Descriptor::BOOL))
                    .field(FieldDescriptor::new(2, "count", Descriptor::I32))
                    .field(FieldDescriptor::new(3, "name", Descriptor::STRING))
                    .field(FieldDescriptor::new(4, "level", Descriptor::Enum(level)))
                    .field(FieldDescriptor::new(5, "ratio", Descriptor::DOUBLE))
                    .field(FieldDescriptor::new(6, "ids", Descriptor::list(Descriptor::I16)))
                    .field(FieldDescriptor::new(7, "marks", Descriptor::list(Descriptor::VOID))),
            )
            .expect("sample");
        builder.build().expect("registry")
    }

    fn sample(registry: &TypeRegistry) -> &Arc<StructDescriptor> {
        registry.find_struct("t.Sample").expect("sample")
    }

    #[test]
    fn test_wire_layout() {
        let registry = registry();
        let mut builder = MessageBuilder::new(sample(&registry));
        builder
            .set(1, true)
            .expect("flag")
            .set(2, -1)
            .expect("count")
            .set(3, "hi")
            .expect("name");
        let msg = builder.build().expect("build");

        let bytes = BinarySerializer::new(&registry).to_vec(&msg).expect("encode");
        assert_eq!(
            bytes,
            [
                2, 1, 1, // bool field 1 = true
                8, 2, 1, // i32 field 2 = zigzag(-1)
                11, 3, 2, b'h', b'i', // string field 3
                0,
            ]
        );
    }

    #[test]
    fn test_double_is_big_endian() {
        let registry = registry();
        let mut builder = MessageBuilder::new(sample(&registry));
        builder.set(5, 1.0).expect("ratio");
        let bytes = BinarySerializer::new(&registry)
            .to_vec(&builder.build().expect("build"))
            .expect("encode");
        assert_eq!(bytes, [4, 5, 0x3F, 0xF0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_list_layout_and_roundtrip() {
        let registry = registry();
        let mut builder = MessageBuilder::new(sample(&registry));
        builder
            .set(6, vec![Value::I16(1), Value::I16(-2)])
            .expect("ids");
        let msg = builder.build().expect("build");
        let serializer = BinarySerializer::new(&registry);
        let bytes = serializer.to_vec(&msg).expect("encode");
        assert_eq!(bytes, [15, 6, 6, 2, 2, 3, 0]);
        assert_eq!(serializer.from_slice(&bytes, sample(&registry)).expect("decode"), msg);
    }

    #[test]
    fn test_serialize_reports_byte_count() {
        let registry = registry();
        let mut builder = MessageBuilder::new(sample(&registry));
        builder.set(3, "four").expect("name");
        let msg = builder.build().expect("build");
        let mut out = Vec::new();
        let written = BinarySerializer::new(&registry)
            .serialize(&mut out, &msg)
            .expect("encode");
        assert_eq!(written, out.len());
        assert_eq!(written, 8);
    }

    #[test]
    fn test_unknown_field_skipped_or_rejected() {
        let registry = registry();
        // field 9 (list<string> ["x"]), then field 2 = 3
        let bytes = [15, 9, 11, 1, 1, b'x', 8, 2, 6, 0];

        let msg = BinarySerializer::new(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect("lenient");
        assert_eq!(msg.get(2), Some(&Value::I32(3)));
        assert_eq!(msg.len(), 1);

        let err = BinarySerializer::strict(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect_err("strict");
        assert!(matches!(err, CodecError::UnknownField(_)));
    }

    #[test]
    fn test_unknown_enum_value() {
        let registry = registry();
        let bytes = [8, 4, 14, 0]; // level = 7

        let msg = BinarySerializer::new(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect("lenient");
        assert!(!msg.has(4));

        let err = BinarySerializer::strict(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect_err("strict");
        assert_eq!(err.path(), Some("level"));
        assert!(matches!(err.root(), CodecError::UnknownEnumValue { .. }));
    }

    #[test]
    fn test_type_mismatch() {
        let registry = registry();
        // field 2 declared i32, sent as string
        let bytes = [11, 2, 1, b'x', 0];
        let err = BinarySerializer::new(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect_err("mismatch");
        assert_eq!(err.path(), Some("count"));
        assert!(matches!(err.root(), CodecError::TypeMismatch { .. }));

        // list<i16> declared, items sent as i32
        let bytes = [15, 6, 8, 1, 2, 0];
        let err = BinarySerializer::new(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect_err("item mismatch");
        assert!(matches!(err.root(), CodecError::TypeMismatch { .. }));
    }

    #[test]
    fn test_truncated_input() {
        let registry = registry();
        for bytes in [&[][..], &[11, 3, 5, b'a'][..], &[8, 2][..], &[2, 1, 1][..]] {
            let err = BinarySerializer::new(&registry)
                .from_slice(bytes, sample(&registry))
                .expect_err("truncated");
            assert!(matches!(err.root(), CodecError::TruncatedInput), "{bytes:?}: {err}");
        }
    }

    #[test]
    fn test_unknown_wire_type() {
        let registry = registry();
        let err = BinarySerializer::new(&registry)
            .from_slice(&[7, 1, 0], sample(&registry))
            .expect_err("bad wire");
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
    }

    #[test]
    fn test_wire_type_bytes() {
        for byte in 0..=16u8 {
            if let Some(wire) = WireType::from_byte(byte) {
                assert_eq!(wire as u8, byte);
            }
        }
        assert_eq!(WireType::of(&Descriptor::BINARY), WireType::String);
        assert!(WireType::from_byte(5).is_none());
    }

    #[test]
    fn test_deep_unknown_struct_is_bounded() {
        let registry = registry();
        let mut bytes = vec![12, 99];
        for _ in 0..200_000 {
            bytes.extend_from_slice(&[12, 1]);
        }
        let err = BinarySerializer::new(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect_err("too deep");
        assert!(matches!(err.root(), CodecError::NestingTooDeep { max: 64 }), "{err}");
    }

    #[test]
    fn test_nesting_at_limit_is_accepted() {
        let registry = registry();
        // 63 empty structs inside the unknown field, then field 2 = 3
        let mut bytes = vec![12, 99];
        for _ in 0..(crate::serializer::MAX_DEPTH - 1) {
            bytes.extend_from_slice(&[12, 1]);
        }
        bytes.extend(std::iter::repeat(0).take(crate::serializer::MAX_DEPTH));
        bytes.extend_from_slice(&[8, 2, 6, 0]);
        let msg = BinarySerializer::new(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect("at limit");
        assert_eq!(msg.get(2), Some(&Value::I32(3)));
    }

    #[test]
    fn test_zero_width_counts_are_capped() {
        let registry = registry();
        // unknown list<void> declaring u32::MAX items
        let bytes = [15, 99, 1, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0];
        let err = BinarySerializer::new(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect_err("unknown list");
        assert!(matches!(err.root(), CodecError::ContainerTooLarge { .. }), "{err}");

        // same count on the declared list<void> field
        let bytes = [15, 7, 1, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0];
        let err = BinarySerializer::new(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect_err("known list");
        assert_eq!(err.path(), Some("marks"));
        assert!(matches!(err.root(), CodecError::ContainerTooLarge { .. }));

        // a few voids are fine
        let msg = BinarySerializer::new(&registry)
            .from_slice(&[15, 7, 1, 3, 0], sample(&registry))
            .expect("small list");
        assert_eq!(msg.get(7), Some(&Value::List(vec![Value::Void; 3])));
    }

    #[test]
    fn test_stop_is_not_an_item_type() {
        let registry = registry();
        for bytes in [
            &[15, 99, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0][..],
            &[13, 99, 0, 8, 1, 2, 2, 0][..],
            &[13, 99, 8, 0, 1, 2, 0][..],
        ] {
            let err = BinarySerializer::new(&registry)
                .from_slice(bytes, sample(&registry))
                .expect_err("stop item");
            assert!(matches!(err.root(), CodecError::TypeMismatch { .. }), "{bytes:?}: {err}");
        }
    }

    #[test]
    fn test_thrift_wire_layout() {
        let registry = registry();
        let mut builder = MessageBuilder::new(sample(&registry));
        builder
            .set(1, true)
            .expect("flag")
            .set(2, -1)
            .expect("count")
            .set(3, "hi")
            .expect("name")
            .set(6, vec![Value::I16(1), Value::I16(-2)])
            .expect("ids");
        let msg = builder.build().expect("build");

        let serializer = BinarySerializer::thrift(&registry);
        assert_eq!(serializer.mime_type(), BinarySerializer::THRIFT_MIME_TYPE);
        let bytes = serializer.to_vec(&msg).expect("encode");
        assert_eq!(
            bytes,
            [
                2, 0, 1, 1, // bool field 1 = true
                8, 0, 2, 0xFF, 0xFF, 0xFF, 0xFF, // i32 field 2 = -1
                11, 0, 3, 0, 0, 0, 2, b'h', b'i', // string field 3
                15, 0, 6, 6, 0, 0, 0, 2, 0, 1, 0xFF, 0xFE, // list<i16> field 6
                0,
            ]
        );
        assert_eq!(serializer.from_slice(&bytes, sample(&registry)).expect("decode"), msg);
    }

    #[test]
    fn test_thrift_skips_unknown_fixed_width_fields() {
        let registry = registry();
        // field 9 i64, field 10 i16, then field 2 = 3
        let bytes = [
            10, 0, 9, 0, 0, 0, 0, 0, 0, 0, 1, //
            6, 0, 10, 0, 1, //
            8, 0, 2, 0, 0, 0, 3, //
            0,
        ];
        let msg = BinarySerializer::thrift(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect("decode");
        assert_eq!(msg.get(2), Some(&Value::I32(3)));
        assert_eq!(msg.len(), 1);
    }

    #[test]
    fn test_thrift_negative_size_rejected() {
        let registry = registry();
        let bytes = [11, 0, 3, 0xFF, 0xFF, 0xFF, 0xFF, 0];
        let err = BinarySerializer::thrift(&registry)
            .from_slice(&bytes, sample(&registry))
            .expect_err("negative size");
        assert_eq!(err.path(), Some("name"));
        assert!(matches!(err.root(), CodecError::TypeMismatch { .. }));
    }
}
