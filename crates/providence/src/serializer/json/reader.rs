// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON decoding.

use std::sync::Arc;

use crate::descriptor::{Descriptor, PrimitiveDescriptor, StructDescriptor};
use crate::error::{CodecError, PathSegment, Result};
use crate::message::{Binary, Message, MessageBuilder, Value};
use crate::serializer::{descend, resolve_enum, resolve_struct, EnumKey};

use super::number::parse_special;
use super::tokenizer::{Token, TokenKind, Tokenizer};
use super::JsonSerializer;

impl JsonSerializer {
    /// Parse `text` as exactly one message nested `depth` levels down.
    pub(super) fn read_document(
        &self,
        text: &str,
        descriptor: &Arc<StructDescriptor>,
        depth: usize,
    ) -> Result<Message> {
        let mut tokens = Tokenizer::new(text);
        let first = tokens.next()?;
        let message = self.read_message(&mut tokens, first, descriptor, depth)?;
        tokens.expect_end()?;
        Ok(message)
    }

    fn read_message(
        &self,
        tokens: &mut Tokenizer<'_>,
        first: Token,
        descriptor: &Arc<StructDescriptor>,
        depth: usize,
    ) -> Result<Message> {
        match &first.kind {
            TokenKind::BeginObject => self.read_object(tokens, descriptor, depth),
            TokenKind::BeginArray if descriptor.is_compactible() => {
                self.read_compact(tokens, descriptor, depth)
            }
            TokenKind::BeginArray => Err(CodecError::mismatch(
                format!("object for {}", descriptor.qualified_name()),
                "array (struct is not compactible)",
            )),
            other => Err(CodecError::mismatch(descriptor.qualified_name(), other)),
        }
    }

    fn read_object(
        &self,
        tokens: &mut Tokenizer<'_>,
        descriptor: &Arc<StructDescriptor>,
        depth: usize,
    ) -> Result<Message> {
        let mut builder = MessageBuilder::new(descriptor);
        if !tokens.consume_if(&TokenKind::EndObject)? {
            loop {
                let key = tokens.next()?;
                let TokenKind::String(name) = &key.kind else {
                    return Err(tokens.failure(&key, "expected object key"));
                };
                tokens.expect(&TokenKind::Colon)?;

                let field = if is_field_id(name) {
                    name.parse::<u16>().ok().and_then(|k| descriptor.field(k))
                } else {
                    descriptor.field_by_name(name)
                };
                match field {
                    Some(field) => {
                        let value = self
                            .read_field(tokens, field.descriptor(), depth)
                            .map_err(|e| e.in_field(PathSegment::Field(field.name())))?;
                        if let Some(value) = value {
                            builder.insert(field.key(), value);
                        }
                    }
                    None if self.strict => {
                        return Err(CodecError::UnknownField(format!(
                            "{name} in {}",
                            descriptor.qualified_name()
                        )));
                    }
                    None => {
                        log::warn!(
                            "[json] skipping unknown field {} in {}",
                            name,
                            descriptor.qualified_name()
                        );
                        tokens.skip_value(depth)?;
                    }
                }

                if !tokens.list_continues(&TokenKind::EndObject)? {
                    break;
                }
            }
        }
        builder.build()
    }

    /// Positional form: element `i` is the `i`-th declared field.
    fn read_compact(
        &self,
        tokens: &mut Tokenizer<'_>,
        descriptor: &Arc<StructDescriptor>,
        depth: usize,
    ) -> Result<Message> {
        let mut builder = MessageBuilder::new(descriptor);
        if !tokens.consume_if(&TokenKind::EndArray)? {
            let fields = descriptor.fields();
            let mut index = 0;
            loop {
                let Some(field) = fields.get(index) else {
                    return Err(CodecError::UnexpectedField(format!(
                        "element {index} of {} which has {} fields",
                        descriptor.qualified_name(),
                        fields.len()
                    )));
                };
                let value = self
                    .read_field(tokens, field.descriptor(), depth)
                    .map_err(|e| e.in_field(PathSegment::Field(field.name())))?;
                if let Some(value) = value {
                    builder.insert(field.key(), value);
                }
                index += 1;

                if !tokens.list_continues(&TokenKind::EndArray)? {
                    break;
                }
            }
        }
        builder.build()
    }

    /// Field value; `null` leaves the field unset.
    fn read_field(
        &self,
        tokens: &mut Tokenizer<'_>,
        descriptor: &Descriptor,
        depth: usize,
    ) -> Result<Option<Value>> {
        if tokens.consume_if(&TokenKind::Null)? {
            return Ok(None);
        }
        self.read_value(tokens, descriptor, depth)
    }

    /// `Ok(None)` means the value was consumed but dropped.
    fn read_value(
        &self,
        tokens: &mut Tokenizer<'_>,
        descriptor: &Descriptor,
        depth: usize,
    ) -> Result<Option<Value>> {
        let token = tokens.next()?;
        let value = match descriptor {
            Descriptor::Primitive(p) => match (*p, &token.kind) {
                (PrimitiveDescriptor::Void, TokenKind::True) => Value::Void,
                (PrimitiveDescriptor::Void, TokenKind::False) => return Ok(None),
                (PrimitiveDescriptor::Bool, TokenKind::True) => Value::Bool(true),
                (PrimitiveDescriptor::Bool, TokenKind::False) => Value::Bool(false),
                (PrimitiveDescriptor::Bool, TokenKind::Number(n)) => {
                    Value::Bool(parse_integer::<i64>(n, "bool")? != 0)
                }
                (PrimitiveDescriptor::Byte, TokenKind::Number(n)) => {
                    Value::Byte(parse_integer(n, "byte")?)
                }
                (PrimitiveDescriptor::I16, TokenKind::Number(n)) => {
                    Value::I16(parse_integer(n, "i16")?)
                }
                (PrimitiveDescriptor::I32, TokenKind::Number(n)) => {
                    Value::I32(parse_integer(n, "i32")?)
                }
                (PrimitiveDescriptor::I64, TokenKind::Number(n)) => {
                    Value::I64(parse_integer(n, "i64")?)
                }
                (PrimitiveDescriptor::Double, TokenKind::Number(n)) => Value::Double(
                    n.parse::<f64>()
                        .map_err(|_| CodecError::mismatch("double", n))?,
                ),
                (PrimitiveDescriptor::Double, TokenKind::String(s)) => Value::Double(
                    parse_special(s).ok_or_else(|| CodecError::mismatch("double", format!("{s:?}")))?,
                ),
                (PrimitiveDescriptor::String, TokenKind::String(s)) => Value::String(s.clone()),
                (PrimitiveDescriptor::Binary, TokenKind::String(s)) => Value::Binary(
                    Binary::from_base64(s).map_err(|e| CodecError::mismatch("base64 binary", e))?,
                ),
                (p, kind) => return Err(CodecError::mismatch(p.name(), kind)),
            },
            Descriptor::Enum(r) => {
                let key = match &token.kind {
                    TokenKind::Number(n) => EnumKey::Value(parse_integer(n, "enum value")?),
                    TokenKind::String(s) => enum_key(s),
                    other => return Err(CodecError::mismatch(r, other)),
                };
                return resolve_enum(&self.registry, r, key, self.strict);
            }
            Descriptor::Message(r) => {
                let nested = resolve_struct(&self.registry, r)?;
                Value::Message(self.read_message(tokens, token, nested, descend(depth)?)?)
            }
            Descriptor::List(item) => {
                Value::List(self.read_items(tokens, &token, item, descend(depth)?)?)
            }
            Descriptor::Set(item) => {
                Value::set_of(self.read_items(tokens, &token, item, descend(depth)?)?)
            }
            Descriptor::Map(key, item) => {
                if token.kind != TokenKind::BeginObject {
                    return Err(CodecError::mismatch(descriptor, &token.kind));
                }
                Value::map_of(self.read_entries(tokens, key, item, descend(depth)?)?)
            }
        };
        Ok(Some(value))
    }

    fn read_items(
        &self,
        tokens: &mut Tokenizer<'_>,
        open: &Token,
        item: &Descriptor,
        depth: usize,
    ) -> Result<Vec<Value>> {
        if open.kind != TokenKind::BeginArray {
            return Err(CodecError::mismatch("array", &open.kind));
        }
        let mut items = Vec::new();
        if tokens.consume_if(&TokenKind::EndArray)? {
            return Ok(items);
        }
        loop {
            let value = self
                .read_value(tokens, item, depth)
                .map_err(|e| e.in_field(PathSegment::Index(items.len())))?;
            items.extend(value);
            if !tokens.list_continues(&TokenKind::EndArray)? {
                return Ok(items);
            }
        }
    }

    fn read_entries(
        &self,
        tokens: &mut Tokenizer<'_>,
        key: &Descriptor,
        item: &Descriptor,
        depth: usize,
    ) -> Result<Vec<(Value, Value)>> {
        let mut entries = Vec::new();
        if tokens.consume_if(&TokenKind::EndObject)? {
            return Ok(entries);
        }
        loop {
            let key_token = tokens.next()?;
            let TokenKind::String(text) = &key_token.kind else {
                return Err(tokens.failure(&key_token, "expected object key"));
            };
            tokens.expect(&TokenKind::Colon)?;

            let segment = PathSegment::Key(text.clone());
            let k = self
                .parse_map_key(key, text, depth)
                .map_err(|e| e.in_field(segment.clone()))?;
            let v = self
                .read_value(tokens, item, depth)
                .map_err(|e| e.in_field(segment))?;
            if let (Some(k), Some(v)) = (k, v) {
                entries.push((k, v));
            }

            if !tokens.list_continues(&TokenKind::EndObject)? {
                return Ok(entries);
            }
        }
    }

    /// Inverse of the writer's key stringification.
    fn parse_map_key(
        &self,
        descriptor: &Descriptor,
        text: &str,
        depth: usize,
    ) -> Result<Option<Value>> {
        let value = match descriptor {
            Descriptor::Primitive(p) => match p {
                PrimitiveDescriptor::Bool => match text {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => return Err(CodecError::mismatch("bool", text)),
                },
                PrimitiveDescriptor::Byte => Value::Byte(parse_integer(text, "byte")?),
                PrimitiveDescriptor::I16 => Value::I16(parse_integer(text, "i16")?),
                PrimitiveDescriptor::I32 => Value::I32(parse_integer(text, "i32")?),
                PrimitiveDescriptor::I64 => Value::I64(parse_integer(text, "i64")?),
                PrimitiveDescriptor::Double => match parse_special(text) {
                    Some(d) => Value::Double(d),
                    None => Value::Double(
                        text.parse::<f64>()
                            .map_err(|_| CodecError::mismatch("double", text))?,
                    ),
                },
                PrimitiveDescriptor::String => Value::String(text.to_string()),
                PrimitiveDescriptor::Binary => Value::Binary(
                    Binary::from_base64(text)
                        .map_err(|e| CodecError::mismatch("base64 binary", e))?,
                ),
                PrimitiveDescriptor::Void => return Err(CodecError::mismatch("map key", "void")),
            },
            Descriptor::Enum(r) => {
                return resolve_enum(&self.registry, r, enum_key(text), self.strict);
            }
            Descriptor::Message(r) => {
                let nested = resolve_struct(&self.registry, r)?;
                Value::Message(self.read_document(text, nested, descend(depth)?)?)
            }
            other => {
                return Err(CodecError::mismatch(
                    "primitive, enum or simple struct map key",
                    other,
                ))
            }
        };
        Ok(Some(value))
    }
}

fn is_field_id(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Enum spelled as a name or as a numeric string.
fn enum_key(text: &str) -> EnumKey<'_> {
    match text.parse::<i32>() {
        Ok(v) => EnumKey::Value(v),
        Err(_) => EnumKey::Name(text),
    }
}

fn parse_integer<T: TryFrom<i64>>(text: &str, expected: &str) -> Result<T> {
    text.parse::<i64>()
        .ok()
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| CodecError::mismatch(expected, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        EnumDef, FieldDescriptor, RegistryBuilder, StructDef, TypeRegistry,
    };
    use crate::serializer::Serializer;

    fn registry() -> Arc<TypeRegistry> {
        let mut builder = RegistryBuilder::new();
        let level = builder
            .enum_type(EnumDef::new("t", "Level").value(1, "LOW").value(5, "HIGH"))
            .expect("enum");
        builder
            .struct_type(
                StructDef::new("t", "Category")
                    .field(FieldDescriptor::new(1, "name", Descriptor::STRING))
                    .field(FieldDescriptor::new(2, "id", Descriptor::I32))
                    .field(FieldDescriptor::new(3, "label", Descriptor::STRING))
                    .compactible(),
            )
            .expect("category");
        builder
            .struct_type(
                StructDef::new("t", "Reading")
                    .field(FieldDescriptor::new(1, "level", Descriptor::Enum(level)))
                    .field(FieldDescriptor::new(2, "value", Descriptor::DOUBLE))
                    .field(FieldDescriptor::new(3, "small", Descriptor::BYTE))
                    .field(FieldDescriptor::new(4, "tags", Descriptor::set(Descriptor::STRING)))
                    .field(FieldDescriptor::new(
                        5,
                        "weights",
                        Descriptor::map(Descriptor::I64, Descriptor::DOUBLE),
                    ))
                    .field(FieldDescriptor::new(6, "ok", Descriptor::BOOL)),
            )
            .expect("reading");
        let node = builder.declare_struct("t", "Node").expect("declare");
        builder
            .struct_type(
                StructDef::new("t", "Node")
                    .field(FieldDescriptor::new(1, "child", Descriptor::Message(node.clone())))
                    .field(FieldDescriptor::new(2, "children", Descriptor::list(Descriptor::Message(node)))),
            )
            .expect("node");
        builder.build().expect("registry")
    }

    fn read(serializer: &JsonSerializer, name: &str, text: &str) -> Result<Message> {
        let registry = Arc::clone(&serializer.registry);
        let desc = registry.find_struct(name).expect("struct");
        serializer.from_slice(text.as_bytes(), desc)
    }

    #[test]
    fn test_compact_forms() {
        let registry = registry();
        let json = JsonSerializer::new(&registry);

        let two = read(&json, "t.Category", r#"["my_category",44]"#).expect("two");
        assert_eq!(two.get(1), Some(&Value::from("my_category")));
        assert_eq!(two.get(2), Some(&Value::I32(44)));
        assert!(!two.has(3));

        let three = read(&json, "t.Category", r#"["my_category",44,"My Category"]"#).expect("three");
        assert_eq!(three.get(3), Some(&Value::from("My Category")));

        let object = read(&json, "t.Category", r#"{"name":"my_category","2":44}"#).expect("object");
        assert_eq!(object, two);
    }

    #[test]
    fn test_compact_too_long() {
        let registry = registry();
        let json = JsonSerializer::new(&registry);
        let err = read(&json, "t.Category", r#"["a",1,"b","c"]"#).expect_err("too long");
        assert!(matches!(err, CodecError::UnexpectedField(_)), "{err}");
    }

    #[test]
    fn test_array_for_plain_struct() {
        let registry = registry();
        let json = JsonSerializer::new(&registry);
        let err = read(&json, "t.Reading", "[1]").expect_err("not compactible");
        assert!(matches!(err, CodecError::TypeMismatch { .. }), "{err}");
    }

    #[test]
    fn test_enum_spellings() {
        let registry = registry();
        let json = JsonSerializer::new(&registry);
        for text in [r#"{"level":5}"#, r#"{"level":"HIGH"}"#, r#"{"1":"5"}"#] {
            let msg = read(&json, "t.Reading", text).expect(text);
            assert_eq!(msg.get(1).and_then(Value::as_enum).map(|e| e.name()), Some("HIGH"));
        }
    }

    #[test]
    fn test_unknown_enum_value() {
        let registry = registry();
        let lenient = JsonSerializer::new(&registry);
        let msg = read(&lenient, "t.Reading", r#"{"level":"MEDIUM","value":1.5}"#).expect("lenient");
        assert!(!msg.has(1));
        assert_eq!(msg.get(2), Some(&Value::Double(1.5)));

        let strict = JsonSerializer::new(&registry).with_strict(true);
        let err = read(&strict, "t.Reading", r#"{"level":"MEDIUM"}"#).expect_err("strict");
        assert_eq!(err.path(), Some("level"));
        assert!(matches!(err.root(), CodecError::UnknownEnumValue { .. }));
    }

    #[test]
    fn test_unknown_fields() {
        let registry = registry();
        let lenient = JsonSerializer::named(&registry);
        let msg = read(
            &lenient,
            "t.Reading",
            r#"{"extra":{"nested":[1,{"x":null}]},"99":true,"ok":true}"#,
        )
        .expect("lenient");
        assert_eq!(msg.len(), 1);
        assert_eq!(msg.get(6), Some(&Value::Bool(true)));

        let strict = JsonSerializer::named(&registry).with_strict(true);
        let err = read(&strict, "t.Reading", r#"{"extra":1}"#).expect_err("strict");
        assert!(matches!(err, CodecError::UnknownField(_)), "{err}");
    }

    #[test]
    fn test_null_and_numeric_edges() {
        let registry = registry();
        let json = JsonSerializer::new(&registry);
        let msg = read(&json, "t.Reading", r#"{"value":null,"ok":1,"small":-128}"#).expect("read");
        assert!(!msg.has(2));
        assert_eq!(msg.get(6), Some(&Value::Bool(true)));
        assert_eq!(msg.get(3), Some(&Value::Byte(-128)));

        let err = read(&json, "t.Reading", r#"{"small":300}"#).expect_err("overflow");
        assert_eq!(err.path(), Some("small"));

        let err = read(&json, "t.Reading", r#"{"value":"fast"}"#).expect_err("not a double");
        assert!(matches!(err.root(), CodecError::TypeMismatch { .. }));
    }

    #[test]
    fn test_containers() {
        let registry = registry();
        let json = JsonSerializer::new(&registry);
        let msg = read(
            &json,
            "t.Reading",
            r#"{"tags":["a","b","a"],"weights":{"-3":0.25,"7":"NaN"}}"#,
        )
        .expect("read");
        assert_eq!(msg.get(4).map(Value::len), Some(2));
        let weights = msg.get(5).and_then(Value::as_map).expect("map");
        assert_eq!(weights[0], (Value::I64(-3), Value::Double(0.25)));
        assert!(weights[1].1.as_f64().is_some_and(f64::is_nan));

        let err = read(&json, "t.Reading", r#"{"weights":{"x":1}}"#).expect_err("bad key");
        assert_eq!(err.path(), Some("weights[x]"));
    }

    #[test]
    fn test_malformed_documents() {
        let registry = registry();
        let json = JsonSerializer::new(&registry);
        for text in ["", "{", r#"{"ok":true"#, r#"{"ok":true} x"#, r#"{"ok" true}"#, "{,}"] {
            let err = read(&json, "t.Reading", text).expect_err(text);
            assert!(matches!(err, CodecError::MalformedJson { .. }), "{text}: {err}");
        }
    }

    #[test]
    fn test_unknown_field_nesting_is_bounded() {
        let registry = registry();
        let json = JsonSerializer::new(&registry);
        let text = format!(r#"{{"x":{}"#, "[".repeat(500_000));
        let err = read(&json, "t.Reading", &text).expect_err("too deep");
        assert!(matches!(err.root(), CodecError::NestingTooDeep { max: 64 }), "{err}");
    }

    #[test]
    fn test_known_message_nesting_is_bounded() {
        let registry = registry();
        let json = JsonSerializer::named(&registry);

        let deep = format!("{}{}", r#"{"child":"#.repeat(10_000), "}".repeat(10_001));
        let err = read(&json, "t.Node", &deep).expect_err("too deep");
        assert!(matches!(err.root(), CodecError::NestingTooDeep { .. }), "{err}");

        let deep = format!("{}{}", r#"{"children":["#.repeat(10_000), "]}".repeat(10_000));
        let err = read(&json, "t.Node", &deep).expect_err("too deep");
        assert!(matches!(err.root(), CodecError::NestingTooDeep { .. }), "{err}");

        // each level adds one message
        let levels = crate::serializer::MAX_DEPTH;
        let ok = format!("{}{{}}{}", r#"{"child":"#.repeat(levels), "}".repeat(levels));
        let mut msg = read(&json, "t.Node", &ok).expect("at limit");
        for _ in 0..levels {
            msg = msg.get(1).and_then(Value::as_message).cloned().expect("child");
        }
        assert!(msg.is_empty());
    }
}
