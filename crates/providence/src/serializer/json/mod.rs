// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON serializer.
//!
//! Three output flavours share one reader:
//!
//! | Constructor | Object keys | Enums | Layout |
//! |-------------|-------------|-------|--------|
//! | [`JsonSerializer::new`] | field ids | numbers | single line |
//! | [`JsonSerializer::named`] | field names | names | single line |
//! | [`JsonSerializer::pretty`] | field names | names | indented |
//!
//! Compactible structs whose present fields form a declaration-order prefix
//! are written as arrays (`["my_category",44]`). Binary values are base64
//! strings, map keys are the string form of the key value.
//!
//! The reader accepts all three flavours: object keys may be field names or
//! field ids, enums may be names or numbers, and arrays are read
//! positionally for compactible structs.

pub mod number;
mod reader;
mod tokenizer;
mod writer;

use std::io::{Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::descriptor::{Descriptor, StructDescriptor, TypeRegistry};
use crate::error::{CodecError, PathSegment, Result};
use crate::message::{Message, Value};
use crate::serializer::{key_segment, CountingWriter, Serializer};

use self::number::format_double;
use self::writer::JsonWriter;

fn default_indent() -> String {
    "    ".to_string()
}

fn default_newline() -> String {
    "\n".to_string()
}

fn default_separator() -> String {
    ",".to_string()
}

fn default_space() -> String {
    " ".to_string()
}

/// Whitespace used by pretty output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFormat {
    /// One indentation level.
    #[serde(default = "default_indent")]
    pub indent: String,
    #[serde(default = "default_newline")]
    pub newline: String,
    /// Written between entries: `,` optionally followed by whitespace.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Written after every `:`.
    #[serde(default = "default_space")]
    pub space: String,
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            newline: default_newline(),
            separator: default_separator(),
            space: default_space(),
        }
    }
}

impl JsonFormat {
    /// Every part must be JSON whitespace, apart from the separator's
    /// leading `,`, or the output would not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("indent", &self.indent),
            ("newline", &self.newline),
            ("space", &self.space),
        ] {
            if !is_whitespace(value) {
                return Err(ConfigError::Invalid(format!(
                    "json.{name} must only contain whitespace, got {value:?}"
                )));
            }
        }
        match self.separator.strip_prefix(',') {
            Some(rest) if is_whitespace(rest) => Ok(()),
            _ => Err(ConfigError::Invalid(format!(
                "json.separator must be ',' followed by optional whitespace, got {:?}",
                self.separator
            ))),
        }
    }
}

fn is_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

/// JSON serializer.
#[derive(Debug, Clone)]
pub struct JsonSerializer {
    registry: Arc<TypeRegistry>,
    strict: bool,
    named: bool,
    pretty: bool,
    format: JsonFormat,
}

impl JsonSerializer {
    /// Providence JSON: field ids and enum numbers.
    pub const MIME_TYPE: &'static str = "application/vnd.morimekta.providence.json";
    /// Plain JSON: field and enum names.
    pub const JSON_MIME_TYPE: &'static str = "application/json";
    pub const PRETTY_MIME_TYPE: &'static str = "text/plain";

    /// Id-keyed serializer.
    pub fn new(registry: &Arc<TypeRegistry>) -> Self {
        Self {
            registry: Arc::clone(registry),
            strict: false,
            named: false,
            pretty: false,
            format: JsonFormat::default(),
        }
    }

    /// Name-keyed serializer.
    pub fn named(registry: &Arc<TypeRegistry>) -> Self {
        Self {
            named: true,
            ..Self::new(registry)
        }
    }

    /// Name-keyed, multi-line serializer.
    pub fn pretty(registry: &Arc<TypeRegistry>) -> Self {
        Self {
            named: true,
            pretty: true,
            ..Self::new(registry)
        }
    }

    /// Fail on unknown fields and enum values instead of skipping them.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_named(&self) -> bool {
        self.named
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    // ------------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------------

    fn write_message(&self, w: &mut JsonWriter<'_>, message: &Message) -> Result<()> {
        let desc = message.descriptor();
        if desc.is_compactible() && message.is_compact() {
            w.begin_array()?;
            for (field, value) in message.present_fields() {
                self.write_value(w, field.descriptor(), value)
                    .map_err(|e| e.in_field(PathSegment::Field(field.name())))?;
            }
            return w.end_array();
        }

        w.begin_object()?;
        for (field, value) in message.present_fields() {
            if self.named {
                w.key(field.name())?;
            } else {
                w.key(&field.key().to_string())?;
            }
            self.write_value(w, field.descriptor(), value)
                .map_err(|e| e.in_field(PathSegment::Field(field.name())))?;
        }
        w.end_object()
    }

    fn write_value(&self, w: &mut JsonWriter<'_>, descriptor: &Descriptor, value: &Value) -> Result<()> {
        match value {
            Value::Void => w.bool(true),
            Value::Bool(b) => w.bool(*b),
            Value::Byte(v) => w.integer(i64::from(*v)),
            Value::I16(v) => w.integer(i64::from(*v)),
            Value::I32(v) => w.integer(i64::from(*v)),
            Value::I64(v) => w.integer(*v),
            Value::Double(d) if d.is_finite() => w.raw(&format_double(*d)),
            Value::Double(d) => w.string(&format_double(*d)),
            Value::String(s) => w.string(s),
            Value::Binary(b) => w.string(&b.to_base64()),
            Value::Enum(e) if self.named => w.string(e.name()),
            Value::Enum(e) => w.integer(i64::from(e.value())),
            Value::Message(m) => self.write_message(w, m),
            Value::List(items) | Value::Set(items) => {
                let item = descriptor
                    .item()
                    .ok_or_else(|| CodecError::mismatch(descriptor, value.tag()))?;
                w.begin_array()?;
                for (i, v) in items.iter().enumerate() {
                    self.write_value(w, item, v)
                        .map_err(|e| e.in_field(PathSegment::Index(i)))?;
                }
                w.end_array()
            }
            Value::Map(entries) => {
                let Descriptor::Map(key, item) = descriptor else {
                    return Err(CodecError::mismatch(descriptor, value.tag()));
                };
                w.begin_object()?;
                for (k, v) in entries {
                    let text = self.map_key(key, k).map_err(|e| e.in_field(key_segment(k)))?;
                    w.key(&text)?;
                    self.write_value(w, item, v)
                        .map_err(|e| e.in_field(key_segment(k)))?;
                }
                w.end_object()
            }
        }
    }

    /// String form of a map key. Simple structs become their JSON text.
    fn map_key(&self, descriptor: &Descriptor, key: &Value) -> Result<String> {
        Ok(match key {
            Value::Bool(b) => b.to_string(),
            Value::Byte(v) => v.to_string(),
            Value::I16(v) => v.to_string(),
            Value::I32(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::Double(d) => format_double(*d),
            Value::String(s) => s.clone(),
            Value::Binary(b) => b.to_base64(),
            Value::Enum(e) if self.named => e.name().to_string(),
            Value::Enum(e) => e.value().to_string(),
            Value::Message(m) if m.descriptor().is_simple() => {
                let mut out = Vec::new();
                self.write_message(&mut JsonWriter::new(&mut out, None), m)?;
                String::from_utf8(out).map_err(|_| CodecError::mismatch("utf-8", "invalid utf-8"))?
            }
            other => {
                return Err(CodecError::mismatch(
                    format!("primitive, enum or simple struct map key ({descriptor})"),
                    other.tag(),
                ))
            }
        })
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, output: &mut dyn Write, message: &Message) -> Result<usize> {
        let mut out = CountingWriter::new(output);
        let format = self.pretty.then_some(&self.format);
        self.write_message(&mut JsonWriter::new(&mut out, format), message)?;
        log::trace!(
            "[json] wrote {} ({} bytes)",
            message.descriptor().qualified_name(),
            out.count()
        );
        Ok(out.count())
    }

    /// Reads the input to its end; exactly one message must be present.
    fn deserialize(
        &self,
        input: &mut dyn Read,
        descriptor: &Arc<StructDescriptor>,
    ) -> Result<Message> {
        let mut text = String::new();
        input.read_to_string(&mut text).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => CodecError::MalformedJson {
                line: 1,
                column: 1,
                snippet: String::new(),
                message: "input is not valid UTF-8".to_string(),
            },
            _ => CodecError::from(e),
        })?;
        self.read_document(&text, descriptor, 0)
    }

    fn mime_type(&self) -> &'static str {
        if self.pretty {
            Self::PRETTY_MIME_TYPE
        } else if self.named {
            Self::JSON_MIME_TYPE
        } else {
            Self::MIME_TYPE
        }
    }

    fn binary_protocol(&self) -> bool {
        false
    }
}
