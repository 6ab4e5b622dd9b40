// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message streams.
//!
//! Several messages of one type written back to back on a single byte
//! stream. Binary messages are self-delimiting (each ends with a stop tag);
//! text messages are separated by a newline and read one line at a time, so
//! pretty JSON, which spans lines, can be written but not read back.

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::descriptor::StructDescriptor;
use crate::error::Result;
use crate::message::Message;
use crate::serializer::Serializer;

/// Writes messages followed by a separator.
pub struct MessageWriter<W: Write> {
    out: W,
    serializer: Arc<dyn Serializer>,
    separator: Vec<u8>,
    bytes_written: usize,
}

impl<W: Write> MessageWriter<W> {
    /// Separator defaults to nothing for binary serializers and `\n` for text.
    pub fn new(out: W, serializer: Arc<dyn Serializer>) -> Self {
        let separator = if serializer.binary_protocol() {
            Vec::new()
        } else {
            b"\n".to_vec()
        };
        Self {
            out,
            serializer,
            separator,
            bytes_written: 0,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<Vec<u8>>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Write one message and its separator, returning the bytes written.
    pub fn write(&mut self, message: &Message) -> Result<usize> {
        let mut n = self.serializer.serialize(&mut self.out, message)?;
        self.out.write_all(&self.separator)?;
        n += self.separator.len();
        self.bytes_written += n;
        Ok(n)
    }

    /// Total bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Reads successive messages of one type until end of input.
pub struct MessageReader<R: BufRead> {
    input: R,
    serializer: Arc<dyn Serializer>,
    descriptor: Arc<StructDescriptor>,
    line: String,
}

impl<R: BufRead> MessageReader<R> {
    pub fn new(
        input: R,
        serializer: Arc<dyn Serializer>,
        descriptor: &Arc<StructDescriptor>,
    ) -> Self {
        Self {
            input,
            serializer,
            descriptor: Arc::clone(descriptor),
            line: String::new(),
        }
    }

    /// Next message, or `None` at a clean end of input.
    pub fn read(&mut self) -> Result<Option<Message>> {
        if self.serializer.binary_protocol() {
            if self.input.fill_buf()?.is_empty() {
                return Ok(None);
            }
            return self
                .serializer
                .deserialize(&mut self.input, &self.descriptor)
                .map(Some);
        }

        loop {
            self.line.clear();
            if self.input.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            return self
                .serializer
                .from_slice(text.as_bytes(), &self.descriptor)
                .map(Some);
        }
    }

    pub fn into_inner(self) -> R {
        self.input
    }
}

impl<R: BufRead> Iterator for MessageReader<R> {
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, FieldDescriptor, RegistryBuilder, StructDef, TypeRegistry};
    use crate::error::CodecError;
    use crate::message::MessageBuilder;
    use crate::serializer::{BinarySerializer, JsonSerializer};

    fn registry() -> Arc<TypeRegistry> {
        let mut builder = RegistryBuilder::new();
        builder
            .struct_type(
                StructDef::new("t", "Event")
                    .field(FieldDescriptor::new(1, "seq", Descriptor::I64))
                    .field(FieldDescriptor::new(2, "text", Descriptor::STRING)),
            )
            .expect("event");
        builder.build().expect("registry")
    }

    fn events(registry: &TypeRegistry) -> Vec<Message> {
        let desc = registry.find_struct("t.Event").expect("event");
        (0..3i64)
            .map(|seq| {
                let mut b = MessageBuilder::new(desc);
                b.set(1, seq).expect("seq").set(2, "line\nbreak").expect("text");
                b.build().expect("event")
            })
            .collect()
    }

    fn roundtrip(registry: &Arc<TypeRegistry>, serializer: Arc<dyn Serializer>) {
        let messages = events(registry);
        let mut writer = MessageWriter::new(Vec::new(), Arc::clone(&serializer));
        let mut total = 0;
        for m in &messages {
            total += writer.write(m).expect("write");
        }
        assert_eq!(writer.bytes_written(), total);
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), total);

        let desc = registry.find_struct("t.Event").expect("event");
        let read: Vec<Message> = MessageReader::new(bytes.as_slice(), serializer, desc)
            .collect::<Result<_>>()
            .expect("read");
        assert_eq!(read, messages);
    }

    #[test]
    fn test_binary_stream() {
        let registry = registry();
        roundtrip(&registry, Arc::new(BinarySerializer::new(&registry)));
    }

    #[test]
    fn test_json_stream() {
        let registry = registry();
        roundtrip(&registry, Arc::new(JsonSerializer::new(&registry)));
        roundtrip(&registry, Arc::new(JsonSerializer::named(&registry)));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let registry = registry();
        let desc = registry.find_struct("t.Event").expect("event");
        let input = b"\n{\"1\":1}\n\n   \n{\"seq\":2}\n".as_slice();
        let serializer: Arc<dyn Serializer> = Arc::new(JsonSerializer::new(&registry));
        let read: Vec<Message> = MessageReader::new(input, serializer, desc)
            .collect::<Result<_>>()
            .expect("read");
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].get(1).and_then(crate::message::Value::as_i64), Some(2));
    }

    #[test]
    fn test_truncated_binary_stream() {
        let registry = registry();
        let serializer: Arc<dyn Serializer> = Arc::new(BinarySerializer::new(&registry));
        let mut bytes = serializer.to_vec(&events(&registry)[0]).expect("encode");
        bytes.pop();
        let desc = registry.find_struct("t.Event").expect("event");
        let mut reader = MessageReader::new(bytes.as_slice(), serializer, desc);
        assert!(matches!(reader.read(), Err(CodecError::TruncatedInput)));
    }
}
