// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Round-trip tests across every format, driven by random messages.

mod common;

use std::io::Write;
use std::sync::Arc;

use providence::testing::MessageGenerator;
use providence::{
    Format, Message, MessageReader, MessageWriter, Serializer, SerializerConfig,
    SerializerProvider,
};

const TYPES: [&str; 6] = [
    "calculator.Operation",
    "calculator.Operand",
    "calculator.Imaginary",
    "test.CompactFields",
    "test.Failure",
    "test.Containers",
];

#[test]
fn test_random_messages_all_formats() {
    let registry = common::registry();
    let provider = SerializerProvider::new(&registry);
    let mut generator = MessageGenerator::with_seed(&registry, 0x5eed);

    for name in TYPES {
        let desc = registry.find_struct(name).expect("struct");
        for _ in 0..40 {
            let msg = generator.generate(desc);
            for format in Format::ALL {
                let serializer = provider.for_format(format).expect("format");
                let bytes = serializer.to_vec(&msg).expect("encode");
                let decoded = serializer.from_slice(&bytes, desc).unwrap_or_else(|e| {
                    panic!(
                        "{format} failed to decode {msg}: {e}\n{}",
                        String::from_utf8_lossy(&bytes)
                    )
                });
                assert_eq!(decoded, msg, "{format}");
            }
        }
    }
}

#[test]
fn test_strict_serializers_accept_own_output() {
    let registry = common::registry();
    let config = SerializerConfig {
        strict: true,
        ..SerializerConfig::default()
    };
    let provider = SerializerProvider::with_config(&registry, &config);
    let mut generator = MessageGenerator::with_seed(&registry, 17).fill_rate(1.0);
    let desc = registry.find_struct("test.Containers").expect("containers");

    for _ in 0..20 {
        let msg = generator.generate(desc);
        for format in Format::ALL {
            let serializer = provider.for_format(format).expect("format");
            let bytes = serializer.to_vec(&msg).expect("encode");
            assert_eq!(serializer.from_slice(&bytes, desc).expect("decode"), msg);
        }
    }
}

#[test]
fn test_mutate_build_is_identity() {
    let registry = common::registry();
    let mut generator = MessageGenerator::with_seed(&registry, 3);
    for name in TYPES {
        let desc = registry.find_struct(name).expect("struct");
        for _ in 0..10 {
            let msg = generator.generate(desc);
            assert_eq!(msg.mutate().build().expect("rebuild"), msg);
        }
    }
}

#[test]
fn test_streams_of_random_messages() {
    let registry = common::registry();
    let provider = SerializerProvider::new(&registry);
    let mut generator = MessageGenerator::with_seed(&registry, 99);
    let desc = registry.find_struct("calculator.Operation").expect("operation");
    let messages: Vec<Message> = (0..25).map(|_| generator.generate(desc)).collect();

    for format in [Format::Binary, Format::Json, Format::NamedJson, Format::ThriftBinary] {
        let serializer = Arc::clone(provider.for_format(format).expect("format"));
        let mut writer = MessageWriter::new(Vec::new(), Arc::clone(&serializer));
        for m in &messages {
            writer.write(m).expect("write");
        }
        writer.flush().expect("flush");
        let bytes = writer.into_inner();

        let read = MessageReader::new(bytes.as_slice(), serializer, desc)
            .collect::<providence::Result<Vec<_>>>()
            .expect("read");
        assert_eq!(read, messages, "{format}");
    }
}

#[test]
fn test_provider_from_config_file() {
    let registry = common::registry();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "format = \"named-json\"\nstrict = true\n\n[json]\nindent = \"  \"\n"
    )
    .expect("write");
    let config = SerializerConfig::from_file(file.path()).expect("config");
    let provider = SerializerProvider::with_config(&registry, &config);

    let default = provider.default_serializer().expect("default");
    assert_eq!(default.mime_type(), "application/json");

    let msg = common::compact_fields(&registry, Some("a"), None, None);
    let pretty = provider.for_format(Format::PrettyJson).expect("pretty");
    assert_eq!(pretty.to_vec(&msg).expect("encode"), b"[\n  \"a\"\n]");

    let desc = registry.find_struct("test.CompactFields").expect("compact");
    assert!(default.from_slice(br#"{"name":"a","nick":"b"}"#, desc).is_err());
}
