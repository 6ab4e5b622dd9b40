// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use providence::{
    Descriptor, EnumDef, FieldDescriptor, JsonSerializer, RegistryBuilder, Serializer, StructDef,
};

fuzz_target!(|data: &[u8]| {
    let mut types = RegistryBuilder::new();
    let color = types
        .enum_type(EnumDef::new("fuzz", "Color").value(1, "RED").value(2, "GREEN"))
        .expect("color");
    let pair = types
        .struct_type(
            StructDef::new("fuzz", "Pair")
                .field(FieldDescriptor::new(1, "a", Descriptor::I32))
                .field(FieldDescriptor::new(2, "b", Descriptor::STRING))
                .compactible(),
        )
        .expect("pair");
    types
        .struct_type(
            StructDef::new("fuzz", "Doc")
                .field(FieldDescriptor::new(1, "color", Descriptor::Enum(color)))
                .field(FieldDescriptor::new(2, "pairs", Descriptor::list(Descriptor::Message(pair.clone()))))
                .field(FieldDescriptor::new(
                    3,
                    "index",
                    Descriptor::map(Descriptor::Message(pair), Descriptor::DOUBLE),
                ))
                .field(FieldDescriptor::new(4, "blob", Descriptor::BINARY)),
        )
        .expect("doc");
    let registry = types.build().expect("registry");
    let desc = registry.find_struct("fuzz.Doc").expect("doc");

    let json = JsonSerializer::named(&registry);
    if let Ok(msg) = json.from_slice(data, desc) {
        let text = json.to_vec(&msg).expect("re-encode");
        assert_eq!(json.from_slice(&text, desc).expect("re-decode"), msg);
    }
});
