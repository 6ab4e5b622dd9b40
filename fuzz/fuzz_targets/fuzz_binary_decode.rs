// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use providence::{
    BinarySerializer, Descriptor, FieldDescriptor, RegistryBuilder, Serializer, StructDef,
};

fuzz_target!(|data: &[u8]| {
    let mut types = RegistryBuilder::new();
    let node = types.declare_struct("fuzz", "Node").expect("declare");
    types
        .struct_type(
            StructDef::new("fuzz", "Node")
                .field(FieldDescriptor::new(1, "name", Descriptor::STRING))
                .field(FieldDescriptor::new(2, "weight", Descriptor::DOUBLE))
                .field(FieldDescriptor::new(3, "children", Descriptor::list(Descriptor::Message(node))))
                .field(FieldDescriptor::new(
                    4,
                    "attrs",
                    Descriptor::map(Descriptor::I64, Descriptor::set(Descriptor::BINARY)),
                )),
        )
        .expect("node");
    let registry = types.build().expect("registry");
    let desc = registry.find_struct("fuzz.Node").expect("node");

    // Lenient and strict decoders must fail cleanly on arbitrary input.
    let lenient = BinarySerializer::new(&registry);
    if let Ok(msg) = lenient.from_slice(data, desc) {
        let bytes = lenient.to_vec(&msg).expect("re-encode");
        assert_eq!(lenient.from_slice(&bytes, desc).expect("re-decode"), msg);
    }
    let _ = BinarySerializer::strict(&registry).from_slice(data, desc);

    let thrift = BinarySerializer::thrift(&registry);
    if let Ok(msg) = thrift.from_slice(data, desc) {
        let bytes = thrift.to_vec(&msg).expect("re-encode");
        assert_eq!(thrift.from_slice(&bytes, desc).expect("re-decode"), msg);
    }
});
