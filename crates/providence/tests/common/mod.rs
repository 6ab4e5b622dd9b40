// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared schemas for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use providence::{
    Descriptor, EnumDef, EnumValue, FieldDescriptor, Message, MessageBuilder, RegistryBuilder,
    StructDef, TypeRegistry, Value,
};

/// Calculator schema (recursive through a union) plus container and
/// compactible test structs.
///
/// ```text
/// enum calculator.Operator { IDENTITY = 1, ADD = 2, SUBTRACT = 3, MULTIPLY = 4, DIVIDE = 5 }
/// struct calculator.Operation { 1: Operator operator, 2: list<Operand> operands }
/// union calculator.Operand { 1: Operation operation, 2: double number, 3: Imaginary imaginary }
/// struct calculator.Imaginary { 1: double v, 2: double i }
/// ```
pub fn registry() -> Arc<TypeRegistry> {
    let mut types = RegistryBuilder::new();

    let operator = types
        .enum_type(
            EnumDef::new("calculator", "Operator")
                .value(1, "IDENTITY")
                .value(2, "ADD")
                .value(3, "SUBTRACT")
                .value(4, "MULTIPLY")
                .value(5, "DIVIDE"),
        )
        .expect("operator");
    let operation = types.declare_struct("calculator", "Operation").expect("declare");
    let operand = types.declare_struct("calculator", "Operand").expect("declare");
    let imaginary = types
        .struct_type(
            StructDef::new("calculator", "Imaginary")
                .field(FieldDescriptor::new(1, "v", Descriptor::DOUBLE))
                .field(FieldDescriptor::new(2, "i", Descriptor::DOUBLE)),
        )
        .expect("imaginary");
    types
        .struct_type(
            StructDef::new("calculator", "Operation")
                .field(FieldDescriptor::new(1, "operator", Descriptor::Enum(operator.clone())))
                .field(FieldDescriptor::new(
                    2,
                    "operands",
                    Descriptor::list(Descriptor::Message(operand)),
                )),
        )
        .expect("operation");
    types
        .struct_type(
            StructDef::union("calculator", "Operand")
                .field(FieldDescriptor::new(1, "operation", Descriptor::Message(operation)))
                .field(FieldDescriptor::new(2, "number", Descriptor::DOUBLE))
                .field(FieldDescriptor::new(3, "imaginary", Descriptor::Message(imaginary.clone()))),
        )
        .expect("operand");

    types
        .struct_type(
            StructDef::new("test", "CompactFields")
                .field(FieldDescriptor::new(1, "name", Descriptor::STRING))
                .field(FieldDescriptor::new(2, "id", Descriptor::I32))
                .field(FieldDescriptor::new(3, "label", Descriptor::STRING))
                .compactible(),
        )
        .expect("compact fields");

    types
        .struct_type(
            StructDef::exception("test", "Failure")
                .field(FieldDescriptor::new(1, "message", Descriptor::STRING).required())
                .field(FieldDescriptor::new(2, "code", Descriptor::I32).with_default(500)),
        )
        .expect("failure");

    types
        .struct_type(
            StructDef::new("test", "Containers")
                .field(FieldDescriptor::new(1, "flag", Descriptor::BOOL))
                .field(FieldDescriptor::new(2, "small", Descriptor::BYTE))
                .field(FieldDescriptor::new(3, "short", Descriptor::I16))
                .field(FieldDescriptor::new(4, "int", Descriptor::I32))
                .field(FieldDescriptor::new(5, "long", Descriptor::I64))
                .field(FieldDescriptor::new(6, "real", Descriptor::DOUBLE))
                .field(FieldDescriptor::new(7, "text", Descriptor::STRING))
                .field(FieldDescriptor::new(8, "blob", Descriptor::BINARY))
                .field(FieldDescriptor::new(9, "marker", Descriptor::VOID))
                .field(FieldDescriptor::new(10, "op", Descriptor::Enum(operator.clone())))
                .field(FieldDescriptor::new(11, "numbers", Descriptor::list(Descriptor::I32)))
                .field(FieldDescriptor::new(12, "names", Descriptor::set(Descriptor::STRING)))
                .field(FieldDescriptor::new(
                    13,
                    "by_op",
                    Descriptor::map(Descriptor::Enum(operator), Descriptor::DOUBLE),
                ))
                .field(FieldDescriptor::new(
                    14,
                    "points",
                    Descriptor::map(Descriptor::Message(imaginary.clone()), Descriptor::STRING),
                ))
                .field(FieldDescriptor::new(
                    15,
                    "nested",
                    Descriptor::list(Descriptor::map(
                        Descriptor::I64,
                        Descriptor::set(Descriptor::Message(imaginary)),
                    )),
                ))
                .field(FieldDescriptor::new(
                    16,
                    "blobs",
                    Descriptor::map(Descriptor::BINARY, Descriptor::BOOL),
                )),
        )
        .expect("containers");

    types.build().expect("registry")
}

pub fn operator(registry: &TypeRegistry, name: &str) -> Value {
    let desc = registry.find_enum("calculator.Operator").expect("operator");
    Value::Enum(EnumValue::from_name(desc, name).expect("operator name"))
}

pub fn number(registry: &TypeRegistry, n: f64) -> Value {
    let mut b = MessageBuilder::new(registry.find_struct("calculator.Operand").expect("operand"));
    b.set(2, n).expect("number");
    Value::Message(b.build().expect("operand"))
}

pub fn imaginary(registry: &TypeRegistry, v: f64, i: f64) -> Message {
    let mut b = MessageBuilder::new(registry.find_struct("calculator.Imaginary").expect("imaginary"));
    b.set(1, v).expect("v").set(2, i).expect("i");
    b.build().expect("imaginary")
}

pub fn operation(registry: &TypeRegistry, op: &str, operands: Vec<Value>) -> Message {
    let mut b = MessageBuilder::new(registry.find_struct("calculator.Operation").expect("operation"));
    b.set(1, operator(registry, op))
        .expect("operator")
        .set(2, operands)
        .expect("operands");
    b.build().expect("operation")
}

pub fn nested_operand(registry: &TypeRegistry, operation: Message) -> Value {
    let mut b = MessageBuilder::new(registry.find_struct("calculator.Operand").expect("operand"));
    b.set(1, operation).expect("operation");
    Value::Message(b.build().expect("operand"))
}

/// `(4 - 1) * (2 + 3i)`, with the inner subtraction as a nested operation.
pub fn sample_calculation(registry: &TypeRegistry) -> Message {
    let subtract = operation(
        registry,
        "SUBTRACT",
        vec![number(registry, 4.0), number(registry, 1.0)],
    );
    let mut im = MessageBuilder::new(registry.find_struct("calculator.Operand").expect("operand"));
    im.set(3, imaginary(registry, 2.0, 3.0)).expect("imaginary");
    operation(
        registry,
        "MULTIPLY",
        vec![
            nested_operand(registry, subtract),
            Value::Message(im.build().expect("operand")),
        ],
    )
}

pub fn compact_fields(registry: &TypeRegistry, name: Option<&str>, id: Option<i32>, label: Option<&str>) -> Message {
    let mut b = MessageBuilder::new(registry.find_struct("test.CompactFields").expect("compact"));
    if let Some(name) = name {
        b.set(1, name).expect("name");
    }
    if let Some(id) = id {
        b.set(2, id).expect("id");
    }
    if let Some(label) = label {
        b.set(3, label).expect("label");
    }
    b.build().expect("compact")
}

/// A `test.Containers` instance with every field set.
pub fn full_containers(registry: &TypeRegistry) -> Message {
    let mut b = MessageBuilder::new(registry.find_struct("test.Containers").expect("containers"));
    b.set(1, true).expect("flag");
    b.set(2, -7i8).expect("small");
    b.set(3, 1234i16).expect("short");
    b.set(4, i32::MIN).expect("int");
    b.set(5, i64::MAX).expect("long");
    b.set(6, 1234567890.12345).expect("real");
    b.set(7, "tab\t\"quoted\" \u{1F980}").expect("text");
    b.set(8, vec![0u8, 255, 16, 32]).expect("blob");
    b.set(9, Value::Void).expect("marker");
    b.set(10, operator(registry, "DIVIDE")).expect("op");
    b.set(11, vec![Value::I32(3), Value::I32(-1), Value::I32(3)]).expect("numbers");
    b.set(12, Value::set_of([Value::from("b"), Value::from("a")])).expect("names");
    b.set(
        13,
        Value::map_of([
            (operator(registry, "ADD"), Value::Double(0.5)),
            (operator(registry, "SUBTRACT"), Value::Double(-1e-9)),
        ]),
    )
    .expect("by_op");
    b.set(
        14,
        Value::map_of([(Value::Message(imaginary(registry, 1.5, -2.0)), Value::from("p"))]),
    )
    .expect("points");
    b.set(
        15,
        vec![Value::map_of([(
            Value::I64(-1),
            Value::set_of([Value::Message(imaginary(registry, 0.0, 1.0))]),
        )])],
    )
    .expect("nested");
    b.set(
        16,
        Value::map_of([(Value::from(vec![1u8, 2]), Value::Bool(false))]),
    )
    .expect("blobs");
    b.build().expect("containers")
}
