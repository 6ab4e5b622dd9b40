// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::descriptor::Descriptor;
use crate::message::Value;

/// Field descriptor for struct members.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    key: u16,
    name: String,
    required: bool,
    descriptor: Descriptor,
    default: Option<Value>,
}

impl FieldDescriptor {
    /// Create an optional field. `key` must be at least 1.
    pub fn new(key: u16, name: impl Into<String>, descriptor: Descriptor) -> Self {
        Self {
            key,
            name: name.into(),
            required: false,
            descriptor,
            default: None,
        }
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set an explicit default value; sets and maps are normalized.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into().normalized());
        self
    }

    pub fn key(&self) -> u16 {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Explicit default value, if declared.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Explicit default, falling back to the type's implicit default.
    pub fn effective_default(&self) -> Option<Value> {
        self.default
            .clone()
            .or_else(|| self.descriptor.default_value())
    }
}
