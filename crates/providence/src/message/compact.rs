// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compactness analysis.
//!
//! An instance is compact when its present fields form a prefix of the
//! declaration order: once a field is absent, no later field may be present.
//! Only compact instances of compactible structs are written positionally.

use crate::descriptor::StructDescriptor;
use crate::message::Message;

/// Whether the message's present fields form a declaration-order prefix.
pub fn is_compact(message: &Message) -> bool {
    is_compact_with(message.descriptor(), |key| message.has(key))
}

/// Number of leading present fields (length of the positional form).
pub fn compact_len(message: &Message) -> usize {
    message
        .descriptor()
        .fields()
        .iter()
        .take_while(|f| message.has(f.key()))
        .count()
}

pub(crate) fn is_compact_with(descriptor: &StructDescriptor, has: impl Fn(u16) -> bool) -> bool {
    let mut missing = false;
    for field in descriptor.fields() {
        if has(field.key()) {
            if missing {
                return false;
            }
        } else {
            missing = true;
        }
    }
    true
}
