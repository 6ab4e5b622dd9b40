// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Streaming JSON writer.
//!
//! A stack of `(mode, expectation)` levels keeps keys and values in order:
//! inside an object a key must precede every value, inside an array only
//! values are accepted. Pretty output breaks the line before every key and
//! array element.

use std::io::{self, Write};

use crate::error::{CodecError, Result};
use crate::serializer::json::JsonFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    List,
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Key,
    Value,
}

#[derive(Debug)]
struct Level {
    mode: Mode,
    expect: Expect,
    first: bool,
}

pub(crate) struct JsonWriter<'a> {
    out: &'a mut dyn Write,
    stack: Vec<Level>,
    pretty: Option<&'a JsonFormat>,
}

impl<'a> JsonWriter<'a> {
    pub(crate) fn new(out: &'a mut dyn Write, pretty: Option<&'a JsonFormat>) -> Self {
        Self {
            out,
            stack: Vec::new(),
            pretty,
        }
    }

    pub(crate) fn begin_object(&mut self) -> Result<()> {
        self.before_value()?;
        self.out.write_all(b"{")?;
        self.stack.push(Level {
            mode: Mode::Map,
            expect: Expect::Key,
            first: true,
        });
        Ok(())
    }

    pub(crate) fn end_object(&mut self) -> Result<()> {
        self.close(Mode::Map, b"}")
    }

    pub(crate) fn begin_array(&mut self) -> Result<()> {
        self.before_value()?;
        self.out.write_all(b"[")?;
        self.stack.push(Level {
            mode: Mode::List,
            expect: Expect::Value,
            first: true,
        });
        Ok(())
    }

    pub(crate) fn end_array(&mut self) -> Result<()> {
        self.close(Mode::List, b"]")
    }

    pub(crate) fn key(&mut self, key: &str) -> Result<()> {
        let first = match self.stack.last_mut() {
            Some(level) if level.mode == Mode::Map && level.expect == Expect::Key => {
                level.expect = Expect::Value;
                std::mem::replace(&mut level.first, false)
            }
            _ => return Err(state_error("object key outside of an object")),
        };
        if !first {
            self.separator()?;
        }
        self.line_break(self.stack.len())?;
        write_string(self.out, key)?;
        self.out.write_all(b":")?;
        if let Some(format) = self.pretty {
            self.out.write_all(format.space.as_bytes())?;
        }
        Ok(())
    }

    pub(crate) fn bool(&mut self, value: bool) -> Result<()> {
        self.raw(if value { "true" } else { "false" })
    }

    pub(crate) fn integer(&mut self, value: i64) -> Result<()> {
        self.raw(&value.to_string())
    }

    /// Write a pre-formatted JSON number or literal.
    pub(crate) fn raw(&mut self, text: &str) -> Result<()> {
        self.before_value()?;
        self.out.write_all(text.as_bytes())?;
        self.after_value();
        Ok(())
    }

    pub(crate) fn string(&mut self, value: &str) -> Result<()> {
        self.before_value()?;
        write_string(self.out, value)?;
        self.after_value();
        Ok(())
    }

    fn before_value(&mut self) -> Result<()> {
        let depth = self.stack.len();
        match self.stack.last_mut() {
            None => Ok(()),
            Some(level) if level.mode == Mode::Map => {
                if level.expect == Expect::Value {
                    Ok(())
                } else {
                    Err(state_error("object value without a key"))
                }
            }
            Some(level) => {
                let first = std::mem::replace(&mut level.first, false);
                if !first {
                    self.separator()?;
                }
                self.line_break(depth)
            }
        }
    }

    fn after_value(&mut self) {
        if let Some(level) = self.stack.last_mut() {
            if level.mode == Mode::Map {
                level.expect = Expect::Key;
            }
        }
    }

    fn close(&mut self, mode: Mode, token: &[u8]) -> Result<()> {
        let first = match self.stack.last() {
            Some(level)
                if level.mode == mode && (mode == Mode::List || level.expect == Expect::Key) =>
            {
                level.first
            }
            _ => return Err(state_error("unbalanced close")),
        };
        self.stack.pop();
        if !first {
            self.line_break(self.stack.len())?;
        }
        self.out.write_all(token)?;
        self.after_value();
        Ok(())
    }

    fn separator(&mut self) -> Result<()> {
        let separator = self.pretty.map_or(",", |format| format.separator.as_str());
        self.out.write_all(separator.as_bytes())?;
        Ok(())
    }

    fn line_break(&mut self, depth: usize) -> Result<()> {
        if let Some(format) = self.pretty {
            self.out.write_all(format.newline.as_bytes())?;
            for _ in 0..depth {
                self.out.write_all(format.indent.as_bytes())?;
            }
        }
        Ok(())
    }
}

fn write_string(out: &mut dyn Write, value: &str) -> Result<()> {
    serde_json::to_writer(out, value).map_err(|e| CodecError::Io(e.into()))
}

fn state_error(message: &str) -> CodecError {
    CodecError::Io(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("json writer: {message}"),
    ))
}
