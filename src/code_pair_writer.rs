// Copyright (c) IxMilia.  All Rights Reserved.  Licensed under the Apache License, Version 2.0.  See License.txt in the project root for license information.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::code_pair_value::format_f64;
use crate::{CodePair, CodePairValue, DxfResult, ExpectedType};

/// Writes code pairs in either the text or the binary form of the format.  In text mode each
/// pair is exactly two CRLF-terminated lines; the code line is right-aligned to three columns
/// purely for readability.
pub struct CodePairWriter<T>
where
    T: Write,
{
    writer: T,
    as_ascii: bool,
    escape_unicode: bool,
}

impl<T: Write> CodePairWriter<T> {
    pub fn new_ascii_writer(writer: T) -> Self {
        CodePairWriter {
            writer,
            as_ascii: true,
            escape_unicode: true,
        }
    }
    pub fn new_binary_writer(writer: T) -> Self {
        CodePairWriter {
            writer,
            as_ascii: false,
            escape_unicode: false,
        }
    }
    /// Stops `\U+XXXX`-escaping string values; appropriate once the target version is R2007+
    /// and the output is UTF-8.
    pub fn write_as_utf8(&mut self) {
        self.escape_unicode = false;
    }
    pub fn write_prelude(&mut self) -> DxfResult<()> {
        if !self.as_ascii {
            self.writer.write_fmt(format_args!("AutoCAD Binary DXF\r\n"))?;
            self.writer.write_u8(0x1A)?;
            self.writer.write_u8(0x00)?;
        }

        Ok(())
    }
    pub fn write_code_pair(&mut self, pair: &CodePair) -> DxfResult<()> {
        if self.as_ascii {
            self.write_ascii_code_pair(pair)
        } else {
            self.write_binary_code_pair(pair)
        }
    }
    fn write_ascii_code_pair(&mut self, pair: &CodePair) -> DxfResult<()> {
        self.writer.write_fmt(format_args!("{: >3}\r\n", pair.code))?;
        match &pair.value {
            CodePairValue::Integer(i) => match ExpectedType::expected_type(pair.code) {
                Some(ExpectedType::Short) => self.writer.write_fmt(format_args!("{: >6}\r\n", i))?,
                Some(ExpectedType::Integer) => {
                    self.writer.write_fmt(format_args!("{: >9}\r\n", i))?
                }
                _ => self.writer.write_fmt(format_args!("{}\r\n", i))?,
            },
            CodePairValue::Double(d) => self
                .writer
                .write_fmt(format_args!("{}\r\n", format_f64(*d)))?,
            CodePairValue::Str(s) => {
                if self.escape_unicode {
                    self.writer
                        .write_fmt(format_args!("{}\r\n", CodePairValue::escape_string(s)))?
                } else {
                    self.writer.write_fmt(format_args!("{}\r\n", s))?
                }
            }
            CodePairValue::Handle(h) => self
                .writer
                .write_fmt(format_args!("{}\r\n", h.as_string()))?,
            CodePairValue::Binary(data) => {
                for b in data {
                    self.writer.write_fmt(format_args!("{:02X}", b))?;
                }
                self.writer.write_fmt(format_args!("\r\n"))?;
            }
        }
        Ok(())
    }
    fn write_binary_code_pair(&mut self, pair: &CodePair) -> DxfResult<()> {
        // write code
        if pair.code >= 255 {
            self.writer.write_u8(255)?;
            self.writer.write_i16::<LittleEndian>(pair.code as i16)?;
        } else {
            self.writer.write_u8(pair.code as u8)?;
        }

        // write value; integer widths come from the code's band
        match &pair.value {
            CodePairValue::Integer(i) => match ExpectedType::expected_type(pair.code) {
                Some(ExpectedType::Integer) => self.writer.write_i32::<LittleEndian>(*i as i32)?,
                Some(ExpectedType::Long) => self.writer.write_i64::<LittleEndian>(*i)?,
                _ => self.writer.write_i16::<LittleEndian>(*i as i16)?,
            },
            CodePairValue::Double(d) => self.writer.write_f64::<LittleEndian>(*d)?,
            CodePairValue::Str(s) => {
                for &b in CodePairValue::escape_string(s).as_bytes() {
                    self.writer.write_u8(b)?;
                }

                self.writer.write_u8(0)?;
            }
            CodePairValue::Handle(h) => {
                for &b in h.as_string().as_bytes() {
                    self.writer.write_u8(b)?;
                }

                self.writer.write_u8(0)?;
            }
            CodePairValue::Binary(data) => {
                self.writer.write_u8(data.len() as u8)?;
                for &b in data {
                    self.writer.write_u8(b)?;
                }
            }
        }

        Ok(())
    }
}
