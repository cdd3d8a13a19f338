// Copyright (c) IxMilia.  All Rights Reserved.  Licensed under the Apache License, Version 2.0.  See License.txt in the project root for license information.

use std::borrow::Cow;
use std::fmt;
use std::fmt::{Debug, Formatter};

use crate::Handle;

/// The data carried by a single code pair.  The wire distinguishes boolean/short/integer/long
/// widths by group-code band; those all collapse to `Integer` here and the band table supplies
/// the width again on write.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum CodePairValue {
    Integer(i64),
    Double(f64),
    Str(String),
    Handle(Handle),
    Binary(Vec<u8>),
}

impl CodePairValue {
    /// A short noun for diagnostics, e.g. "the field expected a double but got a string".
    pub fn kind_name(&self) -> &'static str {
        match self {
            CodePairValue::Integer(_) => "integer",
            CodePairValue::Double(_) => "double",
            CodePairValue::Str(_) => "string",
            CodePairValue::Handle(_) => "handle",
            CodePairValue::Binary(_) => "binary",
        }
    }
    pub fn un_escape_string(val: &str) -> Cow<'_, str> {
        if !val.contains("\\U+") {
            return Cow::Borrowed(val);
        }

        let mut result = String::with_capacity(val.len());
        let mut rest = val;
        while let Some(idx) = rest.find("\\U+") {
            result.push_str(&rest[..idx]);
            let escape = &rest[idx..];
            let parsed = escape
                .get(3..7)
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .and_then(std::char::from_u32);
            match parsed {
                Some(c) => {
                    result.push(c);
                    rest = &escape[7..];
                }
                None => {
                    // not a valid escape sequence, emit it verbatim
                    result.push_str("\\U+");
                    rest = &escape[3..];
                }
            }
        }

        result.push_str(rest);
        Cow::Owned(result)
    }
    pub fn escape_string(val: &str) -> Cow<'_, str> {
        if val.chars().all(|c| (c as u32) < 0x80) {
            return Cow::Borrowed(val);
        }

        let mut result = String::with_capacity(val.len());
        for c in val.chars() {
            let code_point = c as u32;
            if code_point < 0x80 {
                result.push(c);
            } else {
                result.push_str(&format!("\\U+{:04X}", code_point));
            }
        }

        Cow::Owned(result)
    }
}

impl Debug for CodePairValue {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            CodePairValue::Integer(i) => write!(formatter, "{}", i),
            CodePairValue::Double(d) => write!(formatter, "{}", format_f64(*d)),
            CodePairValue::Str(s) => write!(formatter, "{}", s),
            CodePairValue::Handle(h) => write!(formatter, "{}", h.as_string()),
            CodePairValue::Binary(data) => {
                for b in data {
                    write!(formatter, "{:02X}", b)?;
                }
                Ok(())
            }
        }
    }
}

/// Formats an `f64` value with up to 12 digits of precision, ensuring at least one trailing digit after the decimal.
pub(crate) fn format_f64(val: f64) -> String {
    // format with 12 digits of precision
    let mut val = format!("{:.12}", val);

    // trim trailing zeros
    while val.ends_with('0') {
        val.pop();
    }

    // ensure it doesn't end with a decimal
    if val.ends_with('.') {
        val.push('0');
    }

    val
}
