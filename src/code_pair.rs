// Copyright (c) IxMilia.  All Rights Reserved.  Licensed under the Apache License, Version 2.0.  See License.txt in the project root for license information.

use std::fmt;
use std::fmt::{Debug, Formatter};

use crate::{CodePairValue, DxfError, DxfResult, Handle};

/// The basic primitive of a DXF file; a code indicating the type of the data contained, and the
/// data itself.  `offset` is the line number the pair was read from and only participates in
/// diagnostics, never in equality.
#[derive(Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CodePair {
    pub code: i32,
    pub value: CodePairValue,
    pub offset: usize,
}

impl CodePair {
    pub fn new(code: i32, val: CodePairValue, offset: usize) -> Self {
        CodePair {
            code,
            value: val,
            offset,
        }
    }
    pub fn new_str(code: i32, val: &str) -> Self {
        CodePair::new(code, CodePairValue::Str(val.to_string()), 0)
    }
    pub fn new_string(code: i32, val: &str) -> Self {
        CodePair::new(code, CodePairValue::Str(String::from(val)), 0)
    }
    pub fn new_f64(code: i32, val: f64) -> Self {
        CodePair::new(code, CodePairValue::Double(val), 0)
    }
    pub fn new_i64(code: i32, val: i64) -> Self {
        CodePair::new(code, CodePairValue::Integer(val), 0)
    }
    pub fn new_handle(code: i32, val: Handle) -> Self {
        CodePair::new(code, CodePairValue::Handle(val), 0)
    }
    pub fn new_binary(code: i32, val: Vec<u8>) -> Self {
        CodePair::new(code, CodePairValue::Binary(val), 0)
    }
    pub fn assert_i64(&self) -> DxfResult<i64> {
        match self.value {
            CodePairValue::Integer(i) => Ok(i),
            _ => Err(DxfError::WrongValueType(self.offset)),
        }
    }
    pub fn assert_f64(&self) -> DxfResult<f64> {
        match self.value {
            CodePairValue::Double(f) => Ok(f),
            _ => Err(DxfError::WrongValueType(self.offset)),
        }
    }
    pub fn assert_string(&self) -> DxfResult<String> {
        match self.value {
            CodePairValue::Str(ref s) => Ok(s.clone()),
            _ => Err(DxfError::WrongValueType(self.offset)),
        }
    }
    pub fn assert_binary(&self) -> DxfResult<Vec<u8>> {
        match self.value {
            CodePairValue::Binary(ref data) => Ok(data.clone()),
            _ => Err(DxfError::WrongValueType(self.offset)),
        }
    }
    /// Returns the pair's value as a `Handle`.  String values (e.g. the group 5 id, which lies
    /// in the string band) are parsed as hex.
    pub fn as_handle(&self) -> DxfResult<Handle> {
        match self.value {
            CodePairValue::Handle(h) => Ok(h),
            CodePairValue::Str(ref s) => {
                Handle::from_string(s).ok_or(DxfError::ParseError(self.offset))
            }
            _ => Err(DxfError::WrongValueType(self.offset)),
        }
    }
}

impl Debug for CodePair {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}/{:?}", self.code, &self.value)
    }
}

impl PartialEq for CodePair {
    fn eq(&self, other: &CodePair) -> bool {
        // not comparing offsets
        self.code == other.code && self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use crate::{CodePair, Handle};

    #[test]
    fn as_handle() {
        assert_eq!(Handle(0x00), CodePair::new_str(5, "0").as_handle().unwrap());
        assert_eq!(Handle(0x01), CodePair::new_str(5, "1").as_handle().unwrap());
        assert_eq!(
            Handle(0xABCD),
            CodePair::new_str(5, "ABCD").as_handle().unwrap()
        );
        assert_eq!(
            Handle(0x1A),
            CodePair::new_handle(330, Handle(0x1A)).as_handle().unwrap()
        );
    }

    #[test]
    fn equality_ignores_offset() {
        let a = CodePair::new(40, crate::CodePairValue::Double(1.0), 3);
        let b = CodePair::new(40, crate::CodePairValue::Double(1.0), 17);
        assert_eq!(a, b);
    }
}
