// Copyright (c) IxMilia.  All Rights Reserved.  Licensed under the Apache License, Version 2.0.  See License.txt in the project root for license information.

use crate::{CodePair, CodePairValue, DxfError, DxfResult, Handle};

/// The wire type of a group code, determined entirely by the code's band.  The mapping is
/// total over the known bands and independent of the file's declared version.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExpectedType {
    Boolean,
    Integer,
    Long,
    Short,
    Double,
    Str,
    Handle,
    Binary,
}

impl ExpectedType {
    /// Returns the `ExpectedType` for the given group code, or `None` if the code lies outside
    /// every known band.  An unknown code is a recoverable condition; the decoder skips the
    /// single tag and warns.
    pub fn expected_type(code: i32) -> Option<ExpectedType> {
        match code {
            0..=9 => Some(ExpectedType::Str),
            10..=39 => Some(ExpectedType::Double),
            40..=59 => Some(ExpectedType::Double),
            60..=79 => Some(ExpectedType::Short),
            90..=99 => Some(ExpectedType::Integer),
            100..=102 => Some(ExpectedType::Str),
            105 => Some(ExpectedType::Handle),
            110..=149 => Some(ExpectedType::Double),
            160..=169 => Some(ExpectedType::Long),
            170..=179 => Some(ExpectedType::Short),
            210..=239 => Some(ExpectedType::Double),
            270..=289 => Some(ExpectedType::Short),
            290..=299 => Some(ExpectedType::Boolean),
            300..=309 => Some(ExpectedType::Str),
            310..=319 => Some(ExpectedType::Binary),
            320..=369 => Some(ExpectedType::Handle),
            370..=389 => Some(ExpectedType::Short),
            390..=399 => Some(ExpectedType::Str),
            400..=409 => Some(ExpectedType::Short),
            410..=419 => Some(ExpectedType::Str),
            420..=429 => Some(ExpectedType::Integer),
            430..=439 => Some(ExpectedType::Str),
            440..=449 => Some(ExpectedType::Integer),
            450..=459 => Some(ExpectedType::Long),
            460..=469 => Some(ExpectedType::Double),
            470..=479 => Some(ExpectedType::Str),
            480..=481 => Some(ExpectedType::Handle),
            999 => Some(ExpectedType::Str),
            1000..=1009 => Some(ExpectedType::Str),
            1010..=1059 => Some(ExpectedType::Double),
            1060..=1070 => Some(ExpectedType::Short),
            1071 => Some(ExpectedType::Integer),
            _ => None,
        }
    }
    /// Whether values of this wire type are stored as `CodePairValue::Integer`.
    pub fn is_integer_kind(self) -> bool {
        matches!(
            self,
            ExpectedType::Boolean | ExpectedType::Integer | ExpectedType::Long | ExpectedType::Short
        )
    }
    /// Coerces a band-typed pair to this schema-declared type.  Most fields match their band
    /// exactly; the interesting cases are handle fields living in the string band (e.g. the
    /// group 5 id) and integer promotion into double fields.
    pub fn coerce(self, pair: &CodePair) -> DxfResult<CodePairValue> {
        match (&pair.value, self) {
            (CodePairValue::Integer(i), t) if t.is_integer_kind() => {
                Ok(CodePairValue::Integer(*i))
            }
            (CodePairValue::Integer(i), ExpectedType::Double) => {
                Ok(CodePairValue::Double(*i as f64))
            }
            (CodePairValue::Double(d), ExpectedType::Double) => Ok(CodePairValue::Double(*d)),
            (CodePairValue::Str(s), ExpectedType::Str) => Ok(CodePairValue::Str(s.clone())),
            (CodePairValue::Str(s), ExpectedType::Handle) => match Handle::from_string(s) {
                Some(h) => Ok(CodePairValue::Handle(h)),
                None => Err(DxfError::ParseError(pair.offset)),
            },
            (CodePairValue::Handle(h), ExpectedType::Handle) => Ok(CodePairValue::Handle(*h)),
            (CodePairValue::Binary(data), ExpectedType::Binary) => {
                Ok(CodePairValue::Binary(data.clone()))
            }
            _ => Err(DxfError::WrongValueType(pair.offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{CodePair, CodePairValue, ExpectedType, Handle};

    #[test]
    fn classification_is_total_over_known_bands() {
        // every code in the DXF range either classifies or is known-unclassified, and the
        // answer never changes between calls
        for code in -10..1100 {
            let first = ExpectedType::expected_type(code);
            let second = ExpectedType::expected_type(code);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn band_samples() {
        assert_eq!(Some(ExpectedType::Str), ExpectedType::expected_type(0));
        assert_eq!(Some(ExpectedType::Double), ExpectedType::expected_type(10));
        assert_eq!(Some(ExpectedType::Double), ExpectedType::expected_type(40));
        assert_eq!(Some(ExpectedType::Short), ExpectedType::expected_type(62));
        assert_eq!(Some(ExpectedType::Integer), ExpectedType::expected_type(90));
        assert_eq!(Some(ExpectedType::Handle), ExpectedType::expected_type(105));
        assert_eq!(Some(ExpectedType::Binary), ExpectedType::expected_type(310));
        assert_eq!(Some(ExpectedType::Handle), ExpectedType::expected_type(350));
        assert_eq!(Some(ExpectedType::Str), ExpectedType::expected_type(999));
        assert_eq!(None, ExpectedType::expected_type(-1));
        assert_eq!(None, ExpectedType::expected_type(83));
        assert_eq!(None, ExpectedType::expected_type(2000));
    }

    #[test]
    fn coerce_string_to_handle() {
        let pair = CodePair::new_str(5, "1AF");
        assert_eq!(
            CodePairValue::Handle(Handle(0x1AF)),
            ExpectedType::Handle.coerce(&pair).unwrap()
        );
    }

    #[test]
    fn coerce_rejects_mismatch() {
        let pair = CodePair::new_f64(40, 1.0);
        assert!(ExpectedType::Str.coerce(&pair).is_err());
    }

    #[test]
    fn coerce_promotes_integer_to_double() {
        let pair = CodePair::new_i64(62, 3);
        assert_eq!(
            CodePairValue::Double(3.0),
            ExpectedType::Double.coerce(&pair).unwrap()
        );
    }
}
