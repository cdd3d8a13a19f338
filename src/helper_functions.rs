// Copyright (c) IxMilia.  All Rights Reserved.  Licensed under the Apache License, Version 2.0.  See License.txt in the project root for license information.

use std::io::Read;

use encoding_rs::Encoding;

use crate::{DxfError, DxfResult};

/// Unwraps a `DxfResult` inside an `Option`-returning iterator body.
macro_rules! try_into_option {
    ($expr : expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        }
    };
}

pub(crate) fn read_u8<T: Read>(reader: &mut T) -> Option<std::io::Result<u8>> {
    let mut buf = [0u8; 1];
    match reader.read(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(Ok(buf[0])),
        Err(e) => Some(Err(e)),
    }
}

/// Reads one line of raw bytes and decodes it with the given encoding.  `None` means the
/// stream ended cleanly before any byte of the line was available.
pub(crate) fn read_line<T>(
    reader: &mut T,
    allow_bom: bool,
    encoding: &'static Encoding,
) -> Option<DxfResult<String>>
where
    T: Read,
{
    let mut bytes = vec![];
    loop {
        match read_u8(reader) {
            Some(Ok(b'\n')) => break,
            Some(Ok(b)) => bytes.push(b),
            Some(Err(e)) => return Some(Err(DxfError::IoError(e))),
            None => {
                if bytes.is_empty() {
                    return None;
                }
                break; // final line with no trailing newline
            }
        }
    }

    if bytes.ends_with(b"\r") {
        bytes.pop();
    }

    if allow_bom && bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(0..3);
    }

    let (value, _, _) = encoding.decode(&bytes);
    Some(Ok(value.into_owned()))
}

pub(crate) fn parse_i32(s: &str, offset: usize) -> DxfResult<i32> {
    match s.trim().parse::<i32>() {
        Ok(v) => Ok(v),
        Err(e) => Err(DxfError::ParseIntError(e, offset)),
    }
}

pub(crate) fn parse_i64(s: &str, offset: usize) -> DxfResult<i64> {
    match s.trim().parse::<i64>() {
        Ok(v) => Ok(v),
        Err(e) => Err(DxfError::ParseIntError(e, offset)),
    }
}

pub(crate) fn parse_f64(s: &str, offset: usize) -> DxfResult<f64> {
    match s.trim().parse::<f64>() {
        Ok(v) => Ok(v),
        Err(e) => Err(DxfError::ParseFloatError(e, offset)),
    }
}

/// Parses a string of hex digit pairs into bytes.  An odd-length string is treated as having a
/// leading zero nibble, e.g. `"ABC"` parses as `[0x0A, 0xBC]`.
pub(crate) fn parse_hex_string(data: &str, bytes: &mut Vec<u8>, offset: usize) -> DxfResult<()> {
    fn nibble(c: char, offset: usize) -> DxfResult<u8> {
        match c.to_digit(16) {
            Some(d) => Ok(d as u8),
            None => Err(DxfError::ParseError(offset)),
        }
    }

    let data = data.trim();
    let mut chars = data.chars();
    if data.len() % 2 == 1 {
        match chars.next() {
            Some(c) => bytes.push(nibble(c, offset)?),
            None => return Ok(()),
        }
    }

    while let Some(high) = chars.next() {
        let low = match chars.next() {
            Some(c) => c,
            None => return Err(DxfError::ParseError(offset)),
        };
        bytes.push((nibble(high, offset)? << 4) | nibble(low, offset)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_line_handles_crlf_and_bom() {
        let data = b"\xEF\xBB\xBFfirst\r\nsecond\n";
        let mut reader = &data[..];
        assert_eq!(
            "first",
            read_line(&mut reader, true, encoding_rs::WINDOWS_1252)
                .unwrap()
                .unwrap()
        );
        assert_eq!(
            "second",
            read_line(&mut reader, false, encoding_rs::WINDOWS_1252)
                .unwrap()
                .unwrap()
        );
        assert!(read_line(&mut reader, false, encoding_rs::WINDOWS_1252).is_none());
    }

    #[test]
    fn parse_hex_pairs() {
        let mut bytes = vec![];
        parse_hex_string("0102FF", &mut bytes, 0).unwrap();
        assert_eq!(vec![0x01, 0x02, 0xFF], bytes);
    }

    #[test]
    fn parse_hex_odd_length() {
        let mut bytes = vec![];
        parse_hex_string("ABC", &mut bytes, 0).unwrap();
        assert_eq!(vec![0x0A, 0xBC], bytes);
    }

    #[test]
    fn parse_hex_rejects_non_hex() {
        let mut bytes = vec![];
        assert!(parse_hex_string("zz", &mut bytes, 0).is_err());
    }
}
