use crate::{CodePair, CodePairValue, DxfError, DxfResult, ExpectedType, Handle};

use crate::helper_functions::*;
use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::Encoding;
use std::io::{Cursor, Read};

/// A source of code pairs.  `read_as_utf8` switches string decoding from the default
/// Windows-1252 code page once the document layer learns the file is R2007+.
pub trait CodePairIter: Iterator<Item = DxfResult<CodePair>> {
    fn read_as_utf8(&mut self);
}

/// Directly returns code pairs from memory; used when the caller already has pairs in hand.
pub struct DirectCodePairIter {
    pairs: Vec<CodePair>,
    offset: usize,
}

impl DirectCodePairIter {
    pub fn new(pairs: Vec<CodePair>) -> Self {
        DirectCodePairIter { pairs, offset: 0 }
    }
}

impl CodePairIter for DirectCodePairIter {
    fn read_as_utf8(&mut self) {
        // noop
    }
}

impl Iterator for DirectCodePairIter {
    type Item = DxfResult<CodePair>;
    fn next(&mut self) -> Option<DxfResult<CodePair>> {
        if self.offset < self.pairs.len() {
            let pair = self.pairs[self.offset].clone();
            self.offset += 1;
            return Some(Ok(pair));
        }

        None
    }
}

/// Returns code pairs as read from text.  Handles the most common DXF files and when parsed
/// from strings.
pub struct TextCodePairIter<T: Read> {
    reader: T,
    string_encoding: &'static Encoding,
    first_line: String,
    read_first_line: bool,
    offset: usize,
    // set once pair alignment is lost; the stream then reports clean exhaustion
    poisoned: bool,
}

impl<T: Read> CodePairIter for TextCodePairIter<T> {
    fn read_as_utf8(&mut self) {
        self.string_encoding = encoding_rs::UTF_8;
    }
}

impl<T: Read> Iterator for TextCodePairIter<T> {
    type Item = DxfResult<CodePair>;
    fn next(&mut self) -> Option<DxfResult<CodePair>> {
        self.read_code_pair()
    }
}

impl<T: Read> TextCodePairIter<T> {
    pub fn new(
        reader: T,
        string_encoding: &'static Encoding,
        first_line: String,
        offset: usize,
    ) -> Self {
        TextCodePairIter {
            reader,
            string_encoding,
            first_line,
            read_first_line: false,
            offset,
            poisoned: false,
        }
    }
    pub fn from_str_source(reader: T) -> Self {
        TextCodePairIter::new(reader, encoding_rs::WINDOWS_1252, String::new(), 0)
    }
    fn read_code_pair(&mut self) -> Option<DxfResult<CodePair>> {
        if self.poisoned {
            return None;
        }

        // Read code.  If no line is available, fail gracefully.
        let code_line = if self.read_first_line || self.first_line.is_empty() {
            self.read_first_line = true;
            self.offset += 1;
            match read_line(&mut self.reader, self.offset == 1, encoding_rs::WINDOWS_1252) {
                Some(Ok(v)) => v,
                Some(Err(e)) => return Some(Err(e)),
                None => return None,
            }
        } else {
            // the caller already consumed this line from the underlying stream, so the
            // line counter stays put
            self.read_first_line = true;

            // .clone() is fine because it'll only ever be called once and the only valid
            // values that might be cloned are: "0" and "999"; all others are errors.
            self.first_line.clone()
        };
        let code_line = code_line.trim();
        if code_line.is_empty() {
            // might be an empty file only containing a newline
            return None;
        }

        let code_offset = self.offset;
        let code = match parse_i32(code_line, code_offset) {
            Ok(c) => c,
            Err(e) => {
                // a non-numeric code line means the code/value alternation is lost
                self.poisoned = true;
                return Some(Err(e));
            }
        };

        // Read value.  If no line is available die horribly.
        self.offset += 1;
        let value_line = match read_line(&mut self.reader, false, self.string_encoding) {
            Some(Ok(v)) => v,
            Some(Err(e)) => return Some(Err(e)),
            None => {
                self.poisoned = true;
                return Some(Err(DxfError::UnexpectedEndOfInput));
            }
        };

        // construct the value pair
        let expected_type = match ExpectedType::expected_type(code) {
            Some(t) => t,
            // the value line was consumed, so the stream stays aligned and the decoder may
            // skip this single tag
            None => return Some(Err(DxfError::UnexpectedCode(code, code_offset))),
        };
        let value = match expected_type {
            ExpectedType::Boolean
            | ExpectedType::Integer
            | ExpectedType::Long
            | ExpectedType::Short => {
                CodePairValue::Integer(try_into_option!(parse_i64(&value_line, self.offset)))
            }
            ExpectedType::Double => {
                CodePairValue::Double(try_into_option!(parse_f64(&value_line, self.offset)))
            }
            ExpectedType::Str => {
                let value_line = CodePairValue::un_escape_string(&value_line);
                CodePairValue::Str(value_line.into_owned())
            }
            ExpectedType::Handle => match Handle::from_string(&value_line) {
                Some(h) => CodePairValue::Handle(h),
                None => return Some(Err(DxfError::ParseError(self.offset))),
            },
            ExpectedType::Binary => {
                let mut data = vec![];
                match parse_hex_string(&value_line, &mut data, self.offset) {
                    Ok(()) => CodePairValue::Binary(data),
                    Err(e) => return Some(Err(e)),
                }
            }
        };

        Some(Ok(CodePair::new(code, value, code_offset)))
    }
}

/// Returns code pairs as read from a binary file.  Usually created _after_ the first line of a
/// file has been read.
pub struct BinaryCodePairIter<T: Read> {
    reader: T,
    code_size_detection_complete: bool,
    codes_are_two_bytes: bool,
    offset: usize,
    poisoned: bool,
}

impl<T: Read> CodePairIter for BinaryCodePairIter<T> {
    fn read_as_utf8(&mut self) {
        // noop
    }
}

impl<T: Read> Iterator for BinaryCodePairIter<T> {
    type Item = DxfResult<CodePair>;
    fn next(&mut self) -> Option<DxfResult<CodePair>> {
        self.read_code_pair()
    }
}

impl<T: Read> BinaryCodePairIter<T> {
    pub fn new(reader: T, offset: usize) -> Self {
        BinaryCodePairIter {
            reader,
            code_size_detection_complete: false,
            codes_are_two_bytes: false,
            offset,
            poisoned: false,
        }
    }
    fn read_code_pair(&mut self) -> Option<DxfResult<CodePair>> {
        if self.poisoned {
            return None;
        }

        // Read code.  If no data is available, fail gracefully.
        let mut code = match read_u8(&mut self.reader) {
            Some(Ok(c)) => i32::from(c),
            Some(Err(e)) => return Some(Err(DxfError::IoError(e))),
            None => return None,
        };
        self.offset += 1;

        // If reading a larger code and no data is available, die horribly.
        if self.codes_are_two_bytes {
            // post R13 codes are 2 bytes, read the second byte of the code
            let high_byte = i32::from(try_into_option!(self.read_u8_strict()));
            code += high_byte << 8;
            self.offset += 1;
        } else if code == 255 {
            // pre R13 codes are either 1 or 3 bytes
            code = i32::from(try_into_option!(self.read_i16_strict()));
            self.offset += 2;
        }

        // Read value.  If no data is available die horribly.
        let expected_type = match ExpectedType::expected_type(code) {
            Some(t) => t,
            None => {
                // a binary stream cannot resync past a code of unknown width
                self.poisoned = true;
                return Some(Err(DxfError::UnexpectedCode(code, self.offset)));
            }
        };
        let (value, read_bytes) = match expected_type {
            ExpectedType::Boolean => {
                // after R13 bools are encoded as a single byte
                let (b_value, read_bytes) = if self.codes_are_two_bytes {
                    (i64::from(try_into_option!(self.read_u8_strict())), 1)
                } else {
                    (i64::from(try_into_option!(self.read_i16_strict())), 2)
                };
                (CodePairValue::Integer(b_value), read_bytes)
            }
            ExpectedType::Integer => (
                CodePairValue::Integer(i64::from(try_into_option!(self.read_i32_strict()))),
                4,
            ),
            ExpectedType::Long => (
                CodePairValue::Integer(try_into_option!(self.read_i64_strict())),
                8,
            ),
            ExpectedType::Short => (
                CodePairValue::Integer(i64::from(try_into_option!(self.read_i16_strict()))),
                2,
            ),
            ExpectedType::Double => (
                CodePairValue::Double(try_into_option!(self.read_f64_strict())),
                8,
            ),
            ExpectedType::Str => {
                let mut value = try_into_option!(self.read_string_binary());
                if !self.code_size_detection_complete && code == 0 && value.is_empty() {
                    // If this is the first pair being read and the code is 0, the only valid
                    // string value is "SECTION".  If the read value is instead empty, that means
                    // the string reader found a single 0x00 byte which indicates that this is a
                    // post R13 binary file where codes are always read as 2 bytes.  The 0x00
                    // byte was really the second byte of {0x00, 0x00}, so we need to do one more
                    // string read to catch the reader up.
                    self.codes_are_two_bytes = true;
                    self.offset += 1; // account for the NULL byte that was interpreted as an empty string
                    value = try_into_option!(self.read_string_binary()); // now read the actual value
                }
                let length = value.len() + 1; // +1 to account for the NULL terminator
                (
                    CodePairValue::Str(CodePairValue::un_escape_string(&value).into_owned()),
                    length,
                )
            }
            ExpectedType::Handle => {
                let value = try_into_option!(self.read_string_binary());
                let length = value.len() + 1;
                match Handle::from_string(&value) {
                    Some(h) => (CodePairValue::Handle(h), length),
                    None => return Some(Err(DxfError::ParseError(self.offset))),
                }
            }
            ExpectedType::Binary => {
                let length = try_into_option!(self.read_u8_strict()) as usize;
                let mut data = vec![];
                for _ in 0..length {
                    data.push(try_into_option!(self.read_u8_strict()));
                }

                (CodePairValue::Binary(data), length + 1) // +1 to account for initial length byte
            }
        };
        self.offset += read_bytes;
        self.code_size_detection_complete = true;

        Some(Ok(CodePair::new(code, value, self.offset)))
    }
    fn read_string_binary(&mut self) -> DxfResult<String> {
        let mut s = String::new();
        loop {
            match read_u8(&mut self.reader) {
                Some(Ok(0)) => break,
                Some(Ok(c)) => s.push(c as char),
                Some(Err(e)) => return Err(DxfError::IoError(e)),
                None => {
                    self.poisoned = true;
                    return Err(DxfError::UnexpectedEndOfInput);
                }
            }
        }

        Ok(s)
    }
    fn read_u8_strict(&mut self) -> DxfResult<u8> {
        match read_u8(&mut self.reader) {
            Some(Ok(b)) => Ok(b),
            Some(Err(e)) => Err(DxfError::IoError(e)),
            None => {
                self.poisoned = true;
                Err(DxfError::UnexpectedEndOfInput)
            }
        }
    }
    fn read_i16_strict(&mut self) -> DxfResult<i16> {
        self.map_binary_read(|r| r.read_i16::<LittleEndian>())
    }
    fn read_i32_strict(&mut self) -> DxfResult<i32> {
        self.map_binary_read(|r| r.read_i32::<LittleEndian>())
    }
    fn read_i64_strict(&mut self) -> DxfResult<i64> {
        self.map_binary_read(|r| r.read_i64::<LittleEndian>())
    }
    fn read_f64_strict(&mut self) -> DxfResult<f64> {
        self.map_binary_read(|r| r.read_f64::<LittleEndian>())
    }
    fn map_binary_read<V, F>(&mut self, f: F) -> DxfResult<V>
    where
        F: FnOnce(&mut T) -> std::io::Result<V>,
    {
        match f(&mut self.reader) {
            Ok(v) => Ok(v),
            Err(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.poisoned = true;
                Err(DxfError::UnexpectedEndOfInput)
            }
            Err(e) => Err(DxfError::IoError(e)),
        }
    }
}

//---------------------------

pub fn new_code_pair_iter_from_reader<T>(
    mut reader: T,
    string_encoding: &'static Encoding,
    first_line: String,
) -> DxfResult<Box<dyn CodePairIter>>
where
    T: Read,
{
    let mut bytes = vec![];
    reader.read_to_end(&mut bytes)?;
    let mut cursor = Cursor::new(bytes);
    let iter: Box<dyn CodePairIter> = match &*first_line {
        "AutoCAD Binary DXF" => {
            // swallow 0x1A,0x00
            let mut sentinel = [0u8; 2];
            cursor.read_exact(&mut sentinel)?;
            if sentinel != [0x1A, 0x00] {
                return Err(DxfError::ParseError(18));
            }
            Box::new(BinaryCodePairIter::new(cursor, 20))
        }
        _ => Box::new(TextCodePairIter::new(
            cursor,
            string_encoding,
            first_line,
            1,
        )),
    };
    Ok(iter)
}
