extern crate dxf_codec;

#[allow(dead_code)]
pub mod helpers {
    use dxf_codec::*;

    /// Builds a put-back source from alternating code/value lines.
    pub fn stream_from(lines: Vec<&str>) -> CodePairPutBack {
        CodePairPutBack::from_text(&lines.join("\r\n"))
    }

    /// Decodes a single record, asserting nothing fatal happened.
    pub fn decode_one(lines: Vec<&str>, version: AcadVersion) -> DecodeOutcome {
        let mut source = stream_from(lines);
        decode_record(&mut source, SchemaRegistry::builtin(), version)
            .expect("decode should not hit an I/O fault")
    }

    /// Unwraps an outcome expected to carry a record.
    pub fn expect_record(outcome: DecodeOutcome) -> Record {
        match outcome {
            DecodeOutcome::Decoded(record) => record,
            DecodeOutcome::DecodedWithWarnings(record, _) => record,
            other => panic!("expected a decoded record but got {:?}", other),
        }
    }

    /// Encodes a record to its text form.
    pub fn encode_to_string(record: &Record, version: AcadVersion) -> String {
        let mut buf = vec![];
        let mut writer = CodePairWriter::new_ascii_writer(&mut buf);
        encode_record(record, version, &mut writer).expect("encode should succeed");
        String::from_utf8(buf).expect("output should be valid utf-8")
    }

    pub fn assert_contains(actual: &str, expected: &str) {
        assert!(
            actual.contains(expected),
            "expected to find\n{:?}\nin\n{}",
            expected,
            actual
        );
    }

    pub fn assert_not_contains(actual: &str, expected: &str) {
        assert!(
            !actual.contains(expected),
            "did not expect to find\n{:?}\nin\n{}",
            expected,
            actual
        );
    }
}
