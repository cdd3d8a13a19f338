extern crate dxf_codec;
use dxf_codec::*;

mod test_helpers;
use test_helpers::helpers::*;

#[test]
fn read_circle_with_defaults() {
    // center, radius, and color are supplied; everything else falls back to defaults
    let record = expect_record(decode_one(
        vec![
            "0", "CIRCLE", "10", "1.0", "20", "2.0", "30", "0.0", "40", "5.0", "62", "3", "0",
            "EOF",
        ],
        AcadVersion::R12,
    ));
    assert_eq!("CIRCLE", record.kind());
    assert!(record.is_valid());
    assert_eq!(Some(1.0), record.f64_value("center_x"));
    assert_eq!(Some(2.0), record.f64_value("center_y"));
    assert_eq!(Some(0.0), record.f64_value("center_z"));
    assert_eq!(Some(5.0), record.f64_value("radius"));
    assert_eq!(Some(3), record.i64_value("color"));
    assert_eq!(Some("0"), record.string_value("layer"));
    assert_eq!(Some("BYLAYER"), record.string_value("linetype"));
}

#[test]
fn read_record_with_handle() {
    let record = expect_record(decode_one(
        vec!["0", "CIRCLE", "5", "1AF", "40", "2.0", "0", "EOF"],
        AcadVersion::R2000,
    ));
    assert_eq!(Some(Handle(0x1AF)), record.handle_value("handle"));
}

#[test]
fn end_of_section_marker_is_put_back() {
    let mut source = CodePairPutBack::from_text("  0\r\nENDSEC\r\n");
    match decode_record(&mut source, SchemaRegistry::builtin(), AcadVersion::R12).unwrap() {
        DecodeOutcome::EndOfSection(_) => (),
        other => panic!("expected end of section but got {:?}", other),
    }
    // the marker is still available to the section layer
    let pair = source.next().unwrap().unwrap();
    assert_eq!(0, pair.code);
    assert_eq!("ENDSEC", pair.assert_string().unwrap());
}

#[test]
fn unknown_record_kind_is_skipped_with_warning() {
    let mut source = stream_from(vec![
        "0",
        "UNSUPPORTED_THING",
        "1",
        "unsupported string",
        "0",
        "CIRCLE",
        "40",
        "2.0",
        "0",
        "EOF",
    ]);
    let registry = SchemaRegistry::builtin();
    match decode_record(&mut source, registry, AcadVersion::R12).unwrap() {
        DecodeOutcome::Skipped {
            kind_name,
            diagnostics,
        } => {
            assert_eq!("UNSUPPORTED_THING", kind_name);
            assert_eq!(1, diagnostics.len());
            assert_eq!(DiagnosticKind::UnknownRecordKind, diagnostics[0].kind);
        }
        other => panic!("expected a skipped record but got {:?}", other),
    }
    // decoding resumes at the next marker
    let record = expect_record(decode_record(&mut source, registry, AcadVersion::R12).unwrap());
    assert_eq!("CIRCLE", record.kind());
    assert_eq!(Some(2.0), record.f64_value("radius"));
}

#[test]
fn unknown_group_code_in_schema_is_discarded_with_one_diagnostic() {
    // code 48 is a known band but no CIRCLE field
    let with_unknown = decode_one(
        vec![
            "0", "CIRCLE", "10", "1.0", "48", "9.9", "40", "5.0", "0", "EOF",
        ],
        AcadVersion::R12,
    );
    let without = decode_one(
        vec!["0", "CIRCLE", "10", "1.0", "40", "5.0", "0", "EOF"],
        AcadVersion::R12,
    );
    let diagnostics = with_unknown.diagnostics().to_vec();
    assert_eq!(1, diagnostics.len());
    assert_eq!(DiagnosticKind::UnknownGroupCode, diagnostics[0].kind);
    assert_eq!(
        expect_record(without),
        expect_record(with_unknown),
        "all other fields must decode identically"
    );
}

#[test]
fn out_of_band_group_code_is_discarded_with_one_diagnostic() {
    // code 83 lies outside every band; the value line is still consumed
    let with_unknown = decode_one(
        vec![
            "0", "CIRCLE", "10", "1.0", "83", "junk", "40", "5.0", "0", "EOF",
        ],
        AcadVersion::R12,
    );
    let without = decode_one(
        vec!["0", "CIRCLE", "10", "1.0", "40", "5.0", "0", "EOF"],
        AcadVersion::R12,
    );
    let diagnostics = with_unknown.diagnostics().to_vec();
    assert_eq!(1, diagnostics.len());
    assert_eq!(DiagnosticKind::UnknownGroupCode, diagnostics[0].kind);
    assert_eq!(expect_record(without), expect_record(with_unknown));
}

#[test]
fn out_of_version_field_is_applied_with_warning() {
    // the POINT angle (code 50) does not exist before R14
    let outcome = decode_one(
        vec![
            "0", "POINT", "10", "1.0", "20", "2.0", "50", "45.0", "0", "EOF",
        ],
        AcadVersion::R12,
    );
    let diagnostics = outcome.diagnostics().to_vec();
    assert_eq!(1, diagnostics.len());
    assert_eq!(DiagnosticKind::VersionMismatch, diagnostics[0].kind);
    let record = expect_record(outcome);
    assert_eq!(Some(45.0), record.f64_value("angle"), "permissive read keeps the value");
}

#[test]
fn pre_r13_elevation_feeds_the_canonical_z() {
    let record = expect_record(decode_one(
        vec![
            "0", "CIRCLE", "10", "1.0", "20", "2.0", "38", "7.5", "40", "5.0", "0", "EOF",
        ],
        AcadVersion::R12,
    ));
    assert_eq!(Some(7.5), record.f64_value("center_z"));
    // the alias never appears as its own field
    assert_eq!(None, record.f64_value("elevation"));
}

#[test]
fn elevation_after_r12_warns_but_still_applies() {
    let outcome = decode_one(
        vec!["0", "CIRCLE", "38", "7.5", "40", "5.0", "0", "EOF"],
        AcadVersion::R2000,
    );
    assert!(outcome
        .diagnostics()
        .iter()
        .any(|d| d.kind == DiagnosticKind::VersionMismatch));
    let record = expect_record(outcome);
    assert_eq!(Some(7.5), record.f64_value("center_z"));
}

#[test]
fn missing_required_field_marks_the_record_invalid() {
    let outcome = decode_one(
        vec!["0", "CIRCLE", "10", "1.0", "20", "2.0", "0", "EOF"],
        AcadVersion::R12,
    );
    let diagnostics = outcome.diagnostics().to_vec();
    assert!(diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::MissingRequiredField && d.message.contains("radius")));
    let record = expect_record(outcome);
    assert!(!record.is_valid());
}

#[test]
fn non_positive_radius_marks_the_record_invalid() {
    let outcome = decode_one(
        vec!["0", "CIRCLE", "40", "0.0", "0", "EOF"],
        AcadVersion::R12,
    );
    assert!(outcome
        .diagnostics()
        .iter()
        .any(|d| d.kind == DiagnosticKind::InvalidFieldValue));
    let record = expect_record(outcome);
    assert!(!record.is_valid());
    // the value is kept for inspection
    assert_eq!(Some(0.0), record.f64_value("radius"));
}

#[test]
fn unterminated_record_decodes_with_end_of_stream_warning() {
    // the stream exhausts cleanly before a 0 marker; this must be distinguishable from an
    // I/O fault, which would surface as Err instead
    let outcome = decode_one(vec!["0", "CIRCLE", "40", "5.0"], AcadVersion::R12);
    match &outcome {
        DecodeOutcome::DecodedWithWarnings(record, diagnostics) => {
            assert_eq!(Some(5.0), record.f64_value("radius"));
            assert!(diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnexpectedEndOfStream));
        }
        other => panic!("expected a best-effort record but got {:?}", other),
    }
}

#[test]
fn comments_are_surfaced_but_not_part_of_the_record() {
    let outcome = decode_one(
        vec![
            "0",
            "CIRCLE",
            "999",
            "generated by a drawing tool",
            "40",
            "5.0",
            "0",
            "EOF",
        ],
        AcadVersion::R12,
    );
    let diagnostics = outcome.diagnostics().to_vec();
    assert!(diagnostics.iter().any(|d| {
        d.severity == Severity::Note
            && d.kind == DiagnosticKind::Comment
            && d.message == "generated by a drawing tool"
    }));
    let record = expect_record(outcome);
    assert_eq!(Some(5.0), record.f64_value("radius"));
}

#[test]
fn subclass_markers_are_consumed_structurally() {
    let outcome = decode_one(
        vec![
            "0",
            "CIRCLE",
            "5",
            "2A",
            "100",
            "AcDbEntity",
            "8",
            "walls",
            "100",
            "AcDbCircle",
            "40",
            "5.0",
            "0",
            "EOF",
        ],
        AcadVersion::R2000,
    );
    assert!(
        outcome.diagnostics().is_empty(),
        "markers must not produce diagnostics: {:?}",
        outcome.diagnostics()
    );
    let record = expect_record(outcome);
    assert_eq!(Some("walls"), record.string_value("layer"));
}

#[test]
fn duplicate_tag_last_value_wins() {
    let record = expect_record(decode_one(
        vec!["0", "CIRCLE", "40", "1.0", "40", "2.0", "0", "EOF"],
        AcadVersion::R12,
    ));
    assert_eq!(Some(2.0), record.f64_value("radius"));
}

#[test]
fn dictionary_entries_accumulate_in_order() {
    let record = expect_record(decode_one(
        vec![
            "0",
            "DICTIONARY",
            "5",
            "C",
            "3",
            "first",
            "350",
            "A1",
            "3",
            "second",
            "350",
            "A2",
            "0",
            "EOF",
        ],
        AcadVersion::R2000,
    ));
    let names: Vec<&str> = record
        .values("entry_name")
        .iter()
        .map(|v| match v {
            CodePairValue::Str(s) => s.as_str(),
            other => panic!("expected a string entry but got {:?}", other),
        })
        .collect();
    assert_eq!(vec!["first", "second"], names);
    let handles: Vec<Handle> = record
        .values("entry_handle")
        .iter()
        .map(|v| match v {
            CodePairValue::Handle(h) => *h,
            other => panic!("expected a handle entry but got {:?}", other),
        })
        .collect();
    assert_eq!(vec![Handle(0xA1), Handle(0xA2)], handles);
}

#[test]
fn binary_payload_reassembles_across_lines() {
    let outcome = decode_one(
        vec![
            "0", "OLE2FRAME", "90", "4", "310", "0102", "310", "0304", "0", "EOF",
        ],
        AcadVersion::R2000,
    );
    assert!(
        !outcome
            .diagnostics()
            .iter()
            .any(|d| d.kind == DiagnosticKind::PayloadLengthMismatch),
        "lengths agree, no mismatch expected"
    );
    let record = expect_record(outcome);
    assert_eq!(Some(&[0x01, 0x02, 0x03, 0x04][..]), record.binary_value("data"));
}

#[test]
fn binary_payload_length_mismatch_keeps_data() {
    let outcome = decode_one(
        vec![
            "0", "OLE2FRAME", "90", "3", "310", "0102", "310", "0304", "0", "EOF",
        ],
        AcadVersion::R2000,
    );
    assert!(outcome
        .diagnostics()
        .iter()
        .any(|d| d.kind == DiagnosticKind::PayloadLengthMismatch));
    let record = expect_record(outcome);
    assert_eq!(Some(&[0x01, 0x02, 0x03, 0x04][..]), record.binary_value("data"));
}

#[test]
fn multiple_records_decode_in_sequence() {
    let mut source = stream_from(vec![
        "0", "CIRCLE", "10", "1.1", "20", "2.2", "30", "3.3", "40", "4.4", "0", "LINE", "10",
        "5.5", "20", "6.6", "30", "7.7", "11", "8.8", "21", "9.9", "31", "10.1", "0", "ENDSEC",
    ]);
    let registry = SchemaRegistry::builtin();

    let circle = expect_record(decode_record(&mut source, registry, AcadVersion::R12).unwrap());
    assert_eq!("CIRCLE", circle.kind());
    assert_eq!(Some(4.4), circle.f64_value("radius"));

    let line = expect_record(decode_record(&mut source, registry, AcadVersion::R12).unwrap());
    assert_eq!("LINE", line.kind());
    assert_eq!(Some(5.5), line.f64_value("p1_x"));
    assert_eq!(Some(10.1), line.f64_value("p2_z"));

    match decode_record(&mut source, registry, AcadVersion::R12).unwrap() {
        DecodeOutcome::EndOfSection(_) => (),
        other => panic!("expected end of section but got {:?}", other),
    }
}

/// Serves a fixed prefix, then fails like a broken disk.
struct FailingReader {
    data: Vec<u8>,
    position: usize,
}

impl FailingReader {
    fn after(data: &str) -> Self {
        FailingReader {
            data: data.as_bytes().to_vec(),
            position: 0,
        }
    }
}

impl std::io::Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.position >= self.data.len() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated stream fault",
            ));
        }
        let available = (self.data.len() - self.position).min(buf.len());
        buf[..available].copy_from_slice(&self.data[self.position..self.position + available]);
        self.position += available;
        Ok(available)
    }
}

#[test]
fn io_fault_mid_record_is_fatal() {
    // unlike clean exhaustion (DecodedWithWarnings above), a stream fault aborts the decode
    let iter = TextCodePairIter::from_str_source(FailingReader::after("0\r\nCIRCLE\r\n40\r\n5.0\r\n"));
    let mut source = CodePairPutBack::from_code_pair_iter(Box::new(iter));
    match decode_record(&mut source, SchemaRegistry::builtin(), AcadVersion::R12) {
        Err(DxfError::IoError(_)) => (),
        other => panic!("expected a fatal I/O error but got {:?}", other),
    }
}

#[test]
fn io_fault_at_the_first_byte_is_fatal() {
    let iter = TextCodePairIter::from_str_source(FailingReader::after(""));
    let mut source = CodePairPutBack::from_code_pair_iter(Box::new(iter));
    match decode_record(&mut source, SchemaRegistry::builtin(), AcadVersion::R12) {
        Err(DxfError::IoError(_)) => (),
        other => panic!("expected a fatal I/O error but got {:?}", other),
    }
}

#[test]
fn records_append_to_a_chain() {
    let mut source = stream_from(vec![
        "0", "CIRCLE", "40", "1.0", "0", "CIRCLE", "40", "2.0", "0", "ENDSEC",
    ]);
    let registry = SchemaRegistry::builtin();
    let mut chain = RecordChain::new();
    loop {
        match decode_record(&mut source, registry, AcadVersion::R12).unwrap() {
            DecodeOutcome::Decoded(record) => chain.append(record).unwrap(),
            DecodeOutcome::DecodedWithWarnings(record, _) => chain.append(record).unwrap(),
            DecodeOutcome::Skipped { .. } => (),
            DecodeOutcome::EndOfSection(_) => break,
        }
    }
    assert_eq!(2, chain.len());
    let radii: Vec<f64> = chain.iter().map(|r| r.f64_value("radius").unwrap()).collect();
    assert_eq!(vec![1.0, 2.0], radii);
}
