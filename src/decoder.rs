use std::sync::Arc;

use indexmap::IndexMap;

use crate::binary_payload::BinaryPayload;
use crate::code_pair_put_back::CodePairPutBack;
use crate::schema::{is_end_marker, COMMENT_CODE, RECORD_MARKER_CODE, SUBCLASS_MARKER_CODE};
use crate::{
    AcadVersion, CodePair, CodePairValue, Diagnostic, DiagnosticKind, DxfError, DxfResult,
    ExpectedType, Record, RecordSchema, SchemaRegistry,
};

/// The terminal states of one record decode.  Only an I/O fault escapes as `Err`; every
/// other condition is a diagnostic attached to one of these outcomes.
#[derive(Debug)]
pub enum DecodeOutcome {
    /// A record decoded with nothing to report.
    Decoded(Record),
    /// A record decoded; the diagnostics carry comments, recovered conditions, and
    /// validation failures (in which case the record is marked invalid but kept).
    DecodedWithWarnings(Record, Vec<Diagnostic>),
    /// The marker named a kind the registry does not know; the record's tags were skipped.
    Skipped {
        kind_name: String,
        diagnostics: Vec<Diagnostic>,
    },
    /// An end-of-section marker was seen (and put back for the section layer), or the
    /// stream exhausted cleanly at a record boundary.
    EndOfSection(Vec<Diagnostic>),
}

impl DecodeOutcome {
    pub fn record(&self) -> Option<&Record> {
        match self {
            DecodeOutcome::Decoded(record) => Some(record),
            DecodeOutcome::DecodedWithWarnings(record, _) => Some(record),
            _ => None,
        }
    }
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            DecodeOutcome::Decoded(_) => &[],
            DecodeOutcome::DecodedWithWarnings(_, diagnostics) => diagnostics,
            DecodeOutcome::Skipped { diagnostics, .. } => diagnostics,
            DecodeOutcome::EndOfSection(diagnostics) => diagnostics,
        }
    }
}

/// Decodes the next record from the stream.  The caller owns the loop: each call consumes
/// one `0/<kind>` marker and the tags behind it, stopping short of the next marker.
pub fn decode_record(
    iter: &mut CodePairPutBack,
    registry: &SchemaRegistry,
    version: AcadVersion,
) -> DxfResult<DecodeOutcome> {
    let mut diagnostics = vec![];
    loop {
        match iter.next() {
            Some(Ok(pair)) if pair.code == COMMENT_CODE => {
                surface_comment(&mut diagnostics, &pair);
            }
            Some(Ok(pair)) if pair.code == RECORD_MARKER_CODE => {
                let kind_name = match pair.assert_string() {
                    Ok(name) => name,
                    Err(_) => {
                        diagnostics.push(Diagnostic::warning(
                            DiagnosticKind::MalformedTag,
                            pair.offset,
                            format!("the record marker value {:?} is not a kind name", pair.value),
                        ));
                        continue;
                    }
                };
                if is_end_marker(&kind_name) {
                    iter.put_back(Ok(pair));
                    return Ok(DecodeOutcome::EndOfSection(diagnostics));
                }
                match registry.lookup(&kind_name) {
                    Some(schema) => {
                        let record =
                            decode_record_body(iter, &schema, version, &mut diagnostics)?;
                        return Ok(finish_outcome(record, diagnostics));
                    }
                    None => {
                        diagnostics.push(Diagnostic::warning(
                            DiagnosticKind::UnknownRecordKind,
                            pair.offset,
                            format!("the record kind '{}' is not recognized", kind_name),
                        ));
                        swallow_unknown_record(iter, &mut diagnostics)?;
                        return Ok(DecodeOutcome::Skipped {
                            kind_name,
                            diagnostics,
                        });
                    }
                }
            }
            Some(Ok(pair)) => {
                // tags are only legal behind a record marker; tolerate and move on
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::MalformedTag,
                    pair.offset,
                    format!("expected 0/<record-kind> but got {:?}", pair),
                ));
            }
            Some(Err(e)) if e.is_fatal() => return Err(e),
            Some(Err(e)) => {
                diagnostics.push(diagnostic_for_tag_error(&e));
            }
            None => return Ok(DecodeOutcome::EndOfSection(diagnostics)),
        }
    }
}

fn finish_outcome(record: Record, diagnostics: Vec<Diagnostic>) -> DecodeOutcome {
    if diagnostics.is_empty() {
        DecodeOutcome::Decoded(record)
    } else {
        DecodeOutcome::DecodedWithWarnings(record, diagnostics)
    }
}

fn surface_comment(diagnostics: &mut Vec<Diagnostic>, pair: &CodePair) {
    match pair.assert_string() {
        Ok(text) => diagnostics.push(Diagnostic::note(DiagnosticKind::Comment, pair.offset, text)),
        Err(_) => diagnostics.push(Diagnostic::warning(
            DiagnosticKind::MalformedTag,
            pair.offset,
            format!("the comment value {:?} is not a string", pair.value),
        )),
    }
}

/// Consumes the remaining tags of an unrecognized record, up to (and excluding) the next
/// record marker.
fn swallow_unknown_record(
    iter: &mut CodePairPutBack,
    diagnostics: &mut Vec<Diagnostic>,
) -> DxfResult<()> {
    loop {
        match iter.next() {
            Some(Ok(pair)) if pair.code == RECORD_MARKER_CODE => {
                iter.put_back(Ok(pair));
                return Ok(());
            }
            Some(Ok(pair)) if pair.code == COMMENT_CODE => {
                surface_comment(diagnostics, &pair);
            }
            Some(Ok(_)) => (), // part of the unsupported record
            Some(Err(e)) if e.is_fatal() => return Err(e),
            Some(Err(_)) => (),
            None => return Ok(()),
        }
    }
}

fn decode_record_body(
    iter: &mut CodePairPutBack,
    schema: &Arc<RecordSchema>,
    version: AcadVersion,
    diagnostics: &mut Vec<Diagnostic>,
) -> DxfResult<Record> {
    let mut record = Record::new(schema.clone());
    let mut payloads: IndexMap<&'static str, BinaryPayload> = IndexMap::new();
    let mut last_offset = 0;

    loop {
        match iter.next() {
            Some(Ok(pair)) if pair.code == RECORD_MARKER_CODE => {
                // next record or end-of-section; this record is finished
                iter.put_back(Ok(pair));
                break;
            }
            Some(Ok(pair)) => {
                last_offset = pair.offset;
                if pair.code == COMMENT_CODE {
                    surface_comment(diagnostics, &pair);
                    continue;
                }
                if pair.code == SUBCLASS_MARKER_CODE {
                    // structural only; which fields follow is already fixed by the schema
                    continue;
                }
                apply_tag(&pair, version, &mut record, &mut payloads, diagnostics)?;
            }
            Some(Err(e)) if e.is_fatal() => return Err(e),
            Some(Err(e)) => {
                diagnostics.push(diagnostic_for_tag_error(&e));
                if matches!(e, DxfError::UnexpectedEndOfInput) {
                    break;
                }
            }
            None => {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::UnexpectedEndOfStream,
                    last_offset,
                    format!(
                        "the stream ended before the '{}' record was terminated",
                        schema.name
                    ),
                ));
                break;
            }
        }
    }

    finish_record(&mut record, payloads, version, last_offset, diagnostics)?;
    Ok(record)
}

fn apply_tag(
    pair: &CodePair,
    version: AcadVersion,
    record: &mut Record,
    payloads: &mut IndexMap<&'static str, BinaryPayload>,
    diagnostics: &mut Vec<Diagnostic>,
) -> DxfResult<()> {
    let schema = record.schema().clone();
    let field = match schema.field_by_code(pair.code) {
        Some(f) => f,
        None => {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::UnknownGroupCode,
                pair.offset,
                format!(
                    "code '{}' is not part of a '{}' record; the value was discarded",
                    pair.code, schema.name
                ),
            ));
            return Ok(());
        }
    };

    if !field.applies_to(version) {
        // read permissively: warn but keep the value, because real files carry vestigial
        // and forward-compatible tags
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::VersionMismatch,
            pair.offset,
            format!(
                "the field '{}' of '{}' does not exist at version {:?}; the value was applied anyway",
                field.name, schema.name, version
            ),
        ));
    }

    // version-conditional aliasing: the schema names the canonical slot and the decision is
    // a plain read of the declared version made above; nothing here mutates to decide
    let storage = match field.alias_of {
        Some(target) => match schema.field(target) {
            Some(canonical) => canonical,
            None => field, // unreachable for validated schemas
        },
        None => field,
    };

    let value = match storage.expected_type.coerce(pair) {
        Ok(v) => v,
        Err(_) => {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::MalformedTag,
                pair.offset,
                format!(
                    "the value {:?} cannot populate the {:?} field '{}' of '{}'",
                    pair.value, storage.expected_type, storage.name, schema.name
                ),
            ));
            return Ok(());
        }
    };

    if storage.expected_type == ExpectedType::Binary {
        if let CodePairValue::Binary(chunk) = value {
            payloads.entry(storage.name).or_default().push_chunk(&chunk);
        }
        return Ok(());
    }

    if storage.repeatable {
        record.push_value(storage.name, value)?;
    } else {
        // duplicate non-repeatable tags: last value wins
        record.set_value(storage.name, value)?;
    }
    Ok(())
}

fn finish_record(
    record: &mut Record,
    payloads: IndexMap<&'static str, BinaryPayload>,
    version: AcadVersion,
    last_offset: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> DxfResult<()> {
    let schema = record.schema().clone();

    // finalize binary payloads, cross-checking any declared length
    for (name, mut payload) in payloads {
        let field = match schema.field(name) {
            Some(f) => f,
            None => continue,
        };
        if let Some(length_field) = field.length_field {
            if let Some(declared) = record.i64_value(length_field) {
                payload.set_declared_length(declared as usize);
            }
        }
        let reassembled = payload.len();
        let declared = payload.declared_length();
        let (bytes, consistent) = payload.finalize();
        if !consistent {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::PayloadLengthMismatch,
                last_offset,
                format!(
                    "the '{}' payload reassembled to {} bytes but {} were declared; the data was kept",
                    name,
                    reassembled,
                    declared.unwrap_or(0)
                ),
            ));
        }
        record.set_value(name, CodePairValue::Binary(bytes))?;
    }

    // materialize defaults for absent fields, then validate
    for field in &schema.fields {
        if field.alias_of.is_some() || !field.applies_to(version) {
            continue;
        }
        if record.value(field.name).is_none() {
            if let Some(ref default) = field.default {
                record.set_value(field.name, default.clone())?;
            }
        }
    }
    for field in &schema.fields {
        if field.alias_of.is_some() || !field.applies_to(version) {
            continue;
        }
        if field.required && record.value(field.name).is_none() {
            record.set_valid(false);
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::MissingRequiredField,
                last_offset,
                format!(
                    "the required field '{}' of '{}' is missing",
                    field.name, schema.name
                ),
            ));
        }
        let constraint_failure = match (field.constraint, record.value(field.name)) {
            (Some(constraint), Some(value)) => constraint.check(value).err(),
            _ => None,
        };
        if let Some(reason) = constraint_failure {
            record.set_valid(false);
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::InvalidFieldValue,
                last_offset,
                format!(
                    "the field '{}' of '{}' is invalid: {}",
                    field.name, schema.name, reason
                ),
            ));
        }
    }

    Ok(())
}

fn diagnostic_for_tag_error(error: &DxfError) -> Diagnostic {
    match error {
        DxfError::UnexpectedCode(code, offset) => Diagnostic::warning(
            DiagnosticKind::UnknownGroupCode,
            *offset,
            format!("code '{}' lies outside every known band; the tag was skipped", code),
        ),
        DxfError::UnexpectedEndOfInput => Diagnostic::warning(
            DiagnosticKind::UnexpectedEndOfStream,
            0,
            "the stream ended in the middle of a tag",
        ),
        DxfError::ParseIntError(_, offset)
        | DxfError::ParseFloatError(_, offset)
        | DxfError::ParseError(offset) => {
            Diagnostic::warning(DiagnosticKind::MalformedTag, *offset, format!("{}", error))
        }
        other => Diagnostic::warning(DiagnosticKind::MalformedTag, 0, format!("{}", other)),
    }
}
