use std::io::Write;

use crate::binary_payload::chunk_bytes;
use crate::code_pair_writer::CodePairWriter;
use crate::schema::{RECORD_MARKER_CODE, SUBCLASS_MARKER_CODE};
use crate::{
    AcadVersion, CodePair, CodePairValue, DxfError, DxfResult, FieldSchema, Record, RecordSchema,
};

/// Serializes one record.  Fields are emitted in schema order (the wire's conventional
/// order), version-gated against the target, and suppressed when equal to their default
/// unless flagged always-emit.  Nothing is written until the record validates: a missing
/// required field or a constraint violation is a hard error because a half-written record
/// would corrupt the stream's structural contract for downstream readers.
pub fn encode_record<T>(
    record: &Record,
    version: AcadVersion,
    writer: &mut CodePairWriter<T>,
) -> DxfResult<()>
where
    T: Write,
{
    let schema = record.schema().clone();

    // validate first, emit second
    for field in &schema.fields {
        if field.alias_of.is_some() || !field.applies_to(version) {
            continue;
        }
        let value = record.value_or_default(field.name);
        if field.required && value.is_none() {
            return Err(DxfError::MissingRequiredField {
                record_kind: String::from(schema.name),
                field: String::from(field.name),
            });
        }
        if let (Some(constraint), Some(ref value)) = (field.constraint, value) {
            if let Err(reason) = constraint.check(value) {
                return Err(DxfError::InvalidFieldValue {
                    record_kind: String::from(schema.name),
                    field: String::from(field.name),
                    reason,
                });
            }
        }
    }

    writer.write_code_pair(&CodePair::new_str(RECORD_MARKER_CODE, schema.name))?;

    let id_field_count = schema.id_field_count();
    let mut markers_written = false;
    for (index, field) in schema.fields.iter().enumerate() {
        if index == id_field_count {
            write_subclass_markers(&schema, version, writer)?;
            markers_written = true;
        }
        write_field(record, field, version, writer)?;
    }
    if !markers_written {
        // every field was an id field
        write_subclass_markers(&schema, version, writer)?;
    }

    Ok(())
}

fn write_subclass_markers<T>(
    schema: &RecordSchema,
    version: AcadVersion,
    writer: &mut CodePairWriter<T>,
) -> DxfResult<()>
where
    T: Write,
{
    if version >= schema.subclass_marker_min_version {
        for marker in &schema.subclass_markers {
            writer.write_code_pair(&CodePair::new_str(SUBCLASS_MARKER_CODE, marker))?;
        }
    }
    Ok(())
}

fn write_field<T>(
    record: &Record,
    field: &FieldSchema,
    version: AcadVersion,
    writer: &mut CodePairWriter<T>,
) -> DxfResult<()>
where
    T: Write,
{
    // alias fields are a read-side convenience; the canonical field serializes
    if field.alias_of.is_some() || !field.applies_to(version) {
        return Ok(());
    }

    let values = record.values(field.name);
    if values.is_empty() {
        // absent with a default: omitted, except always-emit fields which write the default
        if field.always_emit {
            if let Some(ref default) = field.default {
                write_value(field, default, writer)?;
            }
        }
        return Ok(());
    }

    if field.repeatable {
        for value in values {
            write_value(field, value, writer)?;
        }
        return Ok(());
    }

    let value = &values[0];
    if !field.always_emit {
        if let Some(ref default) = field.default {
            if default == value {
                return Ok(());
            }
        }
    }
    write_value(field, value, writer)
}

fn write_value<T>(
    field: &FieldSchema,
    value: &CodePairValue,
    writer: &mut CodePairWriter<T>,
) -> DxfResult<()>
where
    T: Write,
{
    match value {
        CodePairValue::Binary(data) => {
            // long payloads continue across lines with the same group code
            for chunk in chunk_bytes(data) {
                writer.write_code_pair(&CodePair::new(
                    field.code,
                    CodePairValue::Binary(chunk.to_vec()),
                    0,
                ))?;
            }
            Ok(())
        }
        other => writer.write_code_pair(&CodePair::new(field.code, other.clone(), 0)),
    }
}
