//! The built-in record-kind catalog.  Everything here is data; the decoder and encoder never
//! special-case a kind by name.  Field order is the wire's conventional emission order.

use crate::{AcadVersion, CodePairValue, Constraint, FieldSchema, Handle, RecordSchema};

fn str_default(val: &str) -> CodePairValue {
    CodePairValue::Str(String::from(val))
}

/// Common leading fields shared by the graphical entity kinds: id, layer, linetype, color.
fn entity_common(schema: RecordSchema) -> RecordSchema {
    schema
        .with_field(FieldSchema::new(5, "handle").as_handle())
        .with_field(
            FieldSchema::new(8, "layer")
                .with_default(str_default("0"))
                .always_emit(),
        )
        .with_field(FieldSchema::new(6, "linetype").with_default(str_default("BYLAYER")))
        .with_field(FieldSchema::new(62, "color").with_default(CodePairValue::Integer(256)))
}

fn extrusion(schema: RecordSchema) -> RecordSchema {
    schema
        .with_field(
            FieldSchema::new(210, "extrusion_x")
                .with_min_version(AcadVersion::R11)
                .with_default(CodePairValue::Double(0.0)),
        )
        .with_field(
            FieldSchema::new(220, "extrusion_y")
                .with_min_version(AcadVersion::R11)
                .with_default(CodePairValue::Double(0.0)),
        )
        .with_field(
            FieldSchema::new(230, "extrusion_z")
                .with_min_version(AcadVersion::R11)
                .with_default(CodePairValue::Double(1.0)),
        )
}

fn line() -> RecordSchema {
    let schema = entity_common(RecordSchema::new("LINE"))
        .with_subclass_markers(vec!["AcDbEntity", "AcDbLine"])
        .with_field(FieldSchema::new(39, "thickness").with_default(CodePairValue::Double(0.0)))
        .with_field(
            FieldSchema::new(10, "p1_x")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(20, "p1_y")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(30, "p1_z")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(11, "p2_x")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(21, "p2_y")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(31, "p2_z")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        );
    extrusion(schema)
}

fn point() -> RecordSchema {
    let schema = entity_common(RecordSchema::new("POINT"))
        .with_subclass_markers(vec!["AcDbEntity", "AcDbPoint"])
        .with_field(FieldSchema::new(39, "thickness").with_default(CodePairValue::Double(0.0)))
        .with_field(
            FieldSchema::new(10, "location_x")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(20, "location_y")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(30, "location_z")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(50, "angle")
                .with_min_version(AcadVersion::R14)
                .with_default(CodePairValue::Double(0.0)),
        );
    extrusion(schema)
}

/// Shared shape of CIRCLE and ARC.  The pre-R13 `38` elevation tag feeds the canonical
/// center z coordinate; it is never written back.
fn circle_like(schema: RecordSchema) -> RecordSchema {
    schema
        .with_field(FieldSchema::new(39, "thickness").with_default(CodePairValue::Double(0.0)))
        .with_field(
            FieldSchema::new(10, "center_x")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(20, "center_y")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(30, "center_z")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(38, "elevation")
                .with_max_version(AcadVersion::R12)
                .alias_of("center_z"),
        )
        .with_field(
            FieldSchema::new(40, "radius")
                .required()
                .with_constraint(Constraint::Positive),
        )
}

fn circle() -> RecordSchema {
    let schema = circle_like(
        entity_common(RecordSchema::new("CIRCLE"))
            .with_subclass_markers(vec!["AcDbEntity", "AcDbCircle"]),
    );
    extrusion(schema)
}

fn arc() -> RecordSchema {
    let schema = circle_like(
        entity_common(RecordSchema::new("ARC"))
            .with_subclass_markers(vec!["AcDbEntity", "AcDbCircle", "AcDbArc"]),
    )
    .with_field(
        FieldSchema::new(50, "start_angle")
            .with_default(CodePairValue::Double(0.0))
            .always_emit(),
    )
    .with_field(
        FieldSchema::new(51, "end_angle")
            .with_default(CodePairValue::Double(360.0))
            .always_emit(),
    );
    extrusion(schema)
}

fn tolerance() -> RecordSchema {
    entity_common(RecordSchema::new("TOLERANCE"))
        .with_subclass_markers(vec!["AcDbEntity", "AcDbFcf"])
        .with_field(
            FieldSchema::new(3, "dimension_style")
                .with_min_version(AcadVersion::R13)
                .with_default(str_default("STANDARD")),
        )
        .with_field(
            FieldSchema::new(10, "insertion_x")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(20, "insertion_y")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(
            FieldSchema::new(30, "insertion_z")
                .with_default(CodePairValue::Double(0.0))
                .always_emit(),
        )
        .with_field(FieldSchema::new(1, "text").required())
        .with_field(
            FieldSchema::new(11, "direction_x").with_default(CodePairValue::Double(1.0)),
        )
        .with_field(
            FieldSchema::new(21, "direction_y").with_default(CodePairValue::Double(0.0)),
        )
        .with_field(
            FieldSchema::new(31, "direction_z").with_default(CodePairValue::Double(0.0)),
        )
}

fn ole2frame() -> RecordSchema {
    entity_common(RecordSchema::new("OLE2FRAME"))
        .with_subclass_markers(vec!["AcDbEntity", "AcDbOle2Frame"])
        .with_field(
            FieldSchema::new(70, "ole_version")
                .with_min_version(AcadVersion::R14)
                .with_default(CodePairValue::Integer(2)),
        )
        .with_field(
            FieldSchema::new(90, "data_length")
                .with_min_version(AcadVersion::R14)
                .required(),
        )
        .with_field(
            FieldSchema::new(310, "data")
                .with_min_version(AcadVersion::R14)
                .repeatable()
                .with_length_field("data_length"),
        )
}

fn dictionary() -> RecordSchema {
    RecordSchema::new("DICTIONARY")
        .with_subclass_markers(vec!["AcDbDictionary"])
        .with_field(FieldSchema::new(5, "handle").as_handle())
        .with_field(
            FieldSchema::new(330, "owner_handle")
                .with_min_version(AcadVersion::R13)
                .with_default(CodePairValue::Handle(Handle(0))),
        )
        .with_field(
            FieldSchema::new(280, "hard_owner")
                .with_min_version(AcadVersion::R2000)
                .with_default(CodePairValue::Integer(0)),
        )
        .with_field(
            FieldSchema::new(281, "duplicate_record_cloning")
                .with_min_version(AcadVersion::R2000)
                .with_default(CodePairValue::Integer(1)),
        )
        .with_field(FieldSchema::new(3, "entry_name").repeatable())
        .with_field(FieldSchema::new(350, "entry_handle").repeatable())
}

fn group() -> RecordSchema {
    RecordSchema::new("GROUP")
        .with_subclass_markers(vec!["AcDbGroup"])
        .with_field(FieldSchema::new(5, "handle").as_handle())
        .with_field(
            FieldSchema::new(330, "owner_handle")
                .with_default(CodePairValue::Handle(Handle(0))),
        )
        .with_field(FieldSchema::new(300, "description").with_default(str_default("")))
        .with_field(FieldSchema::new(70, "unnamed").with_default(CodePairValue::Integer(0)))
        .with_field(FieldSchema::new(71, "selectable").with_default(CodePairValue::Integer(1)))
        .with_field(FieldSchema::new(340, "entity_handle").repeatable())
}

pub(crate) fn builtin_schemas() -> Vec<RecordSchema> {
    vec![
        line(),
        point(),
        circle(),
        arc(),
        tolerance(),
        ole2frame(),
        dictionary(),
        group(),
    ]
}

#[cfg(test)]
mod tests {
    use super::builtin_schemas;

    #[test]
    fn every_builtin_schema_validates() {
        for schema in builtin_schemas() {
            schema.validate().unwrap_or_else(|e| {
                panic!("schema '{}' failed validation: {}", schema.name, e)
            });
        }
    }

    #[test]
    fn group_kinds_are_objects_not_entities() {
        // object kinds have no layer field
        for schema in builtin_schemas() {
            match schema.name {
                "DICTIONARY" | "GROUP" => assert!(schema.field("layer").is_none()),
                _ => assert!(schema.field("layer").is_some()),
            }
        }
    }
}
