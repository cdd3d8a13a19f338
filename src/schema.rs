use crate::{AcadVersion, CodePairValue, DxfError, DxfResult, ExpectedType};

/// Group code announcing the next record's kind name (or an end-of-section marker).
pub const RECORD_MARKER_CODE: i32 = 0;
/// Group code of an R13+ subclass marker string.
pub const SUBCLASS_MARKER_CODE: i32 = 100;
/// Group code of a comment line; surfaced to the caller, never part of a record.
pub const COMMENT_CODE: i32 = 999;

/// Marker values that end a run of records rather than starting a new one.
pub const END_MARKERS: [&str; 4] = ["ENDSEC", "ENDBLK", "ENDTAB", "EOF"];

pub fn is_end_marker(name: &str) -> bool {
    END_MARKERS.contains(&name)
}

/// A validation rule applied to a field's value when record parsing finishes (and again,
/// hard, before encoding).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Constraint {
    Positive,
    NonNegative,
    NonEmpty,
}

impl Constraint {
    pub fn check(&self, value: &CodePairValue) -> Result<(), String> {
        match (self, value) {
            (Constraint::Positive, CodePairValue::Double(d)) if *d <= 0.0 => {
                Err(format!("expected a positive value but got {}", d))
            }
            (Constraint::Positive, CodePairValue::Integer(i)) if *i <= 0 => {
                Err(format!("expected a positive value but got {}", i))
            }
            (Constraint::NonNegative, CodePairValue::Double(d)) if *d < 0.0 => {
                Err(format!("expected a non-negative value but got {}", d))
            }
            (Constraint::NonNegative, CodePairValue::Integer(i)) if *i < 0 => {
                Err(format!("expected a non-negative value but got {}", i))
            }
            (Constraint::NonEmpty, CodePairValue::Str(s)) if s.is_empty() => {
                Err(String::from("expected a non-empty string"))
            }
            _ => Ok(()),
        }
    }
}

/// One field of a record kind: which group code carries it on the wire, which versions it
/// applies to, its default, and how the decoder and encoder must treat it.  This is the
/// runtime form of what the legacy implementations hard-code once per record kind.
#[derive(Clone, Debug)]
pub struct FieldSchema {
    pub code: i32,
    pub name: &'static str,
    pub expected_type: ExpectedType,
    pub min_version: AcadVersion,
    pub max_version: Option<AcadVersion>,
    pub default: Option<CodePairValue>,
    pub required: bool,
    pub repeatable: bool,
    pub always_emit: bool,
    /// Read-side only: a tag with this code writes into the named canonical field instead.
    /// Alias fields never serialize; the canonical field does.
    pub alias_of: Option<&'static str>,
    /// For binary-chunk fields: the integer field carrying the declared total byte length.
    pub length_field: Option<&'static str>,
    pub constraint: Option<Constraint>,
}

impl FieldSchema {
    pub fn new(code: i32, name: &'static str) -> Self {
        FieldSchema {
            code,
            name,
            // an out-of-band code is caught by schema validation at registration
            expected_type: ExpectedType::expected_type(code).unwrap_or(ExpectedType::Str),
            min_version: AcadVersion::R10,
            max_version: None,
            default: None,
            required: false,
            repeatable: false,
            always_emit: false,
            alias_of: None,
            length_field: None,
            constraint: None,
        }
    }
    /// Declares the field a hex handle even though its code lies in another band (e.g. the
    /// group 5 id, which the wire carries in the string band).
    pub fn as_handle(mut self) -> Self {
        self.expected_type = ExpectedType::Handle;
        self
    }
    pub fn with_min_version(mut self, version: AcadVersion) -> Self {
        self.min_version = version;
        self
    }
    pub fn with_max_version(mut self, version: AcadVersion) -> Self {
        self.max_version = Some(version);
        self
    }
    pub fn with_default(mut self, default: CodePairValue) -> Self {
        self.default = Some(default);
        self
    }
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }
    pub fn always_emit(mut self) -> Self {
        self.always_emit = true;
        self
    }
    pub fn alias_of(mut self, target: &'static str) -> Self {
        self.alias_of = Some(target);
        self
    }
    pub fn with_length_field(mut self, length_field: &'static str) -> Self {
        self.length_field = Some(length_field);
        self
    }
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }
    /// Whether this field exists at the given format version.
    pub fn applies_to(&self, version: AcadVersion) -> bool {
        version >= self.min_version && self.max_version.map_or(true, |max| version <= max)
    }
}

/// The ordered field catalog of one record kind.  Field order is the wire's conventional
/// emission order (id before layer before type-specific data).
#[derive(Clone, Debug)]
pub struct RecordSchema {
    pub name: &'static str,
    pub subclass_markers: Vec<&'static str>,
    pub subclass_marker_min_version: AcadVersion,
    pub fields: Vec<FieldSchema>,
}

impl RecordSchema {
    pub fn new(name: &'static str) -> Self {
        RecordSchema {
            name,
            subclass_markers: vec![],
            subclass_marker_min_version: AcadVersion::R13,
            fields: vec![],
        }
    }
    pub fn with_subclass_markers(mut self, markers: Vec<&'static str>) -> Self {
        self.subclass_markers = markers;
        self
    }
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
    pub fn field_by_code(&self, code: i32) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.code == code)
    }
    /// The number of leading handle-kind fields; subclass markers are emitted immediately
    /// after them.
    pub(crate) fn id_field_count(&self) -> usize {
        self.fields
            .iter()
            .take_while(|f| f.expected_type == ExpectedType::Handle)
            .count()
    }
    /// Structural validation performed once, at registration.
    pub(crate) fn validate(&self) -> DxfResult<()> {
        for (i, field) in self.fields.iter().enumerate() {
            if ExpectedType::expected_type(field.code).is_none() {
                return Err(DxfError::InvalidSchema(format!(
                    "field '{}' of '{}' uses group code {} which lies outside every known band",
                    field.name, self.name, field.code
                )));
            }
            for other in &self.fields[i + 1..] {
                if other.name == field.name {
                    return Err(DxfError::InvalidSchema(format!(
                        "'{}' declares the field name '{}' twice",
                        self.name, field.name
                    )));
                }
                // repeatable covers a field recurring in the stream, never two fields
                // sharing one code
                if other.code == field.code {
                    return Err(DxfError::InvalidSchema(format!(
                        "'{}' declares group code {} twice",
                        self.name, field.code
                    )));
                }
            }
            if let Some(target) = field.alias_of {
                match self.field(target) {
                    Some(t) if t.alias_of.is_none() => (),
                    Some(_) => {
                        return Err(DxfError::InvalidSchema(format!(
                            "alias field '{}' of '{}' targets another alias",
                            field.name, self.name
                        )));
                    }
                    None => {
                        return Err(DxfError::InvalidSchema(format!(
                            "alias field '{}' of '{}' targets the unknown field '{}'",
                            field.name, self.name, target
                        )));
                    }
                }
            }
            if let Some(target) = field.length_field {
                match self.field(target) {
                    Some(t) if t.expected_type.is_integer_kind() => (),
                    Some(_) => {
                        return Err(DxfError::InvalidSchema(format!(
                            "length field '{}' of '{}' is not an integer field",
                            target, self.name
                        )));
                    }
                    None => {
                        return Err(DxfError::InvalidSchema(format!(
                            "field '{}' of '{}' names the unknown length field '{}'",
                            field.name, self.name, target
                        )));
                    }
                }
            }
            if let Some(ref default) = field.default {
                let matches = match (default, field.expected_type) {
                    (CodePairValue::Integer(_), t) if t.is_integer_kind() => true,
                    (CodePairValue::Double(_), ExpectedType::Double) => true,
                    (CodePairValue::Str(_), ExpectedType::Str) => true,
                    (CodePairValue::Handle(_), ExpectedType::Handle) => true,
                    (CodePairValue::Binary(_), ExpectedType::Binary) => true,
                    _ => false,
                };
                if !matches {
                    return Err(DxfError::InvalidSchema(format!(
                        "the default of field '{}' of '{}' is a {} but the field expects {:?}",
                        field.name,
                        self.name,
                        default.kind_name(),
                        field.expected_type
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_version_applicability() {
        let field = FieldSchema::new(40, "radius")
            .with_min_version(AcadVersion::R12)
            .with_max_version(AcadVersion::R2000);
        assert!(!field.applies_to(AcadVersion::R10));
        assert!(field.applies_to(AcadVersion::R12));
        assert!(field.applies_to(AcadVersion::R2000));
        assert!(!field.applies_to(AcadVersion::R2004));
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let schema = RecordSchema::new("BOGUS")
            .with_field(FieldSchema::new(40, "radius"))
            .with_field(FieldSchema::new(40, "also_radius"));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn repeatable_fields_validate() {
        let schema = RecordSchema::new("DICTIONARY")
            .with_field(FieldSchema::new(3, "entry_name").repeatable())
            .with_field(FieldSchema::new(350, "entry_handle").repeatable());
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn alias_must_target_existing_field() {
        let schema =
            RecordSchema::new("BOGUS").with_field(FieldSchema::new(38, "elevation").alias_of("z"));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn default_type_must_match() {
        let schema = RecordSchema::new("BOGUS").with_field(
            FieldSchema::new(40, "radius").with_default(CodePairValue::Str(String::from("no"))),
        );
        assert!(schema.validate().is_err());
    }

    #[test]
    fn id_fields_lead_the_schema() {
        let schema = RecordSchema::new("THING")
            .with_field(FieldSchema::new(5, "handle").as_handle())
            .with_field(FieldSchema::new(330, "owner_handle"))
            .with_field(FieldSchema::new(8, "layer"));
        assert_eq!(2, schema.id_field_count());
    }
}
