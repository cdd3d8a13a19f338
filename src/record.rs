use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::{CodePairValue, DxfError, DxfResult, ExpectedType, Handle, RecordSchema};

/// One decoded (or to-be-encoded) record: a kind reference plus the fields actually present
/// or defaulted.  Repeatable fields hold every value in arrival order; all other fields hold
/// exactly one.  The validity flag is cleared by the decoder when a required field is missing
/// or a constraint fails; such a record is kept for inspection but refused by the encoder.
#[derive(Clone)]
pub struct Record {
    schema: Arc<RecordSchema>,
    fields: IndexMap<&'static str, Vec<CodePairValue>>,
    valid: bool,
}

impl Record {
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        Record {
            schema,
            fields: IndexMap::new(),
            valid: true,
        }
    }
    pub fn kind(&self) -> &str {
        self.schema.name
    }
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }
    pub fn is_valid(&self) -> bool {
        self.valid
    }
    pub(crate) fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }
    /// The first (or only) value of the named field, if present.
    pub fn value(&self, name: &str) -> Option<&CodePairValue> {
        self.fields.get(name).and_then(|vals| vals.first())
    }
    /// Every value of the named field; empty if absent.
    pub fn values(&self, name: &str) -> &[CodePairValue] {
        self.fields.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }
    /// The field's value, falling back to the schema default.
    pub fn value_or_default(&self, name: &str) -> Option<CodePairValue> {
        match self.value(name) {
            Some(v) => Some(v.clone()),
            None => self
                .schema
                .field(name)
                .and_then(|f| f.default.clone()),
        }
    }
    pub fn f64_value(&self, name: &str) -> Option<f64> {
        match self.value(name) {
            Some(CodePairValue::Double(d)) => Some(*d),
            _ => None,
        }
    }
    pub fn i64_value(&self, name: &str) -> Option<i64> {
        match self.value(name) {
            Some(CodePairValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }
    pub fn string_value(&self, name: &str) -> Option<&str> {
        match self.value(name) {
            Some(CodePairValue::Str(s)) => Some(s),
            _ => None,
        }
    }
    pub fn handle_value(&self, name: &str) -> Option<Handle> {
        match self.value(name) {
            Some(CodePairValue::Handle(h)) => Some(*h),
            _ => None,
        }
    }
    pub fn binary_value(&self, name: &str) -> Option<&[u8]> {
        match self.value(name) {
            Some(CodePairValue::Binary(data)) => Some(data),
            _ => None,
        }
    }
    /// Replaces the field's value.  The name must exist in the schema and the value must
    /// match the field's declared type; an alias name resolves to its canonical field.
    pub fn set_value(&mut self, name: &str, value: CodePairValue) -> DxfResult<()> {
        let (name, field_type) = self.resolve_field(name)?;
        self.check_type(name, field_type, &value)?;
        self.fields.insert(name, vec![value]);
        Ok(())
    }
    /// Appends a value to a repeatable field.
    pub fn push_value(&mut self, name: &str, value: CodePairValue) -> DxfResult<()> {
        let (name, field_type) = self.resolve_field(name)?;
        self.check_type(name, field_type, &value)?;
        self.fields.entry(name).or_default().push(value);
        Ok(())
    }
    pub fn set_f64(&mut self, name: &str, value: f64) -> DxfResult<()> {
        self.set_value(name, CodePairValue::Double(value))
    }
    pub fn set_i64(&mut self, name: &str, value: i64) -> DxfResult<()> {
        self.set_value(name, CodePairValue::Integer(value))
    }
    pub fn set_string(&mut self, name: &str, value: &str) -> DxfResult<()> {
        self.set_value(name, CodePairValue::Str(String::from(value)))
    }
    pub fn set_handle(&mut self, name: &str, value: Handle) -> DxfResult<()> {
        self.set_value(name, CodePairValue::Handle(value))
    }
    pub fn set_binary(&mut self, name: &str, value: Vec<u8>) -> DxfResult<()> {
        self.set_value(name, CodePairValue::Binary(value))
    }
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().copied()
    }
    fn resolve_field(&self, name: &str) -> DxfResult<(&'static str, ExpectedType)> {
        let field = match self.schema.field(name) {
            Some(f) => f,
            None => {
                return Err(DxfError::UnknownField {
                    record_kind: String::from(self.schema.name),
                    field: String::from(name),
                });
            }
        };
        match field.alias_of {
            Some(target) => {
                // validated at registration, so the canonical field exists
                let canonical = self.schema.field(target).ok_or_else(|| {
                    DxfError::UnknownField {
                        record_kind: String::from(self.schema.name),
                        field: String::from(target),
                    }
                })?;
                Ok((canonical.name, canonical.expected_type))
            }
            None => Ok((field.name, field.expected_type)),
        }
    }
    fn check_type(
        &self,
        name: &str,
        field_type: ExpectedType,
        value: &CodePairValue,
    ) -> DxfResult<()> {
        let matches = match (value, field_type) {
            (CodePairValue::Integer(_), t) if t.is_integer_kind() => true,
            (CodePairValue::Double(_), ExpectedType::Double) => true,
            (CodePairValue::Str(_), ExpectedType::Str) => true,
            (CodePairValue::Handle(_), ExpectedType::Handle) => true,
            (CodePairValue::Binary(_), ExpectedType::Binary) => true,
            _ => false,
        };
        if matches {
            Ok(())
        } else {
            Err(DxfError::InvalidFieldValue {
                record_kind: String::from(self.schema.name),
                field: String::from(name),
                reason: format!(
                    "a {} value cannot populate a {:?} field",
                    value.kind_name(),
                    field_type
                ),
            })
        }
    }
}

impl Debug for Record {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{} {{ ", self.schema.name)?;
        for (name, values) in &self.fields {
            if values.len() == 1 {
                write!(formatter, "{}: {:?}, ", name, values[0])?;
            } else {
                write!(formatter, "{}: {:?}, ", name, values)?;
            }
        }
        write!(formatter, "}}")
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Record) -> bool {
        // records compare by kind and field values; validity is derived state
        self.schema.name == other.schema.name && self.fields == other.fields
    }
}

#[cfg(test)]
mod tests {
    use crate::{CodePairValue, Record, SchemaRegistry};

    fn circle() -> Record {
        Record::new(SchemaRegistry::builtin().lookup("CIRCLE").unwrap())
    }

    #[test]
    fn typed_set_and_get() {
        let mut record = circle();
        record.set_f64("radius", 2.5).unwrap();
        record.set_string("layer", "walls").unwrap();
        assert_eq!(Some(2.5), record.f64_value("radius"));
        assert_eq!(Some("walls"), record.string_value("layer"));
        assert_eq!(None, record.f64_value("thickness"));
    }

    #[test]
    fn set_unknown_field_is_rejected() {
        let mut record = circle();
        assert!(record.set_f64("no_such_field", 1.0).is_err());
    }

    #[test]
    fn set_with_wrong_type_is_rejected() {
        let mut record = circle();
        assert!(record.set_string("radius", "not a double").is_err());
    }

    #[test]
    fn alias_resolves_to_canonical_field() {
        let mut record = circle();
        record.set_f64("elevation", 3.0).unwrap();
        assert_eq!(Some(3.0), record.f64_value("center_z"));
    }

    #[test]
    fn value_or_default_falls_back_to_schema() {
        let record = circle();
        assert_eq!(
            Some(CodePairValue::Str(String::from("0"))),
            record.value_or_default("layer")
        );
        assert_eq!(None, record.value_or_default("radius"));
    }

    #[test]
    fn records_compare_by_fields_not_validity() {
        let mut a = circle();
        let mut b = circle();
        a.set_f64("radius", 1.0).unwrap();
        b.set_f64("radius", 1.0).unwrap();
        b.set_valid(false);
        assert_eq!(a, b);
    }
}
