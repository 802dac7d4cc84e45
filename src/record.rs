//! `DynamicRecord`: an in-memory `Record` implementation for tests, doctests,
//! and embedders without a pre-existing record type to wrap. This is
//! supplemental ambient convenience (SPEC_FULL.md's Field-Path Resolver
//! section), not part of the engine's own contract -- built the way
//! `formulas/tests.rs` builds an in-memory grid to exercise the resolver.

use std::collections::HashMap;

use crate::resolver::{FieldValue, Record};
use crate::value::Value;

enum Slot {
    Scalar(Value),
    Nested(DynamicRecord),
    Collection(Vec<DynamicRecord>),
}

/// A name -> value/nested-record/collection map, keyed case-insensitively.
#[derive(Default)]
pub struct DynamicRecord {
    fields: HashMap<String, Slot>,
}

impl DynamicRecord {
    pub fn new() -> Self {
        Self { fields: HashMap::new() }
    }

    pub fn with_scalar(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_ascii_lowercase(), Slot::Scalar(value.into()));
        self
    }

    pub fn with_nested(mut self, name: &str, record: DynamicRecord) -> Self {
        self.fields.insert(name.to_ascii_lowercase(), Slot::Nested(record));
        self
    }

    pub fn with_collection(mut self, name: &str, records: Vec<DynamicRecord>) -> Self {
        self.fields.insert(name.to_ascii_lowercase(), Slot::Collection(records));
        self
    }
}

impl Record for DynamicRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match self.fields.get(&name.to_ascii_lowercase())? {
            Slot::Scalar(v) => Some(FieldValue::Scalar(v.clone())),
            Slot::Nested(r) => Some(FieldValue::Nested(r)),
            Slot::Collection(items) => {
                Some(FieldValue::Collection(Box::new(items.iter().map(|r| r as &dyn Record))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let r = DynamicRecord::new().with_scalar("Price", 65.25);
        assert!(matches!(r.field("PRICE"), Some(FieldValue::Scalar(Value::Number(n))) if n == 65.25));
    }

    #[test]
    fn test_unknown_field_is_none() {
        let r = DynamicRecord::new();
        assert!(r.field("missing").is_none());
    }
}
