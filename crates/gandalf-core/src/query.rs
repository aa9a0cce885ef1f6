//! Record selection by field predicates
//!
//! A [`Filter`] keeps the records whose fields match every `include`
//! predicate and no `exclude` predicate. Fields are looked up with
//! [`HostRecord::field`], so pass-through inventory columns can be
//! filtered on as well; a field the record does not have reads as empty.
//!
//! ```yaml
//! include:
//!   domain: bar.com
//!   entity_type: [comp, head]
//! exclude:
//!   vlan: 12
//! ```
//!
//! Values are compared as text; unquoted numbers and booleans match their
//! decimal or `true`/`false` spelling.

use crate::inventory::HostRecord;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Accepted value(s) for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldMatch {
    /// Exactly this value
    One(String),
    /// Any of these values
    Any(Vec<String>),
}

impl<'de> Deserialize<'de> for FieldMatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Sequence(items) => items
                .iter()
                .map(scalar_text)
                .collect::<Option<Vec<_>>>()
                .map(FieldMatch::Any)
                .ok_or_else(|| D::Error::custom("field match lists may only hold scalars")),
            value => scalar_text(&value)
                .map(FieldMatch::One)
                .ok_or_else(|| D::Error::custom("expected a scalar or a list of scalars")),
        }
    }
}

/// Text form of a YAML scalar, `None` for anything else
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl FieldMatch {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            FieldMatch::One(expected) => expected == value,
            FieldMatch::Any(options) => options.iter().any(|o| o == value),
        }
    }
}

impl From<&str> for FieldMatch {
    fn from(value: &str) -> Self {
        FieldMatch::One(value.to_string())
    }
}

/// Field predicates over host records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Every listed field must match
    #[serde(default)]
    pub include: BTreeMap<String, FieldMatch>,

    /// No listed field may match
    #[serde(default)]
    pub exclude: BTreeMap<String, FieldMatch>,
}

impl Filter {
    /// A filter accepting every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to match
    pub fn include(mut self, field: impl Into<String>, value: impl Into<FieldMatch>) -> Self {
        self.include.insert(field.into(), value.into());
        self
    }

    /// Reject records whose `field` matches
    pub fn exclude(mut self, field: impl Into<String>, value: impl Into<FieldMatch>) -> Self {
        self.exclude.insert(field.into(), value.into());
        self
    }

    /// Whether the filter accepts every record
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn matches(&self, record: &HostRecord) -> bool {
        let field = |name: &str| record.field(name).unwrap_or_default();

        self.include
            .iter()
            .all(|(name, expected)| expected.matches(&field(name)))
            && !self
                .exclude
                .iter()
                .any(|(name, rejected)| rejected.matches(&field(name)))
    }

    /// Matching records, in input order
    pub fn select<'a>(
        &self,
        records: impl IntoIterator<Item = &'a HostRecord>,
    ) -> Vec<&'a HostRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
