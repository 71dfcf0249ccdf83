//! Attribute records handed from a follower to a policy.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PolicyError, Result};

/// Ordered field/value record used to construct a policy.
///
/// Fields are assigned positionally from the policy's declared field list,
/// so the record mirrors the policy struct without depending on its type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    policy: String,
    fields: Vec<(String, Value)>,
}

impl Attributes {
    /// An empty record destined for `policy`.
    pub fn new(policy: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            fields: Vec::new(),
        }
    }

    /// Pair `fields` with `values` in order.
    pub fn positional<I>(policy: impl Into<String>, fields: &[&str], values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            policy: policy.into(),
            fields: fields
                .iter()
                .map(|field| field.to_string())
                .zip(values)
                .collect(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set `field`, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Decode `field` into `T`. An unset field decodes from `null`.
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<T> {
        let value = self.get(field).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| PolicyError::InvalidAttribute {
            policy: self.policy.clone(),
            field: field.to_string(),
            reason: err.to_string(),
        })
    }

    /// Name of the policy this record is built for.
    pub fn policy(&self) -> &str {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .map(|(field, value)| (field.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn positional_pairs_fields_in_order() {
        let attrs = Attributes::positional("Consistency", &["debet", "credit"], [json!(-5), json!(5)]);
        let fields: Vec<_> = attrs.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["debet", "credit"]);
        assert_eq!(attrs.get("credit"), Some(&json!(5)));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn get_as_decodes_values() {
        let attrs = Attributes::new("Range").with("min", 1).with("max", 10);
        let min: i64 = attrs.get_as("min").unwrap();
        assert_eq!(min, 1);

        let missing: Option<i64> = attrs.get_as("step").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn get_as_reports_decode_failure() {
        let attrs = Attributes::new("Range").with("min", "one");
        let err = attrs.get_as::<i64>("min").unwrap_err();
        match err {
            PolicyError::InvalidAttribute { policy, field, .. } => {
                assert_eq!(policy, "Range");
                assert_eq!(field, "min");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn insert_replaces_existing_field() {
        let mut attrs = Attributes::new("Range").with("min", 1);
        attrs.insert("min", 2);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("min"), Some(&json!(2)));
    }
}
