//! Validation contract shared by policies and followers.
//!
//! The rules themselves live in the types implementing [`Validatable`]; this
//! module only defines how their results are collected.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Structured error messages grouped by category, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Errors {
    entries: IndexMap<String, Vec<String>>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message under `category`.
    pub fn add(&mut self, category: impl Into<String>, message: impl Into<String>) {
        self.entries
            .entry(category.into())
            .or_default()
            .push(message.into());
    }

    /// Add several messages under the same `category`.
    pub fn extend<I>(&mut self, category: impl Into<String>, messages: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.entries
            .entry(category.into())
            .or_default()
            .extend(messages.into_iter().map(Into::into));
    }

    /// Messages recorded under `category`.
    pub fn get(&self, category: &str) -> &[String] {
        self.entries
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All messages, flattened across categories.
    pub fn messages(&self) -> Vec<String> {
        self.entries.values().flatten().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    /// Total number of messages.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(category, messages)| (category.as_str(), messages.as_slice()))
    }
}

/// A type that can check itself and report structured errors.
pub trait Validatable {
    /// Run every rule, recording failures into `errors`.
    fn validate(&self, errors: &mut Errors);

    fn validation_errors(&self) -> Errors {
        let mut errors = Errors::new();
        self.validate(&mut errors);
        errors
    }

    fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }
}
