//! Canonical identifiers and the normalizer that flattens user input into them.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, Result};

/// A canonical identifier for bindings and follower attributes.
///
/// Any non-empty string is accepted except one containing whitespace or
/// control characters; such input fails with
/// [`PolicyError::InvalidIdentifier`] instead of becoming a name that no
/// attribute or binding could ever match.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Build a name, rejecting empty input and input with whitespace or
    /// control characters.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(PolicyError::InvalidIdentifier(value));
        }
        Ok(Self(value))
    }

    /// A fresh random token (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Name {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Name {
    type Error = PolicyError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

/// Raw identifier input: a single identifier or an arbitrarily nested list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameInput {
    Ident(String),
    List(Vec<NameInput>),
}

impl From<&str> for NameInput {
    fn from(value: &str) -> Self {
        NameInput::Ident(value.to_string())
    }
}

impl From<String> for NameInput {
    fn from(value: String) -> Self {
        NameInput::Ident(value)
    }
}

impl From<&String> for NameInput {
    fn from(value: &String) -> Self {
        NameInput::Ident(value.clone())
    }
}

impl From<Name> for NameInput {
    fn from(value: Name) -> Self {
        NameInput::Ident(value.0)
    }
}

impl From<&Name> for NameInput {
    fn from(value: &Name) -> Self {
        NameInput::Ident(value.0.clone())
    }
}

impl<T: Into<NameInput>> From<Vec<T>> for NameInput {
    fn from(items: Vec<T>) -> Self {
        NameInput::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<NameInput>, const N: usize> From<[T; N]> for NameInput {
    fn from(items: [T; N]) -> Self {
        NameInput::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<NameInput> + Clone> From<&[T]> for NameInput {
    fn from(items: &[T]) -> Self {
        NameInput::List(items.iter().cloned().map(Into::into).collect())
    }
}

/// Flatten `items` into canonical names.
///
/// Order is preserved and repeats are kept: selecting the same binding twice
/// applies it twice.
pub fn normalize<I>(items: I) -> Result<Vec<Name>>
where
    I: IntoIterator,
    I::Item: Into<NameInput>,
{
    let mut names = Vec::new();
    for item in items {
        flatten_into(item.into(), &mut names)?;
    }
    Ok(names)
}

fn flatten_into(input: NameInput, out: &mut Vec<Name>) -> Result<()> {
    match input {
        NameInput::Ident(value) => out.push(Name::new(value)?),
        NameInput::List(items) => {
            for item in items {
                flatten_into(item, out)?;
            }
        }
    }
    Ok(())
}

/// Renders names as `[a, b, c]`.
pub(crate) fn display_list(names: &[Name]) -> String {
    let joined = names
        .iter()
        .map(Name::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}
