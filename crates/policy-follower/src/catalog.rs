//! Explicit lookup table from qualified names to policy types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PolicyConfig;
use crate::error::{PolicyError, Result};
use crate::policy::{Policy, PolicyType};

/// Scope used to resolve relative policy names. The root namespace is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(pub String);

impl Namespace {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `self` and `name` joined by `separator`.
    pub fn join(&self, name: &str, separator: &str) -> String {
        if self.is_root() {
            name.to_string()
        } else {
            format!("{}{}{}", self.0, separator, name)
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Namespace {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Policy types known to the host program, keyed by qualified path.
///
/// Paths use the configured separator (`::` by default), e.g.
/// `Policies::Consistency`. A path starting with the separator is absolute
/// and ignores the namespace it is resolved in.
#[derive(Debug)]
pub struct PolicyCatalog {
    entries: HashMap<String, PolicyType>,
    separator: String,
}

impl PolicyCatalog {
    pub fn new() -> Self {
        Self::with_config(&PolicyConfig::default())
    }

    pub fn with_config(config: &PolicyConfig) -> Self {
        Self {
            entries: HashMap::new(),
            separator: config.namespace_separator.clone(),
        }
    }

    /// Register `P` under `path`. An existing entry is replaced.
    pub fn register<P: Policy>(&mut self, path: impl Into<String>) -> &mut Self {
        let path: String = path.into();
        let path = self.canonical(&path).to_string();
        let policy = PolicyType::of::<P>();
        if let Some(previous) = self.entries.insert(path.clone(), policy) {
            warn!(path = %path, previous = %previous, "Policy type replaced in catalog");
        }
        info!(path = %path, policy = %policy, "Policy type registered");
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<P: Policy>(mut self, path: impl Into<String>) -> Self {
        self.register::<P>(path);
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(self.canonical(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Resolve `identifier` relative to `namespace`. Either side may carry a
    /// leading separator.
    pub fn resolve(&self, namespace: &Namespace, identifier: &str) -> Result<PolicyType> {
        let path = match identifier.strip_prefix(self.separator.as_str()) {
            Some(absolute) if !self.separator.is_empty() => absolute.to_string(),
            _ => Namespace::new(self.canonical(namespace.as_str()))
                .join(identifier, &self.separator),
        };

        self.entries
            .get(&path)
            .copied()
            .ok_or_else(|| PolicyError::PolicyNotFound {
                namespace: namespace.to_string(),
                policy: identifier.to_string(),
            })
    }

    fn canonical<'a>(&self, path: &'a str) -> &'a str {
        if self.separator.is_empty() {
            return path;
        }
        path.strip_prefix(self.separator.as_str()).unwrap_or(path)
    }
}

impl Default for PolicyCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Errors, Validatable};

    crate::policy! {
        #[derive(Clone, Debug)]
        struct Consistency {
            debet: i64,
            credit: i64,
        }
    }

    impl Validatable for Consistency {
        fn validate(&self, _errors: &mut Errors) {}
    }

    crate::policy! {
        #[derive(Clone, Debug)]
        struct Solvency {
            balance: i64,
        }
    }

    impl Validatable for Solvency {
        fn validate(&self, _errors: &mut Errors) {}
    }

    fn catalog() -> PolicyCatalog {
        PolicyCatalog::new()
            .with::<Consistency>("Policies::Consistency")
            .with::<Solvency>("Solvency")
    }

    #[test]
    fn resolves_relative_to_namespace() {
        let policy = catalog()
            .resolve(&Namespace::new("Policies"), "Consistency")
            .unwrap();
        assert!(policy.is::<Consistency>());
    }

    #[test]
    fn resolves_nested_path_from_root() {
        let policy = catalog()
            .resolve(&Namespace::root(), "Policies::Consistency")
            .unwrap();
        assert!(policy.is::<Consistency>());
    }

    #[test]
    fn absolute_path_ignores_namespace() {
        let policy = catalog()
            .resolve(&Namespace::new("Policies"), "::Solvency")
            .unwrap();
        assert!(policy.is::<Solvency>());
    }

    #[test]
    fn absolute_namespace_resolves_like_relative() {
        let catalog = catalog();
        let policy = catalog
            .resolve(&Namespace::new("::Policies"), "Consistency")
            .unwrap();
        assert!(policy.is::<Consistency>());
        assert!(catalog
            .resolve(&Namespace::new("::"), "Solvency")
            .unwrap()
            .is::<Solvency>());
    }

    #[test]
    fn relative_lookup_does_not_fall_back_to_root() {
        let err = catalog()
            .resolve(&Namespace::new("Policies"), "Solvency")
            .unwrap_err();
        match err {
            PolicyError::PolicyNotFound { namespace, policy } => {
                assert_eq!(namespace, "Policies");
                assert_eq!(policy, "Solvency");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn register_replaces_existing_path() {
        let mut catalog = catalog();
        catalog.register::<Solvency>("Policies::Consistency");
        assert_eq!(catalog.len(), 2);
        assert!(catalog
            .resolve(&Namespace::root(), "Policies::Consistency")
            .unwrap()
            .is::<Solvency>());
    }

    #[test]
    fn leading_separator_is_stripped_on_register() {
        let catalog = PolicyCatalog::new().with::<Solvency>("::Ledger::Solvency");
        assert!(catalog.contains("Ledger::Solvency"));
        assert!(catalog.contains("::Ledger::Solvency"));
    }

    #[test]
    fn custom_separator() {
        let config = PolicyConfig {
            namespace_separator: ".".into(),
            ..PolicyConfig::default()
        };
        let mut catalog = PolicyCatalog::with_config(&config);
        catalog.register::<Solvency>("ledger.Solvency");
        assert!(catalog
            .resolve(&Namespace::new("ledger"), "Solvency")
            .is_ok());
    }

    #[test]
    fn namespace_join() {
        assert_eq!(Namespace::root().join("Foo", "::"), "Foo");
        assert_eq!(Namespace::new("A::B").join("Foo", "::"), "A::B::Foo");
    }
}
