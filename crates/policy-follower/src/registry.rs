use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::binding::PolicyBinding;
use crate::config::PolicyConfig;
use crate::error::Result;
use crate::follower::Follower;
use crate::names::{normalize, Name, NameInput};

/// Policies followed by a follower type, keyed by binding name.
///
/// Iteration follows registration order. Registering a binding under an
/// existing name replaces it in place.
#[derive(Clone, Debug, Default)]
pub struct FollowedPolicies {
    bindings: IndexMap<Name, PolicyBinding>,
    config: PolicyConfig,
}

impl FollowedPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PolicyConfig) -> Self {
        Self {
            bindings: IndexMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Register `binding` under its name. The last registration wins.
    pub fn add(&mut self, binding: PolicyBinding) {
        let name = binding.name().clone();
        let policy = binding.policy();
        if self.bindings.insert(name.clone(), binding).is_some() {
            warn!(binding = %name, policy = %policy, "Followed policy redefined");
        } else {
            info!(binding = %name, policy = %policy, "Followed policy added");
        }
    }

    pub fn get(&self, name: &str) -> Option<&PolicyBinding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Binding names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.bindings.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicyBinding> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Apply the bindings selected by `names` to `follower`.
    ///
    /// With no names every binding is applied in registration order.
    /// Otherwise the given names are applied in the given order, repeats
    /// included; names without a binding are skipped. The first failure
    /// stops the run.
    pub fn apply_to<F, I>(&self, follower: &F, names: I) -> Result<()>
    where
        F: Follower + ?Sized,
        I: IntoIterator,
        I::Item: Into<NameInput>,
    {
        for binding in self.select(names)? {
            binding.apply_to(follower)?;
        }
        Ok(())
    }

    fn select<I>(&self, names: I) -> Result<Vec<&PolicyBinding>>
    where
        I: IntoIterator,
        I::Item: Into<NameInput>,
    {
        let names = normalize(names)?;
        if names.is_empty() {
            return Ok(self.bindings.values().collect());
        }

        Ok(names
            .iter()
            .filter_map(|name| {
                let binding = self.bindings.get(name);
                if binding.is_none() {
                    debug!(binding = %name, "Skipping unknown policy name");
                }
                binding
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::catalog::{Namespace, PolicyCatalog};
    use crate::policy::PolicyRef;
    use crate::validation::{Errors, Validatable};
    use serde_json::{json, Value};

    crate::policy! {
        #[derive(Clone, Debug)]
        struct Probe {
            label: String,
        }
    }

    thread_local! {
        static APPLIED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    impl Validatable for Probe {
        fn validate(&self, errors: &mut Errors) {
            if self.label.starts_with("bad") {
                errors.add("label", format!("{} is broken", self.label));
            }
        }

        // Records each application once; messages are only read on failure.
        fn is_valid(&self) -> bool {
            APPLIED.with(|applied| applied.borrow_mut().push(self.label.clone()));
            self.validation_errors().is_empty()
        }
    }

    fn applied() -> Vec<String> {
        APPLIED.with(|applied| applied.borrow_mut().drain(..).collect())
    }

    struct Labels {
        registry: FollowedPolicies,
        errors: Errors,
    }

    impl Follower for Labels {
        fn followed_policies(&self) -> &FollowedPolicies {
            &self.registry
        }

        // Every attribute evaluates to its own name.
        fn policy_attribute(&self, attribute: &Name) -> Result<Option<Value>> {
            Ok(Some(json!(attribute.as_str())))
        }

        fn errors(&self) -> &Errors {
            &self.errors
        }

        fn errors_mut(&mut self) -> &mut Errors {
            &mut self.errors
        }
    }

    fn binding(name: &str, attribute: &str) -> PolicyBinding {
        PolicyBinding::new(
            &PolicyCatalog::new(),
            &Namespace::root(),
            PolicyRef::of::<Probe>(),
            Some(Name::new(name).unwrap()),
            [attribute],
        )
        .unwrap()
    }

    fn registry() -> FollowedPolicies {
        let mut registry = FollowedPolicies::new();
        registry.add(binding("first", "one"));
        registry.add(binding("second", "two"));
        registry.add(binding("third", "three"));
        registry
    }

    fn follower() -> Labels {
        Labels {
            registry: FollowedPolicies::new(),
            errors: Errors::new(),
        }
    }

    const NONE: [&str; 0] = [];

    #[test]
    fn add_registers_by_name() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("second"));
        let names: Vec<_> = registry.names().map(Name::as_str).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = FollowedPolicies::new();
        registry.add(binding("x", "old"));
        registry.add(binding("x", "new"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("x").unwrap().attributes()[0].as_str(), "new");
    }

    #[test]
    fn redefinition_keeps_original_position() {
        let mut registry = registry();
        registry.add(binding("first", "again"));
        let names: Vec<_> = registry.names().map(Name::as_str).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn applies_all_in_insertion_order_by_default() {
        applied();
        registry().apply_to(&follower(), NONE).unwrap();
        assert_eq!(applied(), vec!["one", "two", "three"]);
    }

    #[test]
    fn applies_selected_names_in_given_order() {
        applied();
        registry().apply_to(&follower(), ["third", "first"]).unwrap();
        assert_eq!(applied(), vec!["three", "one"]);
    }

    #[test]
    fn repeated_names_apply_repeatedly() {
        applied();
        registry()
            .apply_to(&follower(), ["third", "third", "third"])
            .unwrap();
        assert_eq!(applied(), vec!["three", "three", "three"]);
    }

    #[test]
    fn unknown_names_are_skipped() {
        applied();
        registry()
            .apply_to(&follower(), [vec!["third", "first", "forth"]])
            .unwrap();
        assert_eq!(applied(), vec!["three", "one"]);
    }

    #[test]
    fn only_unknown_names_apply_nothing() {
        applied();
        registry().apply_to(&follower(), ["missing"]).unwrap();
        assert!(applied().is_empty());
    }

    #[test]
    fn stops_at_first_violation() {
        let mut registry = FollowedPolicies::new();
        registry.add(binding("ok", "fine"));
        registry.add(binding("broken", "bad-one"));
        registry.add(binding("also-broken", "bad-two"));

        applied();
        let err = registry.apply_to(&follower(), NONE).unwrap_err();
        assert_eq!(applied(), vec!["fine", "bad-one"]);
        assert_eq!(
            err.as_violation().unwrap().messages(),
            ["bad-one is broken"]
        );
    }

    #[test]
    fn invalid_selection_name_is_an_error() {
        let err = registry().apply_to(&follower(), [""]).unwrap_err();
        assert!(matches!(err, crate::PolicyError::InvalidIdentifier(_)));
    }
}
