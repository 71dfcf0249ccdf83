use tracing::debug;

use crate::attributes::Attributes;
use crate::catalog::{Namespace, PolicyCatalog};
use crate::error::{PolicyError, Result};
use crate::follower::Follower;
use crate::names::{normalize, Name, NameInput};
use crate::policy::{PolicyRef, PolicyType};

/// A policy type bound to an ordered list of follower attributes.
///
/// Bindings are immutable. The policy type is resolved and the attribute
/// count checked against its arity when the binding is built, so a binding
/// that exists can always be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyBinding {
    policy: PolicyType,
    name: Name,
    attributes: Vec<Name>,
}

impl PolicyBinding {
    /// Build a binding.
    ///
    /// A policy given by name is resolved in `catalog` relative to
    /// `namespace`. Without an explicit `name` the binding gets a random
    /// unique one.
    pub fn new<A>(
        catalog: &PolicyCatalog,
        namespace: &Namespace,
        policy: impl Into<PolicyRef>,
        name: Option<Name>,
        attributes: A,
    ) -> Result<Self>
    where
        A: IntoIterator,
        A::Item: Into<NameInput>,
    {
        let policy = match policy.into() {
            PolicyRef::Type(policy) => policy,
            PolicyRef::Named(identifier) => catalog.resolve(namespace, &identifier)?,
        };
        let name = name.unwrap_or_else(Name::generate);
        let attributes = normalize(attributes)?;

        if attributes.len() != policy.arity() {
            return Err(PolicyError::ArityMismatch {
                policy: policy.name().to_string(),
                required: policy.arity(),
                attributes,
            });
        }

        Ok(Self {
            policy,
            name,
            attributes,
        })
    }

    pub fn policy(&self) -> PolicyType {
        self.policy
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Follower attributes passed to the policy, in order.
    pub fn attributes(&self) -> &[Name] {
        &self.attributes
    }

    /// Apply the policy to the bound attributes of `follower`.
    pub fn apply_to<F: Follower + ?Sized>(&self, follower: &F) -> Result<()> {
        let mut values = Vec::with_capacity(self.attributes.len());
        for attribute in &self.attributes {
            let value = follower.policy_attribute(attribute)?.ok_or_else(|| {
                PolicyError::UnknownAttribute {
                    follower: follower.follower_name().to_string(),
                    attribute: attribute.clone(),
                }
            })?;
            values.push(value);
        }

        debug!(
            binding = %self.name,
            policy = %self.policy,
            follower = %follower.follower_name(),
            "Applying policy"
        );

        let attributes = Attributes::positional(self.policy.name(), self.policy.fields(), values);
        self.policy.apply(&attributes)
    }
}
