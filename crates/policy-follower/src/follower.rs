//! The follower capability.
//!
//! A follower type declares its policies once, through
//! [`PolicyDeclarations`], and keeps the resulting [`FollowedPolicies`]
//! where [`Follower::followed_policies`] can reach it (a static or a shared
//! field). Instances then check those policies against their own attributes.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::binding::PolicyBinding;
use crate::catalog::{Namespace, PolicyCatalog};
use crate::config::PolicyConfig;
use crate::error::{PolicyError, Result};
use crate::names::{Name, NameInput};
use crate::policy::PolicyRef;
use crate::registry::FollowedPolicies;
use crate::validation::Errors;

/// A host type that follows external policies.
pub trait Follower {
    /// Bindings declared for this follower type.
    fn followed_policies(&self) -> &FollowedPolicies;

    /// Value of the named attribute, or `None` if the follower has no such
    /// attribute.
    fn policy_attribute(&self, attribute: &Name) -> Result<Option<Value>>;

    fn errors(&self) -> &Errors;

    fn errors_mut(&mut self) -> &mut Errors;

    fn follower_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Apply the selected policies, or all of them when `names` is empty.
    ///
    /// On a violation its messages are copied into [`errors`](Self::errors)
    /// under the configured category and the violation is returned.
    fn apply_policies<I>(&mut self, names: I) -> Result<()>
    where
        Self: Sized,
        I: IntoIterator,
        I::Item: Into<NameInput>,
    {
        let outcome = self.followed_policies().apply_to(&*self, names);

        if let Err(PolicyError::Violation(violation)) = &outcome {
            let category = self.followed_policies().config().error_category.clone();
            warn!(
                follower = %self.follower_name(),
                policy = %violation.policy_name(),
                messages = ?violation.messages(),
                "Policy violated"
            );
            self.errors_mut()
                .extend(category, violation.messages().iter().cloned());
        }

        outcome
    }

    /// Like [`apply_policies`](Self::apply_policies), reporting a violation
    /// as `Ok(false)`. Any other error is returned unchanged.
    fn follows_policies<I>(&mut self, names: I) -> Result<bool>
    where
        Self: Sized,
        I: IntoIterator,
        I::Item: Into<NameInput>,
    {
        match self.apply_policies(names) {
            Ok(()) => Ok(true),
            Err(PolicyError::Violation(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn apply_policy(&mut self, name: impl Into<NameInput>) -> Result<()>
    where
        Self: Sized,
    {
        self.apply_policies([name])
    }

    fn follows_policy(&mut self, name: impl Into<NameInput>) -> Result<bool>
    where
        Self: Sized,
    {
        self.follows_policies([name])
    }
}

/// Read `attribute` from the serialized form of `follower`.
///
/// Suitable for followers whose fields derive `Serialize`.
pub fn serialized_attribute<T>(follower: &T, attribute: &Name) -> Result<Option<Value>>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(follower)? {
        Value::Object(mut fields) => Ok(fields.remove(attribute.as_str())),
        _ => Ok(None),
    }
}

/// Declares the policies followed by a follower type.
///
/// Policies given by name resolve relative to the follower's own scope,
/// unless declared inside [`use_policies`](Self::use_policies).
pub struct PolicyDeclarations<'c> {
    catalog: &'c PolicyCatalog,
    scope: Namespace,
    policies: FollowedPolicies,
}

impl<'c> PolicyDeclarations<'c> {
    pub fn new(catalog: &'c PolicyCatalog, scope: impl Into<Namespace>) -> Self {
        Self::with_config(catalog, scope, PolicyConfig::default())
    }

    pub fn with_config(
        catalog: &'c PolicyCatalog,
        scope: impl Into<Namespace>,
        config: PolicyConfig,
    ) -> Self {
        Self {
            catalog,
            scope: scope.into(),
            policies: FollowedPolicies::with_config(config),
        }
    }

    /// Declarations scoped to the type path of `T`, written with the
    /// catalog's separator.
    pub fn for_follower<T: ?Sized>(catalog: &'c PolicyCatalog) -> Self {
        let path = std::any::type_name::<T>().replace("::", catalog.separator());
        Self::new(catalog, path)
    }

    pub fn scope(&self) -> &Namespace {
        &self.scope
    }

    /// Bind `policy` to `attributes`, optionally under an explicit `name`.
    pub fn follow_policy<A>(
        &mut self,
        policy: impl Into<PolicyRef>,
        attributes: A,
        name: Option<&str>,
    ) -> Result<&mut Self>
    where
        A: IntoIterator,
        A::Item: Into<NameInput>,
    {
        declare(
            &mut self.policies,
            self.catalog,
            &self.scope,
            policy.into(),
            attributes,
            name,
        )?;
        Ok(self)
    }

    /// Run `block` with policy names resolved relative to `namespace`.
    ///
    /// The namespace only exists inside the block, so later declarations
    /// resolve against the follower's own scope again, whether the block
    /// succeeded or not.
    pub fn use_policies<F>(&mut self, namespace: impl Into<Namespace>, block: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut ScopedDeclarations<'_, 'c>) -> Result<()>,
    {
        let mut scoped = ScopedDeclarations {
            catalog: self.catalog,
            namespace: namespace.into(),
            policies: &mut self.policies,
        };
        block(&mut scoped)?;
        Ok(self)
    }

    pub fn finish(self) -> FollowedPolicies {
        self.policies
    }
}

/// Declarations inside a [`PolicyDeclarations::use_policies`] block.
pub struct ScopedDeclarations<'a, 'c> {
    catalog: &'c PolicyCatalog,
    namespace: Namespace,
    policies: &'a mut FollowedPolicies,
}

impl ScopedDeclarations<'_, '_> {
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Bind `policy`, resolving it by name in this block's namespace.
    pub fn follow_policy<A>(
        &mut self,
        policy: impl Into<PolicyRef>,
        attributes: A,
        name: Option<&str>,
    ) -> Result<&mut Self>
    where
        A: IntoIterator,
        A::Item: Into<NameInput>,
    {
        declare(
            self.policies,
            self.catalog,
            &self.namespace,
            policy.into(),
            attributes,
            name,
        )?;
        Ok(self)
    }
}

fn declare<A>(
    policies: &mut FollowedPolicies,
    catalog: &PolicyCatalog,
    namespace: &Namespace,
    policy: PolicyRef,
    attributes: A,
    name: Option<&str>,
) -> Result<()>
where
    A: IntoIterator,
    A::Item: Into<NameInput>,
{
    let name = name.map(Name::new).transpose()?;
    let binding = PolicyBinding::new(catalog, namespace, policy, name, attributes)?;
    policies.add(binding);
    Ok(())
}
