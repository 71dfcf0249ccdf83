//! # policy-follower
//!
//! Named, reusable validation policies bound to the attributes of a host
//! ("follower") type, applied in a deterministic order, with failures
//! collected into a single [`Violation`].
//!
//! ## Pipeline
//!
//! 1. **Catalog**: the host program registers its policy types under
//!    qualified paths ([`PolicyCatalog`]).
//! 2. **Declaration**: a follower type declares bindings
//!    ([`PolicyDeclarations`]). Each [`PolicyBinding`] resolves its policy
//!    type and checks the attribute count against the policy's arity up
//!    front.
//! 3. **Registry**: bindings are kept by name in declaration order
//!    ([`FollowedPolicies`]); redeclaring a name replaces the binding.
//! 4. **Application**: an instance applies all or a selection of its
//!    bindings ([`Follower::apply_policies`]). The first violated policy
//!    stops the run; its messages are copied into the follower's own
//!    [`Errors`] before the [`Violation`] is returned.
//!    [`Follower::follows_policies`] answers the same question as a `bool`.
//!
//! ## Example
//!
//! ```
//! use policy_follower::{
//!     policy, Errors, FollowedPolicies, Follower, Name, PolicyCatalog, PolicyDeclarations,
//!     Result, Validatable,
//! };
//! use serde_json::{json, Value};
//!
//! policy! {
//!     #[derive(Clone, Debug)]
//!     pub struct Balanced {
//!         debit: i64,
//!         credit: i64,
//!     }
//! }
//!
//! impl Validatable for Balanced {
//!     fn validate(&self, errors: &mut Errors) {
//!         if self.debit + self.credit != 0 {
//!             errors.add("sum", "must be equal to 0");
//!         }
//!     }
//! }
//!
//! struct Transfer {
//!     withdrawal: i64,
//!     enrollment: i64,
//!     policies: FollowedPolicies,
//!     errors: Errors,
//! }
//!
//! impl Follower for Transfer {
//!     fn followed_policies(&self) -> &FollowedPolicies {
//!         &self.policies
//!     }
//!
//!     fn policy_attribute(&self, attribute: &Name) -> Result<Option<Value>> {
//!         Ok(match attribute.as_str() {
//!             "withdrawal" => Some(json!(self.withdrawal)),
//!             "enrollment" => Some(json!(self.enrollment)),
//!             _ => None,
//!         })
//!     }
//!
//!     fn errors(&self) -> &Errors {
//!         &self.errors
//!     }
//!
//!     fn errors_mut(&mut self) -> &mut Errors {
//!         &mut self.errors
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let catalog = PolicyCatalog::new().with::<Balanced>("Policies::Balanced");
//! let mut declarations = PolicyDeclarations::new(&catalog, "Transfer");
//! declarations.use_policies("Policies", |scope| {
//!     scope.follow_policy("Balanced", ["withdrawal", "enrollment"], Some("balance"))?;
//!     Ok(())
//! })?;
//!
//! let mut transfer = Transfer {
//!     withdrawal: -100,
//!     enrollment: 200,
//!     policies: declarations.finish(),
//!     errors: Errors::new(),
//! };
//!
//! assert!(!transfer.follows_policies(["balance"])?);
//! assert_eq!(transfer.errors().get("base"), ["must be equal to 0"]);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod attributes;
pub mod binding;
pub mod catalog;
pub mod config;
pub mod error;
pub mod follower;
pub mod names;
pub mod policy;
pub mod registry;
pub mod validation;
pub mod violation;

pub use attributes::Attributes;
pub use binding::PolicyBinding;
pub use catalog::{Namespace, PolicyCatalog};
pub use config::PolicyConfig;
pub use error::{PolicyError, Result};
pub use follower::{serialized_attribute, Follower, PolicyDeclarations, ScopedDeclarations};
pub use names::{normalize, Name, NameInput};
pub use policy::{Policy, PolicyRecord, PolicyRef, PolicyType};
pub use registry::FollowedPolicies;
pub use validation::{Errors, Validatable};
pub use violation::Violation;
