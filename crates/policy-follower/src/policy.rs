//! Policy object interface.
//!
//! A policy is a small record of attribute values plus validation rules.
//! Followers never build policies directly: a binding extracts the bound
//! attributes into an [`Attributes`] record and hands it to the policy type
//! through [`PolicyType::apply`].

use std::any::TypeId;
use std::fmt;

use crate::attributes::Attributes;
use crate::error::Result;
use crate::validation::Validatable;
use crate::violation::Violation;

/// Fixed-shape record that can be built from attribute values.
pub trait PolicyRecord: Sized {
    /// Declared attribute fields, in positional order.
    const FIELDS: &'static [&'static str];

    fn from_attributes(attributes: &Attributes) -> Result<Self>;
}

/// The contract a policy type satisfies.
pub trait Policy:
    PolicyRecord + Validatable + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Display name used in messages. Defaults to the full type path.
    fn policy_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Number of attributes a binding must supply.
    fn arity() -> usize {
        Self::FIELDS.len()
    }

    /// Flattened error messages, empty when valid.
    fn messages(&self) -> Vec<String> {
        self.validation_errors().messages()
    }

    /// Fails with a [`Violation`] unless [`is_valid`](Validatable::is_valid)
    /// holds. The violation carries [`messages`](Self::messages), which may
    /// be empty when `is_valid` is overridden.
    fn apply(&self) -> std::result::Result<(), Violation> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Violation::with_messages(self, self.messages()))
        }
    }

    /// Construct from `attributes` and apply.
    fn apply_attributes(attributes: &Attributes) -> Result<()> {
        Self::from_attributes(attributes)?.apply()?;
        Ok(())
    }
}

/// Type-erased handle to a concrete policy type.
#[derive(Clone, Copy)]
pub struct PolicyType {
    type_id: TypeId,
    name: &'static str,
    fields: &'static [&'static str],
    apply: fn(&Attributes) -> Result<()>,
}

impl PolicyType {
    pub fn of<P: Policy>() -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            name: P::policy_name(),
            fields: P::FIELDS,
            apply: P::apply_attributes,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Whether this handle refers to `P`.
    pub fn is<P: Policy>(&self) -> bool {
        self.type_id == TypeId::of::<P>()
    }

    /// Construct the policy from `attributes` and apply it.
    pub fn apply(&self, attributes: &Attributes) -> Result<()> {
        (self.apply)(attributes)
    }
}

impl PartialEq for PolicyType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for PolicyType {}

impl fmt::Debug for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyType")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A policy given either as a concrete type or by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolicyRef {
    Type(PolicyType),
    Named(String),
}

impl PolicyRef {
    pub fn of<P: Policy>() -> Self {
        PolicyRef::Type(PolicyType::of::<P>())
    }
}

impl From<PolicyType> for PolicyRef {
    fn from(policy: PolicyType) -> Self {
        PolicyRef::Type(policy)
    }
}

impl From<&str> for PolicyRef {
    fn from(name: &str) -> Self {
        PolicyRef::Named(name.to_string())
    }
}

impl From<String> for PolicyRef {
    fn from(name: String) -> Self {
        PolicyRef::Named(name)
    }
}

/// Declares a policy record and implements [`Policy`] for it.
///
/// Validation rules are supplied separately by implementing
/// [`Validatable`](crate::Validatable).
///
/// ```
/// use policy_follower::{policy, Errors, Validatable};
///
/// policy! {
///     #[derive(Clone, Debug)]
///     pub struct Balanced {
///         debit: i64,
///         credit: i64,
///     }
/// }
///
/// impl Validatable for Balanced {
///     fn validate(&self, errors: &mut Errors) {
///         if self.debit + self.credit != 0 {
///             errors.add("sum", "must be equal to 0");
///         }
///     }
/// }
/// ```
#[macro_export]
macro_rules! policy {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($field_vis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($field_vis $field: $ty),*
        }

        impl $crate::PolicyRecord for $name {
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];

            fn from_attributes(
                attributes: &$crate::Attributes,
            ) -> $crate::Result<Self> {
                Ok(Self {
                    $($field: attributes.get_as(stringify!($field))?),*
                })
            }
        }

        impl $crate::Policy for $name {}
    };
}
