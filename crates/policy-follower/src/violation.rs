use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::policy::Policy;

/// Raised when a policy is applied and found invalid.
///
/// The violation owns a snapshot of the policy taken at the moment of
/// failure. Later changes to the live policy do not show up here.
#[derive(Clone)]
pub struct Violation {
    snapshot: Arc<dyn Any + Send + Sync>,
    policy_name: &'static str,
    description: String,
    messages: Vec<String>,
}

impl Violation {
    pub fn new<P: Policy>(policy: &P) -> Self {
        let snapshot = policy.clone();
        let messages = snapshot.messages();
        Self::capture(snapshot, messages)
    }

    /// Like [`new`](Self::new), with messages the caller already collected
    /// from `policy`.
    pub(crate) fn with_messages<P: Policy>(policy: &P, messages: Vec<String>) -> Self {
        Self::capture(policy.clone(), messages)
    }

    fn capture<P: Policy>(snapshot: P, messages: Vec<String>) -> Self {
        let description = format!("{:?}", snapshot);
        Self {
            snapshot: Arc::new(snapshot),
            policy_name: P::policy_name(),
            description,
            messages,
        }
    }

    /// The violated policy, if it is a `P`.
    pub fn policy<P: Policy>(&self) -> Option<&P> {
        self.snapshot.downcast_ref::<P>()
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy_name
    }

    /// Debug rendering of the policy snapshot.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violated: {:?}", self.description, self.messages)
    }
}

impl fmt::Debug for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Violation")
            .field("policy", &self.description)
            .field("messages", &self.messages)
            .finish()
    }
}

impl std::error::Error for Violation {}
