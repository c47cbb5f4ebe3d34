//! # Signature Filter
//!
//! Authorization gate for deliver requests: evaluates a fixed policy of
//! the channel over the envelope's signature set.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Envelope, PolicyError};
use crate::ports::PolicyManager;

/// Outcome of applying a filter to an envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterResult {
    /// The envelope may proceed.
    Forward,
    /// The envelope is denied.
    Reject,
}

/// Evaluates one named policy against signed envelopes.
pub struct SignatureFilter {
    policy_name: String,
    policy_manager: Arc<dyn PolicyManager>,
}

impl SignatureFilter {
    /// Create a filter for `policy_name` resolved through `policy_manager`.
    pub fn new(policy_name: impl Into<String>, policy_manager: Arc<dyn PolicyManager>) -> Self {
        Self {
            policy_name: policy_name.into(),
            policy_manager,
        }
    }

    /// Forward when the policy exists and is satisfied, reject otherwise.
    pub fn apply(&self, envelope: &Envelope) -> FilterResult {
        let signed_data = match envelope.as_signed_data() {
            Ok(signed_data) => signed_data,
            Err(e) => {
                debug!(policy = %self.policy_name, error = %e, "Envelope has no signature set");
                return FilterResult::Reject;
            }
        };

        let evaluated = self
            .policy_manager
            .get_policy(&self.policy_name)
            .ok_or_else(|| PolicyError::PolicyNotFound(self.policy_name.clone()))
            .and_then(|policy| policy.evaluate(&signed_data));

        match evaluated {
            Ok(()) => FilterResult::Forward,
            Err(e) => {
                debug!(policy = %self.policy_name, error = %e, "Policy evaluation failed");
                FilterResult::Reject
            }
        }
    }
}
