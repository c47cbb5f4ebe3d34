//! # Policy Adapters
//!
//! Policies a channel can install under [`CHANNEL_READERS`](crate::ports::CHANNEL_READERS)
//! and a policy manager that allows replacing them while sessions run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use parking_lot::RwLock;

use crate::domain::{PolicyError, SignedData};
use crate::ports::{Policy, PolicyManager};

/// Satisfied by any signature set.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllPolicy;

impl Policy for AcceptAllPolicy {
    fn evaluate(&self, _signatures: &[SignedData]) -> Result<(), PolicyError> {
        Ok(())
    }
}

/// Never satisfied.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectAllPolicy;

impl Policy for RejectAllPolicy {
    fn evaluate(&self, _signatures: &[SignedData]) -> Result<(), PolicyError> {
        Err(PolicyError::Rejected)
    }
}

/// `threshold`-of-members ed25519 signature policy.
///
/// Identities are raw 32-byte verifying keys. Each member counts at most
/// once, however many signatures it contributed.
#[derive(Clone, Debug)]
pub struct SignaturePolicy {
    members: HashSet<[u8; 32]>,
    threshold: usize,
}

impl SignaturePolicy {
    /// Create a policy over `members` requiring `threshold` signers.
    pub fn new(members: impl IntoIterator<Item = [u8; 32]>, threshold: usize) -> Self {
        Self {
            members: members.into_iter().collect(),
            threshold,
        }
    }

    /// Satisfied by any single member.
    pub fn any_of(members: impl IntoIterator<Item = [u8; 32]>) -> Self {
        Self::new(members, 1)
    }

    fn verified_member(&self, signed: &SignedData) -> Option<[u8; 32]> {
        let identity: [u8; 32] = signed.identity.as_slice().try_into().ok()?;
        if !self.members.contains(&identity) {
            return None;
        }
        let key = VerifyingKey::from_bytes(&identity).ok()?;
        let signature = Signature::from_slice(&signed.signature).ok()?;
        key.verify(&signed.data, &signature).ok()?;
        Some(identity)
    }
}

impl Policy for SignaturePolicy {
    fn evaluate(&self, signatures: &[SignedData]) -> Result<(), PolicyError> {
        let signers: HashSet<[u8; 32]> = signatures
            .iter()
            .filter_map(|signed| self.verified_member(signed))
            .collect();

        if signers.len() < self.threshold {
            return Err(PolicyError::NotSatisfied {
                got: signers.len(),
                required: self.threshold,
            });
        }
        Ok(())
    }
}

/// Name → policy map; policies can be replaced at runtime.
#[derive(Default)]
pub struct StaticPolicyManager {
    policies: RwLock<HashMap<String, Arc<dyn Policy>>>,
}

impl StaticPolicyManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration.
    pub fn with_policy(self, name: impl Into<String>, policy: impl Policy + 'static) -> Self {
        self.set_policy(name, Arc::new(policy));
        self
    }

    /// Install or replace the policy under `name`.
    pub fn set_policy(&self, name: impl Into<String>, policy: Arc<dyn Policy>) {
        self.policies.write().insert(name.into(), policy);
    }

    /// Remove the policy under `name`.
    pub fn remove_policy(&self, name: &str) -> bool {
        self.policies.write().remove(name).is_some()
    }
}

impl PolicyManager for StaticPolicyManager {
    fn get_policy(&self, name: &str) -> Option<Arc<dyn Policy>> {
        self.policies.read().get(name).cloned()
    }
}
