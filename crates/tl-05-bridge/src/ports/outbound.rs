//! Outbound ports: dependencies the bridge needs from its host.

use std::collections::HashMap;

use parking_lot::RwLock;

use shared_types::{Address, Hash, Signature};

/// Recovers the signer of a digest from a compact signature.
///
/// The bridge never inspects signature bytes itself; it asks this port who
/// signed and compares the answer against participant and validator sets.
/// `None` means the bytes do not decode to any signer.
pub trait SignatureVerifier: Send + Sync {
    /// The address that produced `signature` over `digest`, if any.
    fn recover(&self, digest: &Hash, signature: &Signature) -> Option<Address>;
}

/// Registered-validator roll, served by the consensus layer's registry.
///
/// Dispute resolution needs the census size to compute its supermajority
/// threshold and a membership check per recovered signer.
pub trait ValidatorCensus: Send + Sync {
    /// Number of validators currently registered.
    fn registered_count(&self) -> usize;

    /// Whether `who` is a registered validator.
    fn is_registered(&self, who: &Address) -> bool;
}

/// Verifier backed by an attestation map, for tests and standalone use.
///
/// Instead of real key recovery it returns whatever signer was attested for
/// a `(digest, signature)` pair, letting tests script arbitrary outcomes.
#[derive(Debug, Default)]
pub struct StaticVerifier {
    attested: RwLock<HashMap<(Hash, Signature), Address>>,
}

impl StaticVerifier {
    /// Creates an empty verifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that `signer` produced `signature` over `digest`.
    pub fn attest(&self, digest: Hash, signature: Signature, signer: Address) {
        self.attested.write().insert((digest, signature), signer);
    }
}

impl SignatureVerifier for StaticVerifier {
    fn recover(&self, digest: &Hash, signature: &Signature) -> Option<Address> {
        self.attested.read().get(&(*digest, *signature)).copied()
    }
}

/// Census backed by an in-process list, for tests and standalone use.
#[derive(Debug, Default)]
pub struct StaticCensus {
    validators: RwLock<Vec<Address>>,
}

impl StaticCensus {
    /// Creates an empty census.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the registered set.
    pub fn set_validators(&self, validators: Vec<Address>) {
        *self.validators.write() = validators;
    }
}

impl ValidatorCensus for StaticCensus {
    fn registered_count(&self) -> usize {
        self.validators.read().len()
    }

    fn is_registered(&self, who: &Address) -> bool {
        self.validators.read().contains(who)
    }
}
