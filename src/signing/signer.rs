// Signer — SHA-1 over the canonical parameters followed by the secret.
//
// Digest input: name1 value1 name2 value2 ... secret, with no separators,
// pairs in canonical (byte-sorted by name) order. Output is lowercase hex.

use std::fmt;

use sha1::{Digest, Sha1};

use super::canonical::{canonicalize, ParameterSet};

/// Name of the parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";

/// Produces signatures for parameter sets with a shared secret.
///
/// Without a secret the signer is disabled: `sign` hands the parameters
/// back untouched. Config refuses that outside of dev mode.
#[derive(Clone)]
pub struct Signer {
    secret: Option<String>,
}

impl Signer {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// A signer with signing switched off.
    pub fn disabled() -> Self {
        Self { secret: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Compute the signature for `params`, or `None` when signing is disabled.
    pub fn signature(&self, params: &ParameterSet) -> Option<String> {
        let secret = self.secret.as_ref()?;

        let mut hasher = Sha1::new();
        for (name, value) in canonicalize(params) {
            hasher.update(name.as_bytes());
            hasher.update(value.as_bytes());
        }
        hasher.update(secret.as_bytes());

        Some(hex::encode(hasher.finalize()))
    }

    /// Return `params` with a `signature` entry added.
    ///
    /// Any `signature` entry already present is signed like every other
    /// parameter and then overwritten.
    pub fn sign(&self, mut params: ParameterSet) -> ParameterSet {
        if let Some(signature) = self.signature(&params) {
            params.insert(SIGNATURE_PARAM.to_string(), signature);
        }
        params
    }
}

// Never print the secret.
impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
