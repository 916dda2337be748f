// Signature guard — re-derives the signature on a protected request.
//
// The guard is built once per protected route with the names of the request
// attributes that were signed. At request time it pulls exactly those names
// out of the request, signs them again and compares the result with the
// presented `signature` in constant time.

use std::collections::{BTreeSet, HashMap};

use subtle::ConstantTimeEq;

use super::canonical::ParameterSet;
use super::signer::Signer;

/// Why a protected request was refused.
///
/// The HTTP layer folds these into two public messages; the variants stay
/// distinct so logs can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no signature presented")]
    MissingSignature,

    #[error("missing authorisation parameter `{0}`")]
    MissingParameter(String),

    #[error("signature does not match")]
    SignatureMismatch,
}

impl AuthError {
    /// Message returned to the client with the 403.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "Missing authorisation parameter. Access Denied.",
            Self::MissingSignature | Self::SignatureMismatch => "Wrong signature. Access Denied.",
        }
    }
}

/// Guard construction errors. These are setup mistakes, surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardConfigError {
    #[error("at least one parameter name is required to authorize a request")]
    NoRequiredNames,
}

/// Verifies signed requests for one protected operation.
#[derive(Debug, Clone)]
pub struct SignatureGuard {
    signer: Signer,
    required: BTreeSet<String>,
}

impl SignatureGuard {
    /// Build a guard that signs exactly `names` out of each request.
    pub fn new<I, S>(signer: Signer, names: I) -> Result<Self, GuardConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let required: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if required.is_empty() {
            return Err(GuardConfigError::NoRequiredNames);
        }
        Ok(Self { signer, required })
    }

    /// Check a request.
    ///
    /// `request_params` holds every attribute of the request; anything not in
    /// the required set (including the signature and format qualifiers) is
    /// ignored. A signer without a secret cannot produce a signature, so
    /// every request is refused.
    pub fn authorize(
        &self,
        request_params: &HashMap<String, String>,
        presented_signature: Option<&str>,
    ) -> Result<(), AuthError> {
        let presented = presented_signature.ok_or(AuthError::MissingSignature)?;
        let params = self.extract(request_params)?;

        let Some(expected) = self.signer.signature(&params) else {
            return Err(AuthError::SignatureMismatch);
        };

        if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::SignatureMismatch)
        }
    }

    fn extract(&self, request_params: &HashMap<String, String>) -> Result<ParameterSet, AuthError> {
        self.required
            .iter()
            .map(|name| {
                request_params
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
                    .ok_or_else(|| AuthError::MissingParameter(name.clone()))
            })
            .collect()
    }
}
