// Feed URL signing — canonical parameter ordering, SHA-1 signatures and the
// guard that re-derives them on the protected endpoint.
//
// A signature covers only the parameters the guard names (for the feed that
// is just `username`), so extra query fields never invalidate old links.

pub mod canonical;
pub mod guard;
pub mod signer;

pub use canonical::{canonicalize, ParameterSet};
pub use guard::{AuthError, GuardConfigError, SignatureGuard};
pub use signer::{Signer, SIGNATURE_PARAM};
