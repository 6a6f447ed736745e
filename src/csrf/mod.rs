// src/csrf/mod.rs
//! Stateless CSRF tokens.
//!
//! A token is `hex(HMAC-SHA256(key, "<email>:<exp>")) + ":" + exp`, bound to the
//! requester's identity (empty subject for anonymous callers) and valid until
//! `exp`. Nothing is stored server-side: validation recomputes the MAC from the
//! current identity and the claimed expiration.

mod extract;
mod layer;
mod signer;
mod token;

pub use extract::{extract_token, form_fields, FIELD_NAME, HEADER_NAME};
pub use layer::{csrf_guard, is_safe_method, CsrfState};
pub use signer::{CsrfSigner, DEFAULT_TTL_SECS};
pub use token::{CsrfToken, MAC_LEN};

/// Why a token was rejected. Clients only ever see a generic 403; the variant
/// is for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsrfError {
    #[error("no CSRF token presented")]
    NotFound,
    #[error("too many values for {0}")]
    AmbiguousToken(&'static str),
    #[error("malformed CSRF token: {0}")]
    MalformedToken(&'static str),
    #[error("CSRF token expired at {0}")]
    Expired(i64),
    #[error("CSRF token signature mismatch")]
    SignatureMismatch,
}
