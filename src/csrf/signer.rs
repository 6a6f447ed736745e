// src/csrf/signer.rs
use anyhow::{anyhow, ensure, Result};
use chrono::{DateTime, Duration, Utc};
use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{extract_token, CsrfError, CsrfToken, MAC_LEN};
use crate::identity::Identity;

type HmacSha256 = Hmac<Sha256>;

/// 12 hours.
pub const DEFAULT_TTL_SECS: i64 = 12 * 60 * 60;

/// Longest ttl a 32-bit expiration can carry from the epoch.
pub const MAX_TTL_SECS: i64 = i32::MAX as i64;

/// Issues and verifies tokens with one process-wide key.
#[derive(Clone)]
pub struct CsrfSigner {
    // keyed once, cloned per token
    keyed: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for CsrfSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CsrfSigner {
    pub fn new(key: &[u8], ttl: Duration) -> Result<Self> {
        ensure!(!key.is_empty(), "CSRF signing key must not be empty");
        ensure!(ttl > Duration::zero(), "CSRF token ttl must be positive");
        ensure!(
            ttl.num_seconds() <= MAX_TTL_SECS,
            "CSRF token ttl of {}s exceeds the 32-bit expiration range",
            ttl.num_seconds()
        );
        let keyed = HmacSha256::new_from_slice(key).map_err(|e| anyhow!("CSRF signing key: {e}"))?;
        Ok(Self { keyed, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Token for `identity`, valid for the configured ttl from now.
    pub fn issue(&self, identity: &Identity) -> String {
        self.issue_at(identity, Utc::now()).to_string()
    }

    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> CsrfToken {
        let expiration = now.timestamp().saturating_add(self.ttl.num_seconds());
        let mac = self.mac(identity, expiration).finalize().into_bytes();
        let mut bytes = [0u8; MAC_LEN];
        bytes.copy_from_slice(&mac);
        CsrfToken::new(bytes, expiration)
    }

    /// Structural checks and expiry run before the MAC is touched; the final
    /// comparison is constant-time (`verify_slice`).
    pub fn verify_at(
        &self,
        presented: &str,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<(), CsrfError> {
        let token: CsrfToken = presented.parse()?;

        if token.expiration() <= now.timestamp() {
            return Err(CsrfError::Expired(token.expiration()));
        }

        self.mac(identity, token.expiration())
            .verify_slice(token.mac())
            .map_err(|_| CsrfError::SignatureMismatch)
    }

    /// Extract the presented token (header, then form fields) and verify it
    /// for `identity`. Callers collapse any error to a plain rejection.
    pub fn validate_request(
        &self,
        headers: &HeaderMap,
        fields: &[(String, String)],
        identity: &Identity,
    ) -> Result<(), CsrfError> {
        self.validate_request_at(headers, fields, identity, Utc::now())
    }

    pub fn validate_request_at(
        &self,
        headers: &HeaderMap,
        fields: &[(String, String)],
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<(), CsrfError> {
        let presented = extract_token(headers, fields)?;
        self.verify_at(&presented, identity, now)
    }

    fn mac(&self, identity: &Identity, expiration: i64) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(format!("{}:{}", identity.subject(), expiration).as_bytes());
        mac
    }
}
