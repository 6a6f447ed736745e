// src/identity.rs
use anyhow::{anyhow, Result};
use axum::http::{header, HeaderMap};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower_cookies::cookie::Cookie;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const IDENTITY_COOKIE: &str = "hamtrainer_user";

/// Who is making the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    User(String),
    Anonymous,
}

impl Identity {
    /// Subject used in CSRF MACs; anonymous callers sign over "".
    pub fn subject(&self) -> &str {
        match self {
            Identity::User(email) => email,
            Identity::Anonymous => "",
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Identity::User(email) => Some(email),
            Identity::Anonymous => None,
        }
    }
}

pub trait IdentityProvider: Send + Sync + 'static {
    fn current_identity(&self, headers: &HeaderMap) -> Identity;
}

/// Identity carried in a signed cookie "<b64(email)>.<b64(hmac)>", minted by
/// whatever sits in front of us. No server-side state.
#[derive(Clone)]
pub struct SignedCookieIdentity {
    keyed: HmacSha256,
}

impl SignedCookieIdentity {
    pub fn new(secret: &[u8]) -> Result<Self> {
        let keyed = HmacSha256::new_from_slice(secret).map_err(|e| anyhow!("identity cookie secret: {e}"))?;
        Ok(Self { keyed })
    }

    pub fn cookie_value(&self, email: &str) -> String {
        let mut mac = self.keyed.clone();
        mac.update(email.as_bytes());
        let tag = mac.finalize().into_bytes();
        format!(
            "{}.{}",
            Base64UrlUnpadded::encode_string(email.as_bytes()),
            Base64UrlUnpadded::encode_string(&tag)
        )
    }

    fn verify(&self, val: &str) -> Option<String> {
        let (email_b64, sig_b64) = val.split_once('.')?;
        let email = String::from_utf8(Base64UrlUnpadded::decode_vec(email_b64).ok()?).ok()?;
        let provided = Base64UrlUnpadded::decode_vec(sig_b64).ok()?;
        let mut mac = self.keyed.clone();
        mac.update(email.as_bytes());
        mac.verify_slice(&provided).ok()?;
        (!email.is_empty()).then_some(email)
    }
}

impl IdentityProvider for SignedCookieIdentity {
    fn current_identity(&self, headers: &HeaderMap) -> Identity {
        let raw = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|s| Cookie::split_parse(s))
            .filter_map(|c| c.ok())
            .find(|c| c.name() == IDENTITY_COOKIE)
            .map(|c| c.value().to_owned());

        let Some(raw) = raw else {
            return Identity::Anonymous;
        };
        match self.verify(&raw) {
            Some(email) => Identity::User(email),
            None => {
                debug!("rejected identity cookie, treating caller as anonymous");
                Identity::Anonymous
            }
        }
    }
}
