// src/csrf/token.rs
use std::fmt;
use std::str::FromStr;

use super::CsrfError;

/// Length of an HMAC-SHA256 tag in bytes.
pub const MAC_LEN: usize = 32;

/// Parsed form of "<hex mac>:<unix seconds>".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsrfToken {
    mac: [u8; MAC_LEN],
    expiration: i64,
}

impl CsrfToken {
    pub fn new(mac: [u8; MAC_LEN], expiration: i64) -> Self {
        Self { mac, expiration }
    }

    pub fn mac(&self) -> &[u8; MAC_LEN] {
        &self.mac
    }

    /// Unix seconds, UTC.
    pub fn expiration(&self) -> i64 {
        self.expiration
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(self.mac), self.expiration)
    }
}

impl FromStr for CsrfToken {
    type Err = CsrfError;

    /// Only the canonical spelling is accepted: 64 lowercase hex chars, a colon,
    /// then a decimal i32 without sign or leading zeros. The MAC is recomputed
    /// from the parsed value, so a looser parser would let alternate spellings
    /// of a genuine token through.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mac_hex, exp_str) = s
            .split_once(':')
            .ok_or(CsrfError::MalformedToken("missing separator"))?;

        let exp = exp_str
            .parse::<i32>()
            .map_err(|_| CsrfError::MalformedToken("unparsable expiration"))?;
        if exp.to_string() != exp_str {
            return Err(CsrfError::MalformedToken("non-canonical expiration"));
        }

        if mac_hex.len() != MAC_LEN * 2
            || !mac_hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Err(CsrfError::MalformedToken("bad mac encoding"));
        }
        let mut mac = [0u8; MAC_LEN];
        hex::decode_to_slice(mac_hex, &mut mac)
            .map_err(|_| CsrfError::MalformedToken("bad mac encoding"))?;

        Ok(Self::new(mac, i64::from(exp)))
    }
}
