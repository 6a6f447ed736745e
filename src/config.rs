// src/config.rs
use std::env;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::csrf::DEFAULT_TTL_SECS;

const DEV_IDENTITY_SECRET: &str = "dev-identity-secret-change-me";

#[derive(Clone, Debug)]
pub struct Config {
    // ===== Server =====
    pub bind: String,

    // ===== Directories =====
    pub public_dir: String,
    pub pool_dir: String,

    // ===== CSRF =====
    pub csrf_key: Vec<u8>,
    pub csrf_token_ttl: Duration,
    pub max_form_bytes: usize,

    // ===== Identity & access =====
    pub identity_secret: Vec<u8>,
    pub admin_emails: Vec<String>,
    pub login_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("BIND").unwrap_or_else(|| "0.0.0.0:8080".into());
        let public_dir = lookup("PUBLIC_DIR").unwrap_or_else(|| "public".into());
        let pool_dir = lookup("POOL_DIR").unwrap_or_else(|| "data/json".into());

        // The signing key has no default: running without one is a deploy error
        let csrf_key = lookup("CSRF_KEY")
            .filter(|k| !k.is_empty())
            .map(String::into_bytes)
            .ok_or_else(|| anyhow!("CSRF_KEY must be set to a non-empty secret"))?;

        let ttl_secs = match lookup("CSRF_TOKEN_TTL") {
            Some(s) => s
                .parse::<i64>()
                .with_context(|| format!("CSRF_TOKEN_TTL is not an integer: {s:?}"))?,
            None => DEFAULT_TTL_SECS,
        };
        if ttl_secs < 1 {
            bail!("CSRF_TOKEN_TTL must be at least 1 second, got {ttl_secs}");
        }
        // expirations travel as 32-bit unix seconds
        let last_exp = Utc::now().timestamp().checked_add(ttl_secs);
        if last_exp.map_or(true, |exp| exp > i32::MAX as i64) {
            bail!("CSRF_TOKEN_TTL of {ttl_secs}s puts token expirations past 2038-01-19");
        }

        let max_form_bytes = lookup("MAX_FORM_BYTES")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(64 * 1024);

        let identity_secret = match lookup("IDENTITY_SECRET").filter(|s| !s.is_empty()) {
            Some(s) => s.into_bytes(),
            None => {
                warn!("IDENTITY_SECRET not set, using the development secret");
                DEV_IDENTITY_SECRET.as_bytes().to_vec()
            }
        };

        let admin_emails = lookup("ADMIN_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let login_url = lookup("LOGIN_URL").unwrap_or_else(|| "/public/login.html".into());

        let cfg = Self {
            bind,
            public_dir,
            pool_dir,
            csrf_key,
            csrf_token_ttl: Duration::seconds(ttl_secs),
            max_form_bytes,
            identity_secret,
            admin_emails,
            login_url,
        };

        info!(
            "[config] bind={}, public_dir={}, pool_dir={}, csrf_ttl={}s, max_form={}B, admins={}, login_url={}",
            cfg.bind,
            cfg.public_dir,
            cfg.pool_dir,
            cfg.csrf_token_ttl.num_seconds(),
            cfg.max_form_bytes,
            cfg.admin_emails.len(),
            cfg.login_url,
        );

        Ok(cfg)
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|a| a.eq_ignore_ascii_case(email))
    }
}
