// src/bin/mint_identity.rs
// Prints a Cookie header for local testing: mint_identity alice@example.com
use anyhow::{Context, Result};

use hamtrainer::identity::{SignedCookieIdentity, IDENTITY_COOKIE};

fn main() -> Result<()> {
    let email = std::env::args()
        .nth(1)
        .context("usage: mint_identity <email>")?;
    let secret = std::env::var("IDENTITY_SECRET").context("Missing IDENTITY_SECRET")?;

    let provider = SignedCookieIdentity::new(secret.as_bytes())?;
    println!("Cookie: {IDENTITY_COOKIE}={}", provider.cookie_value(email.trim()));
    Ok(())
}
