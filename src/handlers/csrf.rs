// src/handlers/csrf.rs
use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use tower_cookies::{
    cookie::{time, SameSite},
    Cookie, Cookies,
};

use crate::csrf::CsrfState;

/// Readable by page scripts, which echo it back in X-XSRF-TOKEN.
pub const TOKEN_COOKIE: &str = "XSRF-TOKEN";

#[derive(Serialize)]
pub struct TokenResp {
    ok: bool,
    token: String,
}

// GET /api/csrf -> { ok: true, token } for whoever is asking
pub async fn get_token(
    State(st): State<CsrfState>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Json<TokenResp> {
    let identity = st.identity.current_identity(&headers);
    let token = st.signer.issue(&identity);

    let c = Cookie::build((TOKEN_COOKIE, token.clone()))
        .path("/")
        .http_only(false)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(st.signer.ttl().num_seconds()))
        .build();
    cookies.add(c);

    Json(TokenResp { ok: true, token })
}
