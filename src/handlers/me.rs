// src/handlers/me.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect},
    Json,
};
use serde_json::json;
use tower_cookies::{Cookie, Cookies};

use crate::config::Config;
use crate::identity::{Identity, IdentityProvider, IDENTITY_COOKIE};

#[derive(Clone)]
pub struct MeState {
    pub cfg: Config,
    pub identity: Arc<dyn IdentityProvider>,
}

pub async fn me(State(st): State<MeState>, headers: HeaderMap) -> impl IntoResponse {
    let Identity::User(email) = st.identity.current_identity(&headers) else {
        return Json(json!({"ok": false, "error": "not logged in"}));
    };
    let admin = st.cfg.is_admin(&email);
    Json(json!({"ok": true, "email": email, "admin": admin}))
}

/// Forgets the identity cookie. Guarded by the CSRF layer like any POST.
pub async fn post_logout(cookies: Cookies) -> impl IntoResponse {
    let mut c = Cookie::from(IDENTITY_COOKIE);
    c.set_path("/");
    cookies.remove(c);
    Redirect::to("/public/")
}
