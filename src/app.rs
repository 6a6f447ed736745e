// src/app.rs
use std::sync::Arc;

use anyhow::Result;
use axum::{
    middleware::from_fn_with_state,
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::csrf::{csrf_guard, CsrfSigner, CsrfState};
use crate::handlers::{
    csrf::get_token,
    me::{me, post_logout, MeState},
    pools::{get_pool, reload_pool, PoolsState},
};
use crate::identity::{IdentityProvider, SignedCookieIdentity};
use crate::middleware::{require_admin, require_login, AccessState};
use crate::pools::PoolCache;

// Sanity check
async fn ok() -> &'static str {
    info!("OK requested.");
    "OK"
}

/// Builds the whole router from config. Fails only on unusable secrets.
pub fn build_app(cfg: &Config) -> Result<Router> {
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(SignedCookieIdentity::new(&cfg.identity_secret)?);
    let signer = Arc::new(CsrfSigner::new(&cfg.csrf_key, cfg.csrf_token_ttl)?);
    let pools = Arc::new(PoolCache::new(&cfg.pool_dir));

    // ==== States ====
    let csrf_state = CsrfState {
        signer,
        identity: identity.clone(),
        max_form_bytes: cfg.max_form_bytes,
    };
    let access_state = AccessState {
        cfg: cfg.clone(),
        identity: identity.clone(),
    };
    let pools_state = PoolsState { pools };

    // ===== Static/basic =====
    let static_router = Router::new()
        .route("/", get(|| async { Redirect::to("/public/") }))
        .route("/health", get(|| async { "ok" }))
        .route("/api/ok", get(ok))
        .nest_service(
            "/public",
            ServeDir::new(&cfg.public_dir).append_index_html_on_directories(true),
        );

    // ===== Pools (public read) =====
    let pools_router = Router::new()
        .route("/api/pool/:class", get(get_pool))
        .with_state(pools_state.clone());

    // ===== Admin: login, then admin, then CSRF (outermost runs first) =====
    let admin_router = Router::new()
        .route("/api/admin/pools/:class/reload", post(reload_pool))
        .route_layer(from_fn_with_state(csrf_state.clone(), csrf_guard))
        .route_layer(from_fn_with_state(access_state.clone(), require_admin))
        .route_layer(from_fn_with_state(access_state, require_login))
        .with_state(pools_state);

    // ===== Identity & tokens =====
    let me_router = Router::new()
        .route("/api/me", get(me))
        .with_state(MeState {
            cfg: cfg.clone(),
            identity,
        });

    let token_router = Router::new()
        .route("/api/csrf", get(get_token))
        .with_state(csrf_state.clone());

    let logout_router = Router::new()
        .route("/auth/logout", post(post_logout))
        .route_layer(from_fn_with_state(csrf_state, csrf_guard));

    // ===== Merge + cookies + tracing =====
    Ok(static_router
        .merge(pools_router)
        .merge(admin_router)
        .merge(me_router)
        .merge(token_router)
        .merge(logout_router)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http()))
}
