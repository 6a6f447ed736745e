// src/middleware.rs
// login / admin wrappers, used with axum::middleware::from_fn_with_state
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use crate::config::Config;
use crate::identity::{Identity, IdentityProvider};

#[derive(Clone)]
pub struct AccessState {
    pub cfg: Config,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Login URL that sends the user back to `dest` afterwards.
pub fn login_url(base: &str, dest: &str) -> String {
    let query = serde_urlencoded::to_string([("continue", dest)]).unwrap_or_default();
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{query}")
}

pub async fn require_login(State(st): State<AccessState>, req: Request, next: Next) -> Response {
    if let Identity::Anonymous = st.identity.current_identity(req.headers()) {
        let dest = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        return Redirect::to(&login_url(&st.cfg.login_url, dest)).into_response();
    }
    next.run(req).await
}

pub async fn require_admin(State(st): State<AccessState>, req: Request, next: Next) -> Response {
    let identity = st.identity.current_identity(req.headers());
    let is_admin = identity.email().is_some_and(|e| st.cfg.is_admin(e));
    if !is_admin {
        info!(subject = identity.subject(), path = %req.uri().path(), "admin only");
        return (StatusCode::FORBIDDEN, "admin only").into_response();
    }
    next.run(req).await
}
