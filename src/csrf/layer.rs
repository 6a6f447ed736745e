// src/csrf/layer.rs
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::{form_fields, CsrfSigner};
use crate::identity::IdentityProvider;

#[derive(Clone)]
pub struct CsrfState {
    pub signer: Arc<CsrfSigner>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Upper bound on a urlencoded body buffered to look for the token.
    pub max_form_bytes: usize,
}

pub fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn is_urlencoded_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

fn reject() -> Response {
    (StatusCode::FORBIDDEN, "Invalid CSRF Token").into_response()
}

/// Use with `axum::middleware::from_fn_with_state`. Safe methods pass straight
/// through; anything else needs a valid token for the current identity or gets
/// a generic 403.
pub async fn csrf_guard(State(st): State<CsrfState>, req: Request, next: Next) -> Response {
    if is_safe_method(req.method()) {
        return next.run(req).await;
    }

    let is_form = is_urlencoded_form(&req);
    let (parts, body) = req.into_parts();

    // 1) Buffer form bodies so the token field can be read, then hand the
    //    same bytes on to the handler
    let (body, form) = if is_form {
        match axum::body::to_bytes(body, st.max_form_bytes).await {
            Ok(bytes) => (Body::from(bytes.clone()), Some(bytes)),
            Err(e) => {
                warn!(method = %parts.method, path = %parts.uri.path(), "CSRF check failed: unreadable form body: {e}");
                return reject();
            }
        }
    } else {
        (body, None)
    };
    let fields = form_fields(parts.uri.query(), form.as_deref());

    // 2) Validate against whoever is asking
    let identity = st.identity.current_identity(&parts.headers);
    if let Err(e) = st.signer.validate_request(&parts.headers, &fields, &identity) {
        warn!(
            method = %parts.method,
            path = %parts.uri.path(),
            subject = identity.subject(),
            "CSRF check failed: {e}"
        );
        return reject();
    }

    next.run(axum::http::Request::from_parts(parts, body)).await
}
