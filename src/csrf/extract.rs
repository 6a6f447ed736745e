// src/csrf/extract.rs
use axum::http::HeaderMap;
use tracing::debug;

use super::CsrfError;

pub const HEADER_NAME: &str = "x-xsrf-token";
pub const FIELD_NAME: &str = "xsrf_token";

/// Query string pairs followed by urlencoded body pairs, like a merged form.
pub fn form_fields(query: Option<&str>, body: Option<&[u8]>) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    if let Some(q) = query {
        match serde_urlencoded::from_str::<Vec<(String, String)>>(q) {
            Ok(pairs) => fields.extend(pairs),
            Err(e) => debug!("ignoring unparsable query string: {e}"),
        }
    }
    if let Some(b) = body {
        match serde_urlencoded::from_bytes::<Vec<(String, String)>>(b) {
            Ok(pairs) => fields.extend(pairs),
            Err(e) => debug!("ignoring unparsable form body: {e}"),
        }
    }
    fields
}

/// The header wins over the form field. Each source must be single-valued, and
/// when both are present they must agree.
pub fn extract_token(headers: &HeaderMap, fields: &[(String, String)]) -> Result<String, CsrfError> {
    let mut header_vals = headers.get_all(HEADER_NAME).iter();
    let header = header_vals.next();
    if header_vals.next().is_some() {
        return Err(CsrfError::AmbiguousToken("header X-XSRF-TOKEN"));
    }

    let mut field_vals = fields
        .iter()
        .filter(|(k, _)| k == FIELD_NAME)
        .map(|(_, v)| v.as_str());
    let field = field_vals.next();
    if field_vals.next().is_some() {
        return Err(CsrfError::AmbiguousToken("field xsrf_token"));
    }

    match (header, field) {
        (Some(h), field) => {
            let h = h
                .to_str()
                .map_err(|_| CsrfError::MalformedToken("header is not visible ascii"))?;
            match field {
                Some(f) if f != h => Err(CsrfError::AmbiguousToken("header and field disagree")),
                _ => Ok(h.to_owned()),
            }
        }
        (None, Some(f)) => Ok(f.to_owned()),
        (None, None) => Err(CsrfError::NotFound),
    }
}
