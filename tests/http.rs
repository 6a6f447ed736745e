// tests/http.rs
use std::collections::HashMap;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use hamtrainer::{
    app::build_app,
    config::Config,
    identity::{SignedCookieIdentity, IDENTITY_COOKIE},
};

const IDENTITY_SECRET: &str = "test-identity-secret";

const TECH: &str = r#"{
    "version": 1,
    "subelements": {"T1": "FCC Rules"},
    "topics": {"T1A": "Purpose and permissible use"},
    "questions": {
        "T1A01": {
            "topic": "T1A", "number": "01", "correct": "C", "citation": "97.1",
            "question": "Which of the following is part of the Basis and Purpose?",
            "answers": {"A": "a", "B": "b", "C": "c", "D": "d"}
        }
    }
}"#;

struct TestApp {
    app: Router,
    dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("technician.json"), TECH).unwrap();

    let vars: HashMap<&str, String> = HashMap::from([
        ("CSRF_KEY", "dummykey".to_string()),
        ("IDENTITY_SECRET", IDENTITY_SECRET.to_string()),
        ("POOL_DIR", dir.path().display().to_string()),
        ("ADMIN_EMAILS", "root@example.com".to_string()),
        ("LOGIN_URL", "/public/login.html".to_string()),
    ]);
    let cfg = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
    TestApp {
        app: build_app(&cfg).unwrap(),
        dir,
    }
}

fn cookie_for(email: &str) -> String {
    let v = SignedCookieIdentity::new(IDENTITY_SECRET.as_bytes())
        .unwrap()
        .cookie_value(email);
    format!("{IDENTITY_COOKIE}={v}")
}

struct Resp {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: String,
}

impl Resp {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

async fn send(app: &Router, req: Request<Body>) -> Resp {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    Resp {
        status,
        headers,
        body: String::from_utf8(body.to_vec()).unwrap(),
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut b = Request::get(uri);
    if let Some(c) = cookie {
        b = b.header(header::COOKIE, c);
    }
    b.body(Body::empty()).unwrap()
}

fn post(uri: &str, cookie: Option<&str>, token: Option<&str>) -> Request<Body> {
    let mut b = Request::post(uri);
    if let Some(c) = cookie {
        b = b.header(header::COOKIE, c);
    }
    if let Some(t) = token {
        b = b.header("X-XSRF-TOKEN", t);
    }
    b.body(Body::empty()).unwrap()
}

async fn token_for(app: &Router, cookie: Option<&str>) -> String {
    let res = send(app, get("/api/csrf", cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    res.json()["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn sanity_routes() {
    let t = test_app();
    let res = send(&t.app, get("/api/ok", None)).await;
    assert_eq!((res.status, res.body.as_str()), (StatusCode::OK, "OK"));
    let res = send(&t.app, get("/health", None)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn serves_pool_json() {
    let t = test_app();
    let res = send(&t.app, get("/api/pool/technician", None)).await;
    assert_eq!(res.status, StatusCode::OK);
    let v = res.json();
    assert_eq!(v["version"], 1);
    assert_eq!(v["questions"]["T1A01"]["correct"], "C");
    assert_eq!(v["topics"]["T1A"], "Purpose and permissible use");
}

#[tokio::test]
async fn unknown_or_missing_pool_is_404() {
    let t = test_app();
    for uri in ["/api/pool/novice", "/api/pool/general"] {
        let res = send(&t.app, get(uri, None)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(res.body, "Unable to find pool.");
    }
}

#[tokio::test]
async fn csrf_endpoint_issues_token_and_cookie() {
    let t = test_app();
    let res = send(&t.app, get("/api/csrf", Some(&cookie_for("alice@example.com")))).await;
    assert_eq!(res.status, StatusCode::OK);
    let token = res.json()["token"].as_str().unwrap().to_string();
    let (mac, exp) = token.split_once(':').unwrap();
    assert_eq!(mac.len(), 64);
    assert!(exp.parse::<i64>().is_ok());

    let set_cookie = res
        .headers
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .find(|c| c.starts_with("XSRF-TOKEN="))
        .expect("XSRF-TOKEN cookie");
    assert!(set_cookie.contains(&token));
}

#[tokio::test]
async fn me_reports_identity() {
    let t = test_app();
    let anon = send(&t.app, get("/api/me", None)).await.json();
    assert_eq!(anon["ok"], false);

    let alice = send(&t.app, get("/api/me", Some(&cookie_for("alice@example.com")))).await.json();
    assert_eq!(alice["email"], "alice@example.com");
    assert_eq!(alice["admin"], false);

    let root = send(&t.app, get("/api/me", Some(&cookie_for("root@example.com")))).await.json();
    assert_eq!(root["admin"], true);
}

#[tokio::test]
async fn logout_requires_token_for_the_same_identity() {
    let t = test_app();
    let alice = cookie_for("alice@example.com");
    let bob = cookie_for("bob@example.com");
    let token = token_for(&t.app, Some(&alice)).await;

    let res = send(&t.app, post("/auth/logout", Some(&alice), None)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body, "Invalid CSRF Token");

    let res = send(&t.app, post("/auth/logout", Some(&bob), Some(&token))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = send(&t.app, post("/auth/logout", None, Some(&token))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = send(&t.app, post("/auth/logout", Some(&alice), Some(&token))).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    let cleared = res
        .headers
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|v| v.to_str().unwrap().starts_with(&format!("{IDENTITY_COOKIE}=")));
    assert!(cleared);
}

#[tokio::test]
async fn anonymous_token_works_for_anonymous_form_post() {
    let t = test_app();
    let token = token_for(&t.app, None).await;
    let body = serde_urlencoded::to_string([("xsrf_token", token.as_str())]).unwrap();
    let req = Request::post("/auth/logout")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    assert_eq!(send(&t.app, req).await.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let t = test_app();
    let alice = cookie_for("alice@example.com");
    let token = token_for(&t.app, Some(&alice)).await;
    let (mac, exp) = token.split_once(':').unwrap();
    let extended = format!("{mac}:{}", exp.parse::<i64>().unwrap() + 3600);
    let res = send(&t.app, post("/auth/logout", Some(&alice), Some(&extended))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = send(&t.app, post("/auth/logout", Some(&alice), Some(mac))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_reload_is_gated() {
    let t = test_app();
    let uri = "/api/admin/pools/technician/reload";

    // anonymous: off to the login page
    let res = send(&t.app, post(uri, None, None)).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    let location = res.headers[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("/public/login.html?continue="), "{location}");

    // logged in, not an admin
    let bob = cookie_for("bob@example.com");
    let token = token_for(&t.app, Some(&bob)).await;
    let res = send(&t.app, post(uri, Some(&bob), Some(&token))).await;
    assert_eq!((res.status, res.body.as_str()), (StatusCode::FORBIDDEN, "admin only"));

    // admin, no token
    let root = cookie_for("root@example.com");
    let res = send(&t.app, post(uri, Some(&root), None)).await;
    assert_eq!((res.status, res.body.as_str()), (StatusCode::FORBIDDEN, "Invalid CSRF Token"));
}

#[tokio::test]
async fn admin_reload_picks_up_changes() {
    let t = test_app();
    let root = cookie_for("root@example.com");
    let token = token_for(&t.app, Some(&root)).await;

    let before = send(&t.app, get("/api/pool/technician", None)).await.json();
    assert_eq!(before["questions"].as_object().unwrap().len(), 1);

    std::fs::write(t.dir.path().join("technician.json"), r#"{"version": 2}"#).unwrap();
    let res = send(&t.app, post("/api/admin/pools/technician/reload", Some(&root), Some(&token))).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["questions"], 0);
    assert_eq!(body["cached"], serde_json::json!(["technician"]));

    let after = send(&t.app, get("/api/pool/technician", None)).await.json();
    assert_eq!(after["version"], 2);
}
