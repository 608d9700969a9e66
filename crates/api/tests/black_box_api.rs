use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use itemvault_api::app::{AppServices, SessionSettings};
use itemvault_auth::{Hs256IdentityProvider, StaticAllowlist, TokenClaims, TokenKind};
use itemvault_core::Uid;
use itemvault_store::{DocumentStore, InMemoryDocumentStore};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use serde_json::json;

const SECRET: &str = "test-secret";
const PROJECT: &str = "test-project";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(allowlist: Option<&str>) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let provider = Arc::new(Hs256IdentityProvider::new(SECRET.as_bytes(), PROJECT));
        let allowlist = match allowlist {
            Some(raw) => StaticAllowlist::new(raw),
            None => StaticAllowlist::unset(),
        };
        let services = AppServices::new(
            store,
            provider,
            Arc::new(allowlist),
            SessionSettings {
                ttl: ChronoDuration::days(5),
                secure: true,
            },
        );
        services
            .api_keys
            .register("default-apikey", &Uid::new("default-user").unwrap(), "Default Dev Key")
            .await
            .unwrap();

        // Same router as prod, bound to an ephemeral port.
        let app = itemvault_api::app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Token issued three hours ago and valid for `ttl` from then.
fn mint_id_token(secret: &str, uid: &str, ttl: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: uid.to_string(),
        email: Some("test@example.com".to_string()),
        iss: TokenKind::IdToken.issuer(PROJECT),
        aud: PROJECT.to_string(),
        iat: (now - ChronoDuration::hours(3)).timestamp(),
        exp: (now - ChronoDuration::hours(3) + ttl).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn valid_token(uid: &str) -> String {
    mint_id_token(SECRET, uid, ChronoDuration::hours(4))
}

async fn send_json(req: reqwest::RequestBuilder) -> (StatusCode, serde_json::Value) {
    let res = req.send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn(None).await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "online" }));
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();

    for path in ["/whoami", "/items", "/items/abc"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "authentication_required");
    }
}

#[tokio::test]
async fn api_key_resolves_to_seeded_uid() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();

    let (status, body) =
        send_json(client.get(srv.url("/whoami")).header("X-API-KEY", "default-apikey")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], "default-user");
}

#[tokio::test]
async fn unknown_api_key_is_forbidden_even_with_valid_token() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();

    let (status, body) = send_json(
        client
            .get(srv.url("/whoami"))
            .header("X-API-KEY", "not-a-key")
            .bearer_auth(valid_token("default-user")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "invalid_api_key");
}

#[tokio::test]
async fn bearer_token_resolves_uid_and_bad_tokens_fail_fast() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();

    let (status, body) =
        send_json(client.get(srv.url("/whoami")).bearer_auth(valid_token("user-42"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], "user-42");

    let bad_tokens = [
        "garbage".to_string(),
        mint_id_token("wrong-secret", "user-42", ChronoDuration::hours(4)),
        mint_id_token(SECRET, "user-42", ChronoDuration::hours(1)),
    ];
    for token in bad_tokens {
        let (status, body) = send_json(client.get(srv.url("/whoami")).bearer_auth(token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_token");
    }
}

#[tokio::test]
async fn unreadable_credentials_are_rejected_not_skipped() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();

    let (status, body) = send_json(
        client
            .get(srv.url("/whoami"))
            .header("X-API-KEY", HeaderValue::from_bytes(b"bad\xffkey").unwrap())
            .bearer_auth(valid_token("someone-else")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "invalid_api_key");

    let res = client
        .post(srv.url("/auth/session"))
        .json(&json!({ "token": valid_token("default-user") }))
        .send()
        .await
        .unwrap();
    let cookie = res.headers()[reqwest::header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let (status, body) = send_json(
        client
            .get(srv.url("/whoami"))
            .basic_auth("user", Some("pass"))
            .header(reqwest::header::COOKIE, cookie),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn item_lifecycle_with_api_key() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();
    let key = ("X-API-KEY", "default-apikey");

    // Create
    let res = client
        .post(srv.url("/items"))
        .header(key.0, key.1)
        .json(&json!({ "item_name": "smoke-1", "owner_id": "mallory" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["message"], "Item created");
    let id = created["id"].as_str().unwrap().to_string();

    // List
    let res = client.get(srv.url("/items")).header(key.0, key.1).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let items: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["item_name"], "smoke-1");
    assert_eq!(items[0]["owner_id"], "default-user");

    // Update (merge)
    let res = client
        .put(srv.url(&format!("/items/{id}")))
        .header(key.0, key.1)
        .json(&json!({ "tag": "smoke" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["tag"], "smoke");
    assert_eq!(updated["item_name"], "smoke-1");

    // Get
    let res = client
        .get(srv.url(&format!("/items/{id}")))
        .header(key.0, key.1)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Delete
    let res = client
        .delete(srv.url(&format!("/items/{id}")))
        .header(key.0, key.1)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(srv.url(&format!("/items/{id}")))
        .header(key.0, key.1)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_object_item_body_is_rejected() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/items"))
        .header("X-API-KEY", "default-apikey")
        .json(&json!(["not", "an", "object"]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tenants_are_isolated() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/items"))
        .header("X-API-KEY", "default-apikey")
        .json(&json!({ "name": "private" }))
        .send()
        .await
        .unwrap();
    let id = res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let other = valid_token("someone-else");
    let res = client
        .get(srv.url("/items"))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    let items: Vec<serde_json::Value> = res.json().await.unwrap();
    assert!(items.is_empty());

    let res = client
        .get(srv.url(&format!("/items/{id}")))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_cookie_flow() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/auth/session"))
        .json(&json!({ "token": valid_token("default-user") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "success" }));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let (status, body) =
        send_json(client.get(srv.url("/whoami")).header(reqwest::header::COOKIE, cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uid"], "default-user");

    // A raw uid in the cookie is never trusted.
    let (status, _) = send_json(
        client
            .get(srv.url("/whoami"))
            .header(reqwest::header::COOKIE, "session=default-user"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_exchange_rejects_invalid_token() {
    let srv = TestServer::spawn(None).await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/auth/session"))
        .json(&json!({ "token": "garbage" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().get(reqwest::header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn logout_clears_cookie() {
    let srv = TestServer::spawn(None).await;
    let res = reqwest::Client::new()
        .post(srv.url("/auth/logout"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res.headers().get(reqwest::header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=0"));
}

fn hook_token() -> String {
    Hs256IdentityProvider::new(SECRET.as_bytes(), PROJECT)
        .mint_hook_token()
        .unwrap()
}

async fn call_hook(srv: &TestServer, hook: &str, event: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let res = reqwest::Client::new()
        .post(srv.url(&format!("/hooks/{hook}")))
        .bearer_auth(hook_token())
        .json(&event)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn blocking_hooks_allow_listed_emails_case_insensitively() {
    let srv = TestServer::spawn(Some("Allowed@Example.com, other@example.com")).await;

    for hook in ["before-create", "before-sign-in"] {
        let (status, body) = call_hook(
            &srv,
            hook,
            json!({ "data": { "uid": "u1", "email": "ALLOWED@EXAMPLE.COM" } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{hook}");
        assert_eq!(body, json!({}));
    }
}

#[tokio::test]
async fn blocking_hooks_deny_with_provider_error_kinds() {
    let srv = TestServer::spawn(Some("allowed@example.com")).await;

    let (status, body) = call_hook(
        &srv,
        "before-create",
        json!({ "data": { "email": "blocked@example.com" } }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["status"], "PERMISSION_DENIED");
    assert_eq!(body["error"]["code"], "permission-denied");

    let (status, body) = call_hook(&srv, "before-sign-in", json!({ "data": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn blocking_hooks_fail_closed_without_allowlist() {
    for allowlist in [None, Some(""), Some(" , ")] {
        let srv = TestServer::spawn(allowlist).await;
        let (status, body) = call_hook(
            &srv,
            "before-create",
            json!({ "data": { "email": "anyone@example.com" } }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["status"], "INTERNAL");
    }
}

#[tokio::test]
async fn blocking_hooks_accept_provider_qualified_event_types() {
    let srv = TestServer::spawn(Some("allowed@example.com")).await;

    let (status, body) = call_hook(
        &srv,
        "before-create",
        json!({
            "eventType": "providers/cloud.auth/eventTypes/user.beforeCreate:password",
            "data": { "email": "allowed@example.com" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, _) = call_hook(
        &srv,
        "before-sign-in",
        json!({ "eventType": "something.unheard.of", "data": { "email": "allowed@example.com" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_hook_payload_uses_provider_envelope() {
    let srv = TestServer::spawn(Some("allowed@example.com")).await;

    let res = reqwest::Client::new()
        .post(srv.url("/hooks/before-create"))
        .bearer_auth(hook_token())
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
    assert_eq!(body["error"]["code"], "invalid-argument");
}

#[tokio::test]
async fn blocking_hooks_require_a_provider_signature() {
    let srv = TestServer::spawn(Some("allowed@example.com")).await;
    let client = reqwest::Client::new();
    let event = json!({ "data": { "email": "allowed@example.com" } });

    let unsigned = client.post(srv.url("/hooks/before-create")).json(&event);
    let user_token = client
        .post(srv.url("/hooks/before-create"))
        .bearer_auth(valid_token("default-user"))
        .json(&event);
    let foreign = client
        .post(srv.url("/hooks/before-sign-in"))
        .bearer_auth(
            Hs256IdentityProvider::new(b"wrong-secret", PROJECT)
                .mint_hook_token()
                .unwrap(),
        )
        .json(&event);

    for req in [unsigned, user_token, foreign] {
        let (status, body) = send_json(req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["status"], "UNAUTHENTICATED");
    }
}
