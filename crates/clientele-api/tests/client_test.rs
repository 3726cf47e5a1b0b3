#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use clientele_api::{
    ApiClient, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest, Error, Gender,
    LoginCredentials,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn jane() -> serde_json::Value {
    json!({
        "id": 1,
        "name": "Jane",
        "email": "jane@x.com",
        "gender": "MALE",
        "age": 27,
        "roles": ["ROLE_USER"],
        "username": "jane@x.com"
    })
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_customers_attaches_bearer_token() {
    let (server, client) = setup().await;
    client.set_token(Some(SecretString::from("tok-123".to_owned())));

    Mock::given(method("GET"))
        .and(path("/api/v1/customers"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([jane()])))
        .expect(1)
        .mount(&server)
        .await;

    let customers = client.list_customers().await.unwrap();

    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].name, "Jane");
    assert_eq!(customers[0].id, CustomerId::Numeric(1));
    assert_eq!(customers[0].gender, Gender::Male);
}

#[tokio::test]
async fn test_list_customers_without_token_sends_no_header() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/customers"))
        .respond_with(|req: &Request| {
            if req.headers.contains_key("authorization") {
                ResponseTemplate::new(400)
            } else {
                ResponseTemplate::new(200).set_body_json(json!([]))
            }
        })
        .mount(&server)
        .await;

    assert!(client.list_customers().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_customer() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/customers/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jane()))
        .mount(&server)
        .await;

    let c = client.get_customer(&CustomerId::from(1)).await.unwrap();
    assert_eq!(c.email, "jane@x.com");
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_customer_returns_header_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/customers"))
        .and(body_json(json!({
            "name": "Jane",
            "email": "jane@x.com",
            "age": 27,
            "gender": "MALE",
            "password": "abcdefgh"
        })))
        .respond_with(ResponseTemplate::new(200).insert_header("Authorization", "new.jwt.token"))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_customer(&CustomerRegistrationRequest {
            name: "Jane".into(),
            email: "jane@x.com".into(),
            age: 27,
            gender: Gender::Male,
            password: Some(SecretString::from("abcdefgh".to_owned())),
        })
        .await
        .unwrap();

    assert_eq!(created.token.unwrap().expose_secret(), "new.jwt.token");
}

#[tokio::test]
async fn test_update_customer_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/customers/1"))
        .and(body_json(json!({"name": "Janet"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client
        .update_customer(
            &CustomerId::from(1),
            &CustomerUpdateRequest {
                name: Some("Janet".into()),
                ..CustomerUpdateRequest::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.is_none());
}

#[tokio::test]
async fn test_update_customer_echoed_record() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/customers/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jane()))
        .mount(&server)
        .await;

    let updated = client
        .update_customer(&CustomerId::from(1), &CustomerUpdateRequest::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Jane");
}

#[tokio::test]
async fn test_delete_customer() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/customers/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_customer(&CustomerId::from(1)).await.unwrap();
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_reads_body_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"username": "jane@x.com", "password": "password"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Authorization", "header.jwt.token")
                .set_body_json(json!({"token": "body.jwt.token", "customerDTO": jane()})),
        )
        .mount(&server)
        .await;

    let resp = client
        .login(&LoginCredentials::new("jane@x.com", "password"))
        .await
        .unwrap();

    assert_eq!(resp.token.expose_secret(), "body.jwt.token");
    assert_eq!(resp.customer.unwrap().name, "Jane");
    assert!(!client.has_token(), "login must not store the token itself");
}

#[tokio::test]
async fn test_login_falls_back_to_header_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Authorization", "Bearer header.jwt.token")
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let resp = client
        .login(&LoginCredentials::new("jane@x.com", "password"))
        .await
        .unwrap();
    assert_eq!(resp.token.expose_secret(), "header.jwt.token");
}

#[tokio::test]
async fn test_login_without_token_is_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let result = client
        .login(&LoginCredentials::new("jane@x.com", "password"))
        .await;
    assert!(matches!(result, Err(Error::MissingToken)), "got: {result:?}");
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_fields_pass_through() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "path": "/api/v1/auth/login",
            "error": "Unauthorized",
            "message": "Bad credentials",
            "statusCode": 401
        })))
        .mount(&server)
        .await;

    let err = client
        .login(&LoginCredentials::new("jane@x.com", "nope"))
        .await
        .unwrap_err();

    match err {
        Error::Api {
            status,
            error,
            message,
            path,
        } => {
            assert_eq!(status, 401);
            assert_eq!(error.as_deref(), Some("Unauthorized"));
            assert_eq!(message, "Bad credentials");
            assert_eq!(path.as_deref(), Some("/api/v1/auth/login"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_body_becomes_message() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/customers/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such customer"))
        .mount(&server)
        .await;

    let err = client
        .delete_customer(&CustomerId::from(9))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.api_error_code(), Some("Not Found"));
    assert!(err.to_string().contains("no such customer"));
}

#[tokio::test]
async fn test_malformed_list_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.list_customers().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body == "not json"),
        "got: {result:?}"
    );
}
