#![allow(clippy::unwrap_used)]
// End-to-end controller flows against a wiremock server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use clientele_core::{
    ApiClient, ChannelNotifier, Controller, Level, ListState, MemoryTokenStore, Notification,
    RefreshOrdering, Route, RouteDecision, SubmitOutcome,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn jwt(sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({"sub": sub, "scopes": ["ROLE_USER"], "exp": 4_102_444_800_i64}).to_string(),
    );
    format!("{header}.{payload}.sig")
}

fn customer_json(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@x.com", name.to_lowercase()),
        "age": 27,
        "gender": "MALE"
    })
}

async fn setup(
    store: MemoryTokenStore,
    ordering: RefreshOrdering,
) -> (
    MockServer,
    Controller,
    tokio::sync::mpsc::UnboundedReceiver<Notification>,
) {
    let server = MockServer::start().await;
    let api = ApiClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    let (notifier, rx) = ChannelNotifier::new();
    let ctrl = Controller::new(Arc::new(api), Box::new(store), Arc::new(notifier), ordering);
    (server, ctrl, rx)
}

fn fill(form: &mut clientele_core::CreateForm, values: &[(&str, &str)]) {
    for (field, value) in values {
        form.set(field, *value).unwrap();
    }
}

const JANE: &[(&str, &str)] = &[
    ("name", "Jane"),
    ("email", "jane@x.com"),
    ("age", "27"),
    ("gender", "MALE"),
    ("password", "abcdefgh"),
];

// ── Flows ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_jane_refreshes_list() {
    let token = jwt("admin@x.com");
    let (server, ctrl, mut rx) = setup(
        MemoryTokenStore::with_token(token.clone()),
        RefreshOrdering::default(),
    )
    .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    Mock::given(method("GET"))
        .and(path("/api/v1/customers"))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(move |_: &Request| {
            let body = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                json!([])
            } else {
                json!([customer_json(1, "Jane")])
            };
            ResponseTemplate::new(200).set_body_json(body)
        })
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/customers"))
        .and(body_json(json!({
            "name": "Jane",
            "email": "jane@x.com",
            "age": 27,
            "gender": "MALE",
            "password": "abcdefgh"
        })))
        .respond_with(ResponseTemplate::new(200).insert_header("Authorization", jwt("jane@x.com")))
        .expect(1)
        .mount(&server)
        .await;

    ctrl.start();
    assert!(ctrl.customers().wait_settled().await.customers().unwrap().is_empty());
    assert!(ctrl.customers().is_empty());

    let mut states = ctrl.customers().subscribe();
    let mut form = ctrl.create_form();
    fill(&mut form, JANE);
    let created = ctrl.submit_create(&mut form).await.into_result().unwrap();
    assert!(created.token.is_some());

    let state = states
        .wait_for(|s| s.customers().is_some_and(|l| !l.is_empty()))
        .await
        .unwrap()
        .clone();
    assert_eq!(state.customers().unwrap()[0].name, "Jane");
    assert_eq!(
        rx.recv().await.unwrap(),
        Notification::success("Customer saved.", "Jane was successfully saved!")
    );
    // Admin creates never replace the admin's own session.
    assert_eq!(ctrl.session().identity().unwrap().subject, "admin@x.com");

    ctrl.shutdown().await;
}

#[tokio::test]
async fn underage_create_sends_nothing() {
    let (server, ctrl, mut rx) =
        setup(MemoryTokenStore::new(), RefreshOrdering::default()).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/customers"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut form = ctrl.create_form();
    fill(&mut form, JANE);
    form.set("age", "10").unwrap();

    let SubmitOutcome::Blocked(errors) = ctrl.submit_create(&mut form).await else {
        panic!("expected the submission to be blocked");
    };
    assert_eq!(errors["age"], "Must be at least 16 years of age");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn bad_stored_token_redirects_to_login() {
    let (_server, ctrl, _rx) = setup(
        MemoryTokenStore::with_token("definitely.not.a-jwt"),
        RefreshOrdering::default(),
    )
    .await;

    assert!(ctrl.session().identity().is_none());
    assert_eq!(
        ctrl.guard(Route::Dashboard),
        RouteDecision::Redirect(Route::Login)
    );
    assert_eq!(ctrl.guard(Route::Login), RouteDecision::Allow);
}

#[tokio::test]
async fn login_failure_surfaces_server_error() {
    let (server, ctrl, mut rx) =
        setup(MemoryTokenStore::new(), RefreshOrdering::default()).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Unauthorized",
            "message": "Bad credentials",
            "path": "/api/v1/auth/login"
        })))
        .mount(&server)
        .await;

    let mut form = ctrl.login_form();
    form.set("username", "jane@x.com").unwrap();
    form.set("password", "wrong").unwrap();

    let outcome = ctrl.submit_login(&mut form).await;
    assert!(matches!(outcome, SubmitOutcome::Failed(ref e) if e.is_auth_failure()));
    let n = rx.try_recv().unwrap();
    assert_eq!(n.level, Level::Error);
    assert_eq!(n.title, "Unauthorized");
    assert_eq!(n.description, "Bad credentials");
    assert!(!ctrl.session().is_authenticated());
}

#[tokio::test]
async fn login_then_delete_uses_new_token() {
    let token = jwt("jane@x.com");
    let (server, ctrl, mut rx) =
        setup(MemoryTokenStore::new(), RefreshOrdering::default()).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": token, "customerDTO": customer_json(1, "Jane")})),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/customers/2"))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut form = ctrl.login_form();
    form.set("username", "jane@x.com").unwrap();
    form.set("password", "password").unwrap();
    ctrl.submit_login(&mut form).await.into_result().unwrap();
    assert_eq!(ctrl.guard(Route::Login), RouteDecision::Redirect(Route::Dashboard));

    let bob = serde_json::from_value(customer_json(2, "Bob")).unwrap();
    ctrl.delete(&bob).await.unwrap();
    assert_eq!(
        rx.try_recv().unwrap(),
        Notification::success("Customer deleted", "Bob was successfully deleted!")
    );
}

// ── Overlapping fetches ─────────────────────────────────────────────

/// F1 is answered slowly with "Old", F2 quickly with "New".
async fn mount_racing_list(server: &MockServer) {
    let seen = Arc::new(AtomicUsize::new(0));
    Mock::given(method("GET"))
        .and(path("/api/v1/customers"))
        .respond_with(move |_: &Request| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(200)
                    .set_body_json(json!([customer_json(1, "Old")]))
                    .set_delay(Duration::from_millis(400))
            } else {
                ResponseTemplate::new(200).set_body_json(json!([customer_json(1, "New")]))
            }
        })
        .mount(server)
        .await;
}

/// Issue F1, wait for the server to see it, then issue F2.
async fn race(server: &MockServer, ctrl: &Controller) -> String {
    let f1 = ctrl.customers().refresh();
    while server.received_requests().await.unwrap().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let f2 = ctrl.customers().refresh();
    f2.await.unwrap();
    f1.await.unwrap();

    match ctrl.customers().state() {
        ListState::Ready(list) => list[0].name.clone(),
        other => panic!("unexpected state {other:?}"),
    }
}

#[tokio::test]
async fn overlapping_fetches_last_resolved_wins() {
    let (server, ctrl, _rx) =
        setup(MemoryTokenStore::new(), RefreshOrdering::LastResolved).await;
    mount_racing_list(&server).await;
    assert_eq!(race(&server, &ctrl).await, "Old");
}

#[tokio::test]
async fn overlapping_fetches_latest_issued_wins() {
    let (server, ctrl, _rx) =
        setup(MemoryTokenStore::new(), RefreshOrdering::LatestIssued).await;
    mount_racing_list(&server).await;
    assert_eq!(race(&server, &ctrl).await, "New");
}
