//! Token lifecycle behaviour of the session manager against a mock API.

mod support;

use fitplan::auth::{AuthError, CredentialStore, Credentials};
use fitplan::error::FitplanError;
use fitplan::session::SessionEvent;
use fitplan::types::WorkoutPlan;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{alice_token, empty_store, manager, plan_json, seeded_store, EventLog};

async fn mount_refresh(server: &MockServer, refresh: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({ "refresh": refresh })))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

// ---------------------------------------------------------------------------
// Bearer attachment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn access_token_is_attached_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let session = manager(&server, seeded_store("A1", "R1"));
    let plans: Vec<WorkoutPlan> = session.get("workout-plans/").await.expect("list plans");
    assert!(plans.is_empty());

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers.get_all("authorization").iter().count(), 1);
}

#[tokio::test]
async fn no_authorization_header_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exercises/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let session = manager(&server, empty_store());
    let _: Value = session.get("exercises/").await.expect("anonymous list");

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn absolute_url_to_other_host_is_refused() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "got": "token" })))
        .expect(0)
        .mount(&foreign)
        .await;

    let session = manager(&server, seeded_store("SECRET", "R1"));
    let err = session
        .get::<Value>(&format!("{}/steal", foreign.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FitplanError::InvalidArgument(_)));
    assert!(foreign.received_requests().await.unwrap_or_default().is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

// ---------------------------------------------------------------------------
// Refresh and retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_token_is_refreshed_and_call_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([plan_json(1, "Legs")])))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })),
        1,
    )
    .await;

    let store = seeded_store("A1", "R1");
    let session = manager(&server, store.clone());
    let log = EventLog::attach(&session);

    let plans = session.workout_plans().list().await.expect("retried list");

    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].name, "Legs");
    assert_eq!(store.load(), Credentials::new("A2", "R1"));
    assert_eq!(log.events(), vec![SessionEvent::Refreshed]);
    assert_eq!(requests_to(&server, "/api/workout-plans/").await, 2);
}

#[tokio::test]
async fn retried_call_error_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/7/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/7/"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })),
        1,
    )
    .await;

    let store = seeded_store("A1", "R1");
    let session = manager(&server, store.clone());
    let err = session.workout_plans().get(7).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(!err.is_session_expired());
    assert_eq!(store.access_token().as_deref(), Some("A2"));
}

#[tokio::test]
async fn second_unauthorized_ends_without_third_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })),
        1,
    )
    .await;

    let store = seeded_store("A1", "R1");
    let session = manager(&server, store.clone());
    let log = EventLog::attach(&session);

    let err = session.workout_plans().list().await.unwrap_err();

    assert!(matches!(err, FitplanError::Auth(AuthError::SessionExpired)));
    assert!(store.load().is_empty());
    assert!(log.redirected_to("/login"));
}

// ---------------------------------------------------------------------------
// Failure path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_refresh_clears_credentials_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token is invalid or expired" })),
        1,
    )
    .await;

    let store = seeded_store(&alice_token(), "R1");
    let session = manager(&server, store.clone());
    let log = EventLog::attach(&session);
    assert!(session.session().is_some());

    let err = session.workout_plans().list().await.unwrap_err();

    assert!(err.is_session_expired());
    assert!(store.load().is_empty());
    assert!(session.session().is_none());
    assert_eq!(
        log.events(),
        vec![
            SessionEvent::LoggedOut,
            SessionEvent::Redirect {
                to: "/login".to_string()
            }
        ]
    );
}

#[tokio::test]
async fn refresh_server_error_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/me/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "R1", ResponseTemplate::new(503), 1).await;

    let store = seeded_store("A1", "R1");
    let session = manager(&server, store.clone());

    let err = session.current_user().await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(store.load().is_empty());
}

#[tokio::test]
async fn refresh_response_without_access_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "detail": "ok" })),
        1,
    )
    .await;

    let store = seeded_store("A1", "R1");
    let session = manager(&server, store.clone());

    let err = session.workout_plans().list().await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(store.load().is_empty());
}

#[tokio::test]
async fn refresh_network_error_is_terminal() {
    // A refresh that times out counts as a network failure.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": "A2" }))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let store = seeded_store("A1", "R1");
    let session = fitplan::session::SessionManager::with_client(
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(500))
            .build()
            .expect("client"),
        support::base_url(&server),
        store.clone(),
    );

    let err = session.workout_plans().list().await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(store.load().is_empty());
}

#[tokio::test]
async fn unauthorized_without_refresh_token_skips_refresh_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(0)
        .mount(&server)
        .await;

    let session = manager(&server, empty_store());
    let log = EventLog::attach(&session);

    let err = session.workout_plans().list().await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(log.redirected_to("/login"));
}

// ---------------------------------------------------------------------------
// Non-auth failures pass through
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_and_server_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workout-plans/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "name": ["This field is required."] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(0)
        .mount(&server)
        .await;

    let store = seeded_store("A1", "R1");
    let session = manager(&server, store.clone());

    let err = session
        .post::<_, Value>("workout-plans/", &json!({ "name": "" }))
        .await
        .unwrap_err();
    match &err {
        FitplanError::Api { status, message } => {
            assert_eq!(*status, 400);
            assert!(message.contains("This field is required."));
        }
        other => panic!("expected Api error, got {other:?}"),
    }

    let err = session.workout_plans().list().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.is_retryable());

    assert_eq!(store.load(), Credentials::new("A1", "R1"));
}

#[tokio::test]
async fn network_failure_is_propagated_without_teardown() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    let url = reqwest::Url::parse(&format!("http://127.0.0.1:{port}/api/")).expect("url");

    let store = seeded_store("A1", "R1");
    let session =
        fitplan::session::SessionManager::with_client(reqwest::Client::new(), url, store.clone());

    let err = session.workout_plans().list().await.unwrap_err();
    assert!(matches!(err, FitplanError::Network(_)));
    assert_eq!(store.load(), Credentials::new("A1", "R1"));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/workout-plans/"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/exercises/"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200)
            .set_body_json(json!({ "access": "A2" }))
            .set_delay(std::time::Duration::from_millis(100)),
        1,
    )
    .await;

    let session = manager(&server, seeded_store("A1", "R1"));
    let plans_api = session.workout_plans();
    let exercises_api = session.exercises();
    let (plans, exercises) = tokio::join!(plans_api.list(), exercises_api.list());

    assert!(plans.expect("plans").is_empty());
    assert!(exercises.expect("exercises").is_empty());
}

#[tokio::test]
async fn concurrent_calls_tear_down_once_when_refresh_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(401).set_delay(std::time::Duration::from_millis(100)),
        1,
    )
    .await;

    let store = seeded_store("A1", "R1");
    let session = manager(&server, store.clone());
    let log = EventLog::attach(&session);
    let plans_api = session.workout_plans();
    let exercises_api = session.exercises();
    let (plans, exercises) = tokio::join!(plans_api.list(), exercises_api.list());

    assert!(plans.unwrap_err().is_session_expired());
    assert!(exercises.unwrap_err().is_session_expired());
    assert!(store.load().is_empty());
    assert_eq!(
        log.events(),
        vec![
            SessionEvent::LoggedOut,
            SessionEvent::Redirect {
                to: "/login".to_string()
            }
        ]
    );
}

// ---------------------------------------------------------------------------
// Empty bodies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_success_body_parses_as_unit() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/workout-plans/3/"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let session = manager(&server, seeded_store("A1", "R1"));
    session.workout_plans().delete(3).await.expect("typed delete");
    session
        .delete::<()>("workout-plans/3/")
        .await
        .expect("raw delete");
}
