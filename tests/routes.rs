//! Router-level tests driving the full middleware stack

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Method, Request, StatusCode,
    },
    response::Response,
    Router,
};
use futures::StreamExt;
use tower::ServiceExt;

use hxdash::{api::create_app, AppState, Config, SharedState};

const FORM: &str = "application/x-www-form-urlencoded";

fn setup() -> (SharedState, Router) {
    let state = AppState::shared(Config::default()).unwrap();
    let app = create_app(state.clone());
    (state, app)
}

fn session_cookie(state: &SharedState) -> String {
    let token = state.sessions.issue("ann@x.com");
    format!("{}={}", state.sessions.cookie_name(), token)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed(state: &SharedState, method: Method, uri: &str, form: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(COOKIE, session_cookie(state));
    match form {
        Some(body) => builder
            .header(CONTENT_TYPE, FORM)
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn anonymous_users_page_redirects_to_login() {
    let (_, app) = setup();

    let response = app.oneshot(get("/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[LOCATION], "/login?next=/users");
}

#[tokio::test]
async fn anonymous_htmx_request_gets_hx_redirect() {
    let (_, app) = setup();
    let request = Request::builder()
        .uri("/users")
        .header("HX-Request", "true")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-redirect"], "/login?next=/users");
}

#[tokio::test]
async fn forged_cookie_is_rejected() {
    let (_, app) = setup();
    let request = Request::builder()
        .uri("/users")
        .header(COOKIE, "session=anything")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn login_redirects_to_next_and_sets_cookie() {
    let (state, app) = setup();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/login?next=/users")
        .header(CONTENT_TYPE, FORM)
        .body(Body::from("email=ann%40x.com&password=secret"))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[LOCATION], "/users");

    let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    // The issued cookie opens the protected page.
    let pair = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/users")
        .header(COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.metrics.logins.get(), 1);
}

#[tokio::test]
async fn login_defaults_to_users_and_ignores_offsite_next() {
    let (_, app) = setup();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/login?next=https://evil.example")
        .header(CONTENT_TYPE, FORM)
        .body(Body::from("email=ann%40x.com&password=secret"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()[LOCATION], "/users");
}

async fn login_via(app: &Router, login_uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(login_uri)
        .header(CONTENT_TYPE, FORM)
        .body(Body::from("email=ann%40x.com&password=secret"))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn return_to_survives_the_login_round_trip() {
    let (_, app) = setup();

    for (original, gate_target) in [
        ("/users+team", "/login?next=/users%2Bteam"),
        ("/users?a=1&b=2", "/login?next=/users%3Fa%3D1%26b%3D2"),
    ] {
        let gated = app.clone().oneshot(get(original)).await.unwrap();
        assert_eq!(gated.status(), StatusCode::FOUND);
        assert_eq!(gated.headers()[LOCATION], gate_target);

        // The login form posts back to the same encoded URL.
        let form = body_text(app.clone().oneshot(get(gate_target)).await.unwrap()).await;
        let encoded = gate_target.replace('/', "&#x2f;");
        assert!(form.contains(&format!("action=\"{}\"", encoded)), "{}", form);

        let response = login_via(&app, gate_target).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], original);
    }
}

#[tokio::test]
async fn invalid_login_returns_error_fragment() {
    let (_, app) = setup();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(CONTENT_TYPE, FORM)
        .body(Body::from("email=nope&password="))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(SET_COOKIE).is_none());

    let body = body_text(response).await;
    assert!(body.contains(r#"data-field="email""#));
    assert!(body.contains(r#"data-field="password""#));
}

#[tokio::test]
async fn logout_clears_cookie() {
    let (state, app) = setup();

    let response = app
        .oneshot(authed(&state, Method::POST, "/logout", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[LOCATION], "/login");
    assert!(response.headers()[SET_COOKIE]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));
}

#[tokio::test]
async fn users_page_renders_full_or_fragment() {
    let (state, app) = setup();

    let full = app
        .clone()
        .oneshot(authed(&state, Method::GET, "/users", None))
        .await
        .unwrap();
    assert_eq!(full.status(), StatusCode::OK);
    let html = body_text(full).await;
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("john@email.com"));
    assert!(html.contains("sse-connect"));

    let mut request = authed(&state, Method::GET, "/users", None);
    request
        .headers_mut()
        .insert("hx-request", "true".parse().unwrap());
    let fragment = body_text(app.oneshot(request).await.unwrap()).await;
    assert!(!fragment.contains("<html"));
    assert!(fragment.contains("users-table-body"));
    assert!(fragment.contains("jane@email.com"));
}

#[tokio::test]
async fn landing_is_public() {
    let (_, app) = setup();

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("sse-connect"));
}

#[tokio::test]
async fn create_user_returns_row_and_closes_modal() {
    let (state, app) = setup();

    let response = app
        .oneshot(authed(
            &state,
            Method::POST,
            "/users",
            Some("name=Ann&email=ann%40x.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["hx-trigger"], "closeModal");

    let row = body_text(response).await;
    assert!(row.contains("<tr id=\"users-table-row-"));
    assert!(row.contains("ann@x.com"));

    assert_eq!(state.directory.len(), 3);
    assert_eq!(state.metrics.users_total.get(), 3);
}

#[tokio::test]
async fn create_user_rejects_invalid_fields() {
    let (state, app) = setup();

    let response = app
        .oneshot(authed(&state, Method::POST, "/users", Some("name=A&email=bad")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_text(response).await;
    assert!(body.contains(r#"data-field="name""#));
    assert!(body.contains(r#"data-field="email""#));
    assert_eq!(state.directory.len(), 2);
}

#[tokio::test]
async fn update_user_merges_and_reports_unknown_ids() {
    let (state, app) = setup();
    let user = state.directory.create("Ann", "ann@x.com");

    let response = app
        .clone()
        .oneshot(authed(
            &state,
            Method::PUT,
            &format!("/users/{}", user.id),
            Some("name=Anna&email=anna%40x.com"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-trigger"], "closeModal");
    assert_eq!(state.directory.get(&user.id).unwrap().name, "Anna");

    let missing = app
        .oneshot(authed(
            &state,
            Method::PUT,
            "/users/does-not-exist",
            Some("name=Anna&email=anna%40x.com"),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(state.directory.get("does-not-exist").is_none());
    assert_eq!(state.directory.len(), 3);
}

#[tokio::test]
async fn delete_user_twice() {
    let (state, app) = setup();
    let user = state.directory.create("Ann", "ann@x.com");
    let uri = format!("/users/{}", user.id);

    let first = app
        .clone()
        .oneshot(authed(&state, Method::DELETE, &uri, None))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert!(body_text(first).await.is_empty());

    let second = app
        .oneshot(authed(&state, Method::DELETE, &uri, None))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.directory.len(), 2);
}

#[tokio::test]
async fn dialogs_render_for_known_users_only() {
    let (state, app) = setup();
    let user = state.directory.create("Ann", "ann@x.com");

    let create = app
        .clone()
        .oneshot(authed(&state, Method::GET, "/_components/users/new", None))
        .await
        .unwrap();
    assert!(body_text(create).await.contains(r#"hx-post="/users""#));

    let update = app
        .clone()
        .oneshot(authed(
            &state,
            Method::GET,
            &format!("/_components/users/update/{}", user.id),
            None,
        ))
        .await
        .unwrap();
    assert!(body_text(update).await.contains("ann@x.com"));

    let missing = app
        .oneshot(authed(&state, Method::GET, "/_components/users/update/nope", None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn connected_stream_counts_and_unregisters() {
    let (state, app) = setup();

    let response = app
        .oneshot(authed(&state, Method::GET, "/users/connected", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");
    assert_eq!(state.presence.count(), 1);
    assert_eq!(state.presence.listener_count(), 1);

    let mut body = response.into_body().into_data_stream();
    let frame = body.next().await.unwrap().unwrap();
    let frame = String::from_utf8(frame.to_vec()).unwrap();
    assert!(frame.contains("event: connected-users:change"));
    assert!(frame.contains("1 viewer connected"));

    // Client goes away.
    drop(body);
    assert_eq!(state.presence.count(), 0);
    assert_eq!(state.presence.listener_count(), 0);
}

#[tokio::test]
async fn health_and_metrics_are_public() {
    let (_, app) = setup();

    let health = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(health).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["users"], 2);

    let metrics = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
    assert!(body_text(metrics).await.contains("hxdash_users_total 2"));
}

#[tokio::test]
async fn static_stylesheet_is_served() {
    let (_, app) = setup();

    let response = app.oneshot(get("/static/css/style.css")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
