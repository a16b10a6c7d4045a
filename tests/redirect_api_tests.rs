use classconnect_gateway::{
    AppState,
    auth::Claims,
    backend::{BackendState, MockBackend},
    config::AppConfig,
    create_router,
    models::{EducationLevel, UserProfile},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::net::TcpListener;
use uuid::Uuid;

// --- Test Utilities ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(42);

struct TestApp {
    address: String,
    backend: Arc<MockBackend>,
}

async fn spawn_app(backend: MockBackend) -> TestApp {
    let backend = Arc::new(backend);

    let mut config = AppConfig::default();
    config.jwt_secret = TEST_JWT_SECRET.to_string();

    let state = AppState {
        backend: backend.clone() as BackendState,
        config,
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, backend }
}

fn create_token(user_id: Uuid, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn admin_profile() -> UserProfile {
    UserProfile {
        id: TEST_USER_ID,
        is_superuser: true,
        ..UserProfile::default()
    }
}

fn student_profile() -> UserProfile {
    UserProfile {
        id: TEST_USER_ID,
        education_level: EducationLevel::University,
        ..UserProfile::default()
    }
}

/// Client that does not follow redirects, so 307 responses can be asserted.
fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app(MockBackend::new()).await;
    let response = reqwest::Client::new()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_admin_browser_navigation_gets_307_to_admin() {
    let app = spawn_app(MockBackend {
        profile_to_return: Some(admin_profile()),
        ..MockBackend::default()
    })
    .await;

    let response = no_redirect_client()
        .get(format!("{}/api/redirect", app.address))
        .bearer_auth(create_token(TEST_USER_ID, 3600))
        .header("accept", "text/html")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "/admin"
    );
    // The per-session decision must never be cached.
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .unwrap()
            .to_str()
            .unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn test_admin_programmatic_mode_gets_json_payload() {
    let app = spawn_app(MockBackend {
        profile_to_return: Some(admin_profile()),
        ..MockBackend::default()
    })
    .await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/redirect", app.address))
        .bearer_auth(create_token(TEST_USER_ID, 3600))
        .header("x-prefer-json", "true")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "redirectUrl": "/admin" }));
}

#[tokio::test]
async fn test_unauthenticated_programmatic_mode_gets_login_route() {
    let app = spawn_app(MockBackend::new()).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/redirect", app.address))
        .header("x-prefer-json", "true")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "redirectUrl": "/auth/login" }));
}

#[tokio::test]
async fn test_json_query_parameter_selects_programmatic_mode() {
    let app = spawn_app(MockBackend {
        profile_to_return: Some(student_profile()),
        ..MockBackend::default()
    })
    .await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/redirect?json=true", app.address))
        .bearer_auth(create_token(TEST_USER_ID, 3600))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "redirectUrl": "/students" }));
}

#[tokio::test]
async fn test_malformed_json_query_value_still_routes() {
    let app = spawn_app(MockBackend {
        profile_to_return: Some(student_profile()),
        ..MockBackend::default()
    })
    .await;

    // A value that is not a boolean literal must not abort the gate with a
    // 400; it simply selects browser mode.
    for query in ["json=1", "json=yes", "json=", "json=falseish"] {
        let response = no_redirect_client()
            .get(format!("{}/api/redirect?{}", app.address, query))
            .bearer_auth(create_token(TEST_USER_ID, 3600))
            .send()
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            reqwest::StatusCode::TEMPORARY_REDIRECT,
            "query {:?} should fall back to a browser redirect",
            query
        );
        assert_eq!(response.headers()["location"], "/students");
    }
}

#[tokio::test]
async fn test_json_query_value_is_case_insensitive() {
    let app = spawn_app(MockBackend {
        profile_to_return: Some(student_profile()),
        ..MockBackend::default()
    })
    .await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/redirect?json=TRUE", app.address))
        .bearer_auth(create_token(TEST_USER_ID, 3600))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "redirectUrl": "/students" }));
}

#[tokio::test]
async fn test_post_is_accepted_by_the_gate() {
    let app = spawn_app(MockBackend {
        profile_to_return: Some(student_profile()),
        ..MockBackend::default()
    })
    .await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/redirect", app.address))
        .bearer_auth(create_token(TEST_USER_ID, 3600))
        .header("x-prefer-json", "true")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "redirectUrl": "/students" }));
}

#[tokio::test]
async fn test_expired_session_redirects_to_login_and_signs_out() {
    let app = spawn_app(MockBackend {
        profile_to_return: Some(student_profile()),
        ..MockBackend::default()
    })
    .await;

    // Token expired an hour ago; the gate must land the caller on login and
    // trigger the sign-out side effect against the session provider.
    let response = no_redirect_client()
        .get(format!("{}/api/redirect", app.address))
        .bearer_auth(create_token(TEST_USER_ID, -3600))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "/auth/login"
    );

    // The sign-out runs off the request path; allow it a moment.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(app.backend.sign_out_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_backend_failure_during_session_check_degrades_to_login() {
    // The profile fetch fails upstream: the caller must not hang in an
    // indeterminate state, they land on the login route.
    let app = spawn_app(MockBackend::new_failing()).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/redirect", app.address))
        .bearer_auth(create_token(TEST_USER_ID, 3600))
        .header("x-prefer-json", "true")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "redirectUrl": "/auth/login" }));
}

#[tokio::test]
async fn test_garbage_token_is_treated_as_unauthenticated() {
    let app = spawn_app(MockBackend {
        profile_to_return: Some(student_profile()),
        ..MockBackend::default()
    })
    .await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/redirect", app.address))
        .bearer_auth("not-a-jwt")
        .header("x-prefer-json", "true")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "redirectUrl": "/auth/login" }));
    // No sign-out for a token that never was a session.
    assert_eq!(app.backend.sign_out_calls.load(Ordering::SeqCst), 0);
}
