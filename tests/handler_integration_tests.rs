use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use classconnect_gateway::{
    AppState,
    auth::AuthSession,
    backend::{BackendState, MockBackend},
    config::AppConfig,
    handlers,
    models::{AdminOverview, EducationLevel, Message, Notification, UserProfile, VisitReport},
    roles::Role,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::test;
use uuid::Uuid;

// --- Test Utilities ---

const TEST_ID: Uuid = Uuid::from_u128(123);
const TEST_ADMIN_ID: Uuid = Uuid::from_u128(456);

fn create_test_state(backend: MockBackend) -> (AppState, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    let state = AppState {
        backend: backend.clone() as BackendState,
        config: AppConfig::default(),
    };
    (state, backend)
}

fn far_future_ms() -> i64 {
    chrono::Utc::now().timestamp_millis() + 3_600_000
}

// Creates AuthSession values for direct handler calls.
fn admin_session() -> AuthSession {
    AuthSession {
        token: "admin-token".to_string(),
        profile: UserProfile {
            id: TEST_ADMIN_ID,
            is_superuser: true,
            ..UserProfile::default()
        },
        role: Role::Admin,
        expires_at: far_future_ms(),
    }
}

fn student_session() -> AuthSession {
    AuthSession {
        token: "student-token".to_string(),
        profile: UserProfile {
            id: TEST_ID,
            education_level: EducationLevel::College,
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            ..UserProfile::default()
        },
        role: Role::Student,
        expires_at: far_future_ms(),
    }
}

// --- Handler Tests ---

#[test]
async fn test_get_me_reports_resolved_role() {
    let Json(profile) = handlers::get_me(student_session()).await;

    assert_eq!(profile.id, TEST_ID);
    assert_eq!(profile.display_name, "Ada Lovelace");
    assert_eq!(profile.role, Role::Student);
}

#[test]
async fn test_get_thread_renders_backend_message() {
    let root = Message {
        id: TEST_ID,
        content: "welcome to the course forum".to_string(),
        created_at: "2024-03-01T10:00:00Z".to_string(),
        replies: vec![Message {
            id: Uuid::from_u128(2),
            content: "thanks!".to_string(),
            created_at: "2024-03-01T11:00:00Z".to_string(),
            ..Message::default()
        }],
        ..Message::default()
    };
    let (state, _) = create_test_state(MockBackend {
        thread_to_return: Some(root),
        ..MockBackend::default()
    });

    let result = handlers::get_thread(student_session(), State(state), Path(TEST_ID)).await;

    let Json(view) = result.expect("thread should render");
    assert_eq!(view.id, TEST_ID);
    assert_eq!(view.messages.len(), 2);
    assert_eq!(view.messages[1].indent, 1);
}

#[test]
async fn test_get_thread_surfaces_upstream_body_verbatim() {
    let (state, _) = create_test_state(MockBackend::default());

    let result = handlers::get_thread(student_session(), State(state), Path(TEST_ID)).await;

    let (status, body) = result.expect_err("unknown thread should fail");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "thread not found");
}

#[test]
async fn test_get_notifications_success() {
    let (state, _) = create_test_state(MockBackend {
        notifications_to_return: vec![Notification::default()],
        ..MockBackend::default()
    });

    let result = handlers::get_notifications(student_session(), State(state)).await;

    let Json(notifications) = result.unwrap();
    assert_eq!(notifications.len(), 1);
}

#[test]
async fn test_get_notifications_failure_is_displayable() {
    let (state, _) = create_test_state(MockBackend::new_failing());

    let result = handlers::get_notifications(student_session(), State(state)).await;

    let (status, body) = result.expect_err("backend failure must surface");
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, "mock backend unavailable");
}

#[test]
async fn test_admin_overview_forbidden_for_students() {
    let (state, _) = create_test_state(MockBackend::default());

    let result = handlers::get_admin_overview(student_session(), State(state)).await;

    let (status, _) = result.expect_err("student must not see the overview");
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[test]
async fn test_admin_overview_success() {
    let (state, _) = create_test_state(MockBackend {
        overview_to_return: AdminOverview {
            total_users: 12,
            total_courses: 3,
            open_threads: 7,
        },
        ..MockBackend::default()
    });

    let result = handlers::get_admin_overview(admin_session(), State(state)).await;

    let Json(overview) = result.unwrap();
    assert_eq!(overview.total_users, 12);
    assert_eq!(overview.open_threads, 7);
}

#[test]
async fn test_report_visit_always_accepts() {
    // Telemetry fails silently by design: even a failing backend yields 202.
    let (state, backend) = create_test_state(MockBackend::new_failing());

    let status = handlers::report_visit(
        student_session(),
        State(state),
        Json(VisitReport {
            path: "/students".to_string(),
        }),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(backend.visit_calls.load(Ordering::SeqCst), 1);
}
