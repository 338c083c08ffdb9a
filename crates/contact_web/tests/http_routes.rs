use axum::body::to_bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use axum::Form;
use contact_core::db::open_db_in_memory;
use contact_core::{
    ContactCommand, DeleteCommand, FlashStore, RepoError, ServiceError, CATEGORY_SUCCESS,
};
use contact_web::routes::{
    add_form, contact_detail, delete_contact, edit_form, list_contacts, submit_contact,
    update_contact, ContactSubmission, MethodOverride,
};
use contact_web::{AppError, AppState, Session, SESSION_COOKIE};
use std::time::Duration;
use uuid::Uuid;

fn test_state() -> AppState {
    AppState::new(
        open_db_in_memory().unwrap(),
        FlashStore::default(),
        Duration::from_secs(5),
    )
}

fn browser_session() -> Session {
    let mut headers = HeaderMap::new();
    let cookie = format!("{SESSION_COOKIE}={}", Uuid::new_v4());
    headers.insert(COOKIE, HeaderValue::from_str(&cookie).unwrap());
    Session::from_headers(&headers)
}

fn add_submission(name: &str, email: &str, phone: &str) -> ContactSubmission {
    ContactSubmission {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        ..ContactSubmission::default()
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn add(state: &AppState, session: Session, name: &str) -> Response {
    submit_contact(
        State(state.clone()),
        session,
        Query(MethodOverride::default()),
        Form(add_submission(name, "x@y.com", "081234567890")),
    )
    .await
}

async fn contact_id(state: &AppState, session: Session, name: &str) -> Uuid {
    let name = name.to_string();
    state
        .run(session.id(), move |service, _| service.find_contact(&name))
        .await
        .unwrap()
        .expect("contact should exist")
        .id
}

#[tokio::test]
async fn add_redirects_and_list_shows_one_shot_notice() {
    let state = test_state();
    let session = browser_session();

    let response = add(&state, session, "Jaka").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/contact");

    let first = body_text(list_contacts(State(state.clone()), session).await).await;
    assert!(first.contains("Contact added"));
    assert!(first.contains("Jaka"));

    let second = body_text(list_contacts(State(state.clone()), session).await).await;
    assert!(!second.contains("Contact added"));
    assert!(second.contains("Jaka"));
}

#[tokio::test]
async fn rejected_add_rerenders_form_with_input() {
    let state = test_state();
    let session = browser_session();

    let response = submit_contact(
        State(state.clone()),
        session,
        Query(MethodOverride::default()),
        Form(add_submission("Y", "not-an-email", "081234567890")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Invalid email!"));
    assert!(html.contains("value=\"not-an-email\""));
    assert!(html.contains("value=\"Y\""));

    let list = body_text(list_contacts(State(state), session).await).await;
    assert!(list.contains("No contacts yet."));
}

#[tokio::test]
async fn detail_and_edit_form_return_404_for_unknown_names() {
    let state = test_state();
    let session = browser_session();

    let detail = contact_detail(State(state.clone()), session, Path("Ghost".to_string())).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);
    assert!(body_text(detail).await.contains("Ghost"));

    let edit = edit_form(State(state), session, Path("Ghost".to_string())).await;
    assert_eq!(edit.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_escapes_user_data() {
    let state = test_state();
    let session = browser_session();
    add(&state, session, "<script>x</script>").await;

    let detail = contact_detail(
        State(state),
        session,
        Path("<script>x</script>".to_string()),
    )
    .await;
    assert_eq!(detail.status(), StatusCode::OK);
    let html = body_text(detail).await;
    assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    assert!(!html.contains("<script>x"));
}

#[tokio::test]
async fn put_edit_keeps_own_name_and_updates_fields() {
    let state = test_state();
    let session = browser_session();
    add(&state, session, "Jaka").await;
    let id = contact_id(&state, session, "Jaka").await;

    let form = edit_form(State(state.clone()), session, Path("Jaka".to_string())).await;
    assert!(body_text(form).await.contains(&id.to_string()));

    let command = ContactCommand::edit(id, "Jaka", "Jaka", "new@mail.id", "+6281234567890");
    let response = update_contact(State(state.clone()), session, Form(command)).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let detail = body_text(contact_detail(State(state), session, Path("Jaka".to_string())).await).await;
    assert!(detail.contains("new@mail.id"));
}

#[tokio::test]
async fn method_override_dispatches_edit_and_delete() {
    let state = test_state();
    let session = browser_session();
    add(&state, session, "A").await;
    add(&state, session, "B").await;
    let a_id = contact_id(&state, session, "A").await;

    let clash = ContactSubmission {
        id: Some(a_id.to_string()),
        old_name: Some("A".to_string()),
        ..add_submission("B", "a@y.com", "081234567890")
    };
    let response = submit_contact(
        State(state.clone()),
        session,
        Query(MethodOverride {
            method: Some("put".to_string()),
        }),
        Form(clash),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Contact name is already taken"));

    let delete = ContactSubmission {
        method: Some("DELETE".to_string()),
        id: Some(a_id.to_string()),
        ..ContactSubmission::default()
    };
    let response = submit_contact(
        State(state.clone()),
        session,
        Query(MethodOverride::default()),
        Form(delete),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let detail = contact_detail(State(state), session, Path("A".to_string())).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_missing_contact_flashes_error() {
    let state = test_state();
    let session = browser_session();

    let response = delete_contact(
        State(state.clone()),
        session,
        Form(DeleteCommand::by_name("Nobody")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let list = body_text(list_contacts(State(state), session).await).await;
    assert!(list.contains("Contact no longer exists"));
}

#[tokio::test]
async fn unknown_method_override_is_rejected() {
    let state = test_state();
    let session = browser_session();

    let response = submit_contact(
        State(state),
        session,
        Query(MethodOverride {
            method: Some("PATCH".to_string()),
        }),
        Form(ContactSubmission::default()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn new_sessions_receive_cookie() {
    let session = Session::from_headers(&HeaderMap::new());
    let response = add_form(session).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains(&session.id().to_string()));
}

#[tokio::test]
async fn slow_workflows_fail_with_storage_timeout() {
    let state = AppState::new(
        open_db_in_memory().unwrap(),
        FlashStore::default(),
        Duration::from_millis(50),
    );

    let err = state
        .run(Uuid::new_v4(), |_, _| {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Service(ServiceError::StorageTimeout { timeout_ms: 50 })
    ));
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(state.store_timeout(), Duration::from_millis(50));
}

#[tokio::test]
async fn timed_out_add_never_reaches_the_store() {
    let state = AppState::new(
        open_db_in_memory().unwrap(),
        FlashStore::default(),
        Duration::from_millis(100),
    );
    let session = browser_session();

    let busy = state.clone();
    let holder = tokio::spawn(async move {
        busy.run(Uuid::new_v4(), |_, _| {
            std::thread::sleep(Duration::from_millis(400));
            Ok(())
        })
        .await
    });
    tokio::time::sleep(Duration::from_millis(30)).await;

    let response = add(&state, session, "Jaka").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Outlast the slow workflow so the queued add gets the lock and gives up.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(holder.await.unwrap().is_err());

    let (stored, notices) = state
        .run(session.id(), |service, flash| {
            Ok((service.find_contact("Jaka")?, flash.drain(CATEGORY_SUCCESS)))
        })
        .await
        .unwrap();
    assert!(stored.is_none());
    assert!(notices.is_empty());
}

#[tokio::test]
async fn storage_failures_render_500() {
    let err = AppError::from(ServiceError::Storage(RepoError::InvalidData(
        "bad row".to_string(),
    )));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = axum::response::IntoResponse::into_response(err);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("unavailable"));
}
