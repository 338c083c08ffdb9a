//! Route table and request handlers.
//!
//! Handlers only translate HTTP to workflow calls and outcomes back to HTTP.
//! Successful mutations answer `302 Found` to the list view.

use crate::error::AppError;
use crate::session::Session;
use crate::state::AppState;
use crate::views::{self, FormMode};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use contact_core::{ContactCommand, DeleteCommand, MutationOutcome};
use log::warn;
use serde::Deserialize;

pub const CONTACTS_PATH: &str = "/contact";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route(
            CONTACTS_PATH,
            get(list_contacts)
                .post(submit_contact)
                .put(update_contact)
                .delete(delete_contact),
        )
        .route("/contact/add", get(add_form))
        .route("/contact/edit/:name", get(edit_form))
        .route("/contact/:name", get(contact_detail))
        .with_state(state)
}

/// `_method` override carried in the query string of HTML forms.
#[derive(Debug, Default, Deserialize)]
pub struct MethodOverride {
    #[serde(rename = "_method", default)]
    pub method: Option<String>,
}

/// Superset of every form posted to `/contact`.
#[derive(Debug, Default, Deserialize)]
pub struct ContactSubmission {
    #[serde(rename = "_method", default)]
    pub method: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(rename = "oldName", default)]
    pub old_name: Option<String>,
}

impl ContactSubmission {
    fn into_contact_command(self) -> ContactCommand {
        ContactCommand {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            old_name: self.old_name,
        }
    }

    fn into_delete_command(self) -> DeleteCommand {
        DeleteCommand {
            id: self.id,
            name: self.name,
        }
    }
}

pub async fn home(session: Session) -> Response {
    session.attach(Html(views::home_page()).into_response())
}

pub async fn about(session: Session) -> Response {
    session.attach(Html(views::about_page()).into_response())
}

pub async fn list_contacts(State(state): State<AppState>, session: Session) -> Response {
    let result = state
        .run(session.id(), |service, flash| service.list_contacts(flash))
        .await;
    respond(session, result.map(|view| Html(views::contact_list_page(&view)).into_response()))
}

pub async fn add_form(session: Session) -> Response {
    let page = views::contact_form_page(FormMode::Add, &ContactCommand::default(), &[]);
    session.attach(Html(page).into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(name): Path<String>,
) -> Response {
    let lookup = name.clone();
    let result = state
        .run(session.id(), move |service, _| service.find_contact(&lookup))
        .await;
    respond(
        session,
        result.map(|found| match found {
            Some(contact) => {
                let values = ContactCommand::edit(
                    contact.id,
                    contact.name.as_str(),
                    contact.name.as_str(),
                    contact.email.as_str(),
                    contact.phone.as_str(),
                );
                Html(views::contact_form_page(FormMode::Edit, &values, &[])).into_response()
            }
            None => not_found(&name),
        }),
    )
}

pub async fn contact_detail(
    State(state): State<AppState>,
    session: Session,
    Path(name): Path<String>,
) -> Response {
    let lookup = name.clone();
    let result = state
        .run(session.id(), move |service, _| service.find_contact(&lookup))
        .await;
    respond(
        session,
        result.map(|found| match found {
            Some(contact) => Html(views::contact_detail_page(&contact)).into_response(),
            None => not_found(&name),
        }),
    )
}

/// `POST /contact`: add, or edit/delete when a `_method` override is present.
pub async fn submit_contact(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MethodOverride>,
    Form(submission): Form<ContactSubmission>,
) -> Response {
    let method = query
        .method
        .or_else(|| submission.method.clone())
        .map(|value| value.trim().to_ascii_uppercase());

    match method.as_deref() {
        None | Some("POST") => {
            let command = submission.into_contact_command();
            let result = run_mutation(&state, session, command, FormMode::Add).await;
            respond(session, result)
        }
        Some("PUT") => {
            let command = submission.into_contact_command();
            let result = run_mutation(&state, session, command, FormMode::Edit).await;
            respond(session, result)
        }
        Some("DELETE") => {
            let result = run_delete(&state, session, submission.into_delete_command()).await;
            respond(session, result)
        }
        Some(other) => {
            warn!("event=method_override module=http status=rejected method={other}");
            session.attach(StatusCode::METHOD_NOT_ALLOWED.into_response())
        }
    }
}

pub async fn update_contact(
    State(state): State<AppState>,
    session: Session,
    Form(command): Form<ContactCommand>,
) -> Response {
    let result = run_mutation(&state, session, command, FormMode::Edit).await;
    respond(session, result)
}

pub async fn delete_contact(
    State(state): State<AppState>,
    session: Session,
    Form(command): Form<DeleteCommand>,
) -> Response {
    let result = run_delete(&state, session, command).await;
    respond(session, result)
}

async fn run_mutation(
    state: &AppState,
    session: Session,
    command: ContactCommand,
    mode: FormMode,
) -> Result<Response, AppError> {
    let submitted = command.clone();
    let outcome = state
        .run(session.id(), move |service, flash| match mode {
            FormMode::Add => service.add_contact(&command, flash),
            FormMode::Edit => service.edit_contact(&command, flash),
        })
        .await?;

    Ok(match outcome {
        MutationOutcome::Completed(_) => redirect_to_list(),
        MutationOutcome::Rejected(errors) => {
            Html(views::contact_form_page(mode, &submitted, &errors)).into_response()
        }
    })
}

async fn run_delete(
    state: &AppState,
    session: Session,
    command: DeleteCommand,
) -> Result<Response, AppError> {
    state
        .run(session.id(), move |service, flash| {
            service.delete_contact(&command, flash)
        })
        .await?;
    Ok(redirect_to_list())
}

fn redirect_to_list() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, CONTACTS_PATH)]).into_response()
}

fn not_found(name: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(views::not_found_page(name))).into_response()
}

fn respond(session: Session, result: Result<Response, AppError>) -> Response {
    session.attach(result.unwrap_or_else(IntoResponse::into_response))
}
