//! Session cookie extraction.
//!
//! The session id only keys flash notices; it carries no identity.

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use contact_core::SessionId;
use std::convert::Infallible;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "contact_sid";

/// Session bound to the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    is_new: bool,
}

impl Session {
    /// Reads the session cookie, minting a fresh id when absent or malformed.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match session_cookie(headers) {
            Some(id) => Self { id, is_new: false },
            None => Self {
                id: Uuid::new_v4(),
                is_new: true,
            },
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Sets the session cookie on `response` when the id was just minted.
    pub fn attach(&self, mut response: Response) -> Response {
        if self.is_new {
            let cookie = format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
