//! Shared handles injected into every request.
//!
//! # Invariants
//! - Workflows run off the async executor, one at a time, while holding the
//!   connection lock, so validate-then-write is never interleaved.
//! - A workflow exceeding the store budget fails with `StorageTimeout`.
//! - A workflow whose request already timed out never touches the store.

use crate::error::AppError;
use contact_core::{
    ContactService, FlashScope, FlashStore, ServiceError, ServiceResult, SessionId,
    SqliteContactRepository,
};
use log::warn;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Service type every workflow closure receives.
pub type Workflows<'conn> = ContactService<SqliteContactRepository<'conn>>;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppInner>,
}

struct AppInner {
    conn: Mutex<Connection>,
    flash: FlashStore,
    store_timeout: Duration,
}

impl AppState {
    pub fn new(conn: Connection, flash: FlashStore, store_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(AppInner {
                conn: Mutex::new(conn),
                flash,
                store_timeout,
            }),
        }
    }

    pub fn flash(&self) -> &FlashStore {
        &self.inner.flash
    }

    pub fn store_timeout(&self) -> Duration {
        self.inner.store_timeout
    }

    /// Runs one workflow against the store on the blocking pool.
    pub async fn run<T, F>(&self, session: SessionId, workflow: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Workflows<'_>, &FlashScope<'_>) -> ServiceResult<T> + Send + 'static,
    {
        let timeout = self.store_timeout();
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let deadline = Instant::now() + timeout;
        let state = self.clone();
        let task = tokio::task::spawn_blocking(move || {
            // A panicked workflow leaves the connection itself intact.
            let conn = state
                .inner
                .conn
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if Instant::now() >= deadline {
                warn!("event=workflow_skipped module=http status=timeout timeout_ms={timeout_ms}");
                return Err(ServiceError::StorageTimeout { timeout_ms });
            }
            let service = ContactService::new(SqliteContactRepository::new(&conn));
            workflow(&service, &state.inner.flash.scope(session))
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result.map_err(AppError::from),
            Ok(Err(join_err)) => Err(AppError::Worker(join_err.to_string())),
            Err(_) => Err(AppError::Service(ServiceError::StorageTimeout { timeout_ms })),
        }
    }
}
