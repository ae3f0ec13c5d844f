//! Compensating actions for multi-step writes that span both stores.
//!
//! The identity store and the relational store share no transaction, so a
//! write touching both runs as a saga: each completed step registers an undo,
//! and a failing step triggers every registered undo in reverse order.
//!
//! # Example
//! ```ignore
//! let mut saga = Saga::new("provision");
//! let user = saga.run("create identity user", identity.create_user(new_user)).await?;
//! saga.on_failure("delete identity user", async move { identity.delete_user(user.id).await });
//! saga.run("insert profile", profiles.insert(user.id, profile)).await?;
//! saga.complete();
//! ```

use std::future::Future;

use futures::future::BoxFuture;

use crate::errors::AppResult;

/// One in-flight saga.
///
/// Dropping a saga without calling [`Saga::complete`] discards the
/// registered undos without running them.
pub struct Saga {
    name: &'static str,
    compensations: Vec<(String, BoxFuture<'static, AppResult<()>>)>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            compensations: Vec::new(),
        }
    }

    /// Register an undo for the step that just succeeded.
    pub fn on_failure<F>(&mut self, label: impl Into<String>, undo: F)
    where
        F: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.compensations.push((label.into(), Box::pin(undo)));
    }

    /// Run a step. On error, compensate and return the step's error.
    pub async fn run<T, F>(&mut self, label: &str, step: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match step.await {
            Ok(value) => {
                tracing::debug!(saga = self.name, step = label, "Step completed");
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(saga = self.name, step = label, error = %e, "Step failed, compensating");
                self.compensate().await;
                Err(e)
            }
        }
    }

    /// Run every registered undo, newest first. Undo failures are logged.
    pub async fn compensate(&mut self) {
        while let Some((label, undo)) = self.compensations.pop() {
            match undo.await {
                Ok(()) => tracing::info!(saga = self.name, undo = %label, "Compensation applied"),
                Err(e) => tracing::error!(
                    saga = self.name,
                    undo = %label,
                    error = %e,
                    "Compensation failed; manual cleanup may be required"
                ),
            }
        }
    }

    /// Mark the saga successful and forget the undos.
    pub fn complete(mut self) {
        self.compensations.clear();
        tracing::debug!(saga = self.name, "Saga completed");
    }
}
