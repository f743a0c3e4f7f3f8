//! # Callback dispatch
//!
//! When a session leaves a screen that declares a `callback`, the dispatcher
//! runs it with the session identifiers and the user's input:
//!
//! - `function` callbacks are looked up by name in a [`FunctionRegistry`];
//! - `http` callbacks POST the payload as JSON to the named URL.
//!
//! `sync` callbacks are awaited and their outcome returned. `async` callbacks
//! are handed to a bounded [`CallbackPool`] and a [`CallbackTicket`] is
//! returned straight away.

use crate::config::EngineConfig;
use crate::error::DispatchError;
use crate::screen::{CallbackDefinition, CallbackKind, CallbackMode, Screen};
use crate::store::ScreenStore;
use crate::validator;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

mod http;
mod pool;
mod registry;

pub use http::HttpCallbackClient;
pub use pool::{CallbackPool, CallbackTicket, PoolStats};
pub use registry::{CallbackHandler, FnHandler, FunctionRegistry, HandlerResult};

/// The fields every callback receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub session_id: String,
    /// The user's input, already translated through the screen's mappings.
    pub user_input: String,
    pub phone_number: String,
}

/// The result of a callback that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Function(serde_json::Value),
    Http { status: u16, body: String },
}

/// What [`CallbackDispatcher::dispatch`] did with a callback.
#[derive(Debug)]
pub enum Dispatch {
    /// A `sync` callback finished.
    Completed(CallbackOutcome),
    /// An `async` callback was started in the background.
    Detached(CallbackTicket),
    /// An `async` callback was not started because the pool was full. The
    /// rejection is counted in [`PoolStats`].
    Dropped { callback: String },
}

type Invocation = BoxFuture<'static, Result<CallbackOutcome, DispatchError>>;

#[derive(Debug, Clone)]
pub struct CallbackDispatcher {
    registry: Arc<FunctionRegistry>,
    http: HttpCallbackClient,
    pool: CallbackPool,
}

impl CallbackDispatcher {
    pub fn new(registry: FunctionRegistry, config: &EngineConfig) -> Result<Self, DispatchError> {
        Ok(Self {
            registry: Arc::new(registry),
            http: HttpCallbackClient::new(config.callback_timeout())?,
            pool: CallbackPool::new(config.max_concurrent_callbacks),
        })
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &CallbackPool {
        &self.pool
    }

    /// Checks that every `function` callback named in `store` is registered.
    pub fn verify(&self, store: &ScreenStore) -> Result<(), DispatchError> {
        let missing = store
            .flows()
            .flat_map(|flow| flow.screens())
            .filter_map(|screen| screen.callback.as_ref())
            .find(|callback| {
                callback.kind == CallbackKind::Function && !self.registry.contains(&callback.name)
            });

        match missing {
            Some(callback) => Err(DispatchError::CallbackNotRegistered(callback.name.clone())),
            None => Ok(()),
        }
    }

    /// Runs the callback of `exited`, the screen the session just left.
    ///
    /// Returns `Ok(None)` when the screen has no callback or when `last_input`
    /// does not pass the screen's validation.
    pub async fn dispatch(
        &self,
        session_id: &str,
        phone_number: &str,
        last_input: &str,
        exited: &Screen,
    ) -> Result<Option<Dispatch>, DispatchError> {
        let Some(callback) = exited.callback.as_ref() else {
            return Ok(None);
        };
        if !validator::accepts(exited, last_input) {
            debug!(screen = %exited.name, "Input not valid, skipping callback");
            return Ok(None);
        }

        let payload = CallbackPayload {
            session_id: session_id.to_string(),
            user_input: exited.translate(last_input).to_string(),
            phone_number: phone_number.to_string(),
        };
        let invocation = self.invocation(callback, payload)?;

        debug!(
            screen = %exited.name,
            callback = %callback.name,
            mode = ?callback.mode,
            "Dispatching callback"
        );
        match callback.mode {
            CallbackMode::Sync => Ok(Some(Dispatch::Completed(invocation.await?))),
            // Async callbacks never fail the request they were fired from.
            CallbackMode::Async => match self.pool.submit(callback.name.clone(), invocation) {
                Ok(ticket) => Ok(Some(Dispatch::Detached(ticket))),
                Err(DispatchError::PoolSaturated { .. }) => Ok(Some(Dispatch::Dropped {
                    callback: callback.name.clone(),
                })),
                Err(e) => Err(e),
            },
        }
    }

    /// Prepares the callback future. Unregistered function names are
    /// rejected here, before anything is spawned.
    fn invocation(
        &self,
        callback: &CallbackDefinition,
        payload: CallbackPayload,
    ) -> Result<Invocation, DispatchError> {
        match callback.kind {
            CallbackKind::Function => {
                let handler = self.registry.get(&callback.name)?;
                let name = callback.name.clone();
                Ok(async move {
                    handler
                        .call(payload)
                        .await
                        .map(CallbackOutcome::Function)
                        .map_err(|e| DispatchError::Handler {
                            name,
                            message: e.to_string(),
                        })
                }
                .boxed())
            }
            CallbackKind::Http => {
                let http = self.http.clone();
                let url = callback.name.clone();
                Ok(async move { http.post(&url, &payload).await }.boxed())
            }
        }
    }
}
