use super::CallbackPayload;
use crate::error::DispatchError;
use ahash::AHashMap;
use async_trait::async_trait;
use itertools::Itertools;
use std::future::Future;
use std::sync::Arc;

/// What a function callback hands back: any JSON value, or an error that is
/// reported as [`DispatchError::Handler`].
pub type HandlerResult = Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>>;

/// A named action invoked when a screen with a `function` callback is exited.
///
/// # Example
///
/// ```rust,no_run
/// use ussd_flow::callback::{CallbackHandler, CallbackPayload, HandlerResult};
/// use async_trait::async_trait;
///
/// struct SendSms;
///
/// #[async_trait]
/// impl CallbackHandler for SendSms {
///     async fn call(&self, payload: CallbackPayload) -> HandlerResult {
///         // Deliver an SMS to `payload.phone_number` here.
///         Ok(serde_json::json!({ "queued": payload.phone_number }))
///     }
/// }
/// ```
#[async_trait]
pub trait CallbackHandler: Send + Sync + 'static {
    async fn call(&self, payload: CallbackPayload) -> HandlerResult;
}

/// Adapts an async closure into a [`CallbackHandler`].
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> CallbackHandler for FnHandler<F>
where
    F: Fn(CallbackPayload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn call(&self, payload: CallbackPayload) -> HandlerResult {
        (self.0)(payload).await
    }
}

/// Maps callback names used in screen definitions to their handlers.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    handlers: AHashMap<String, Arc<dyn CallbackHandler>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<H: CallbackHandler>(&mut self, name: impl Into<String>, handler: H) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn with_handler<H: CallbackHandler>(mut self, name: impl Into<String>, handler: H) -> Self {
        self.insert(name, handler);
        self
    }

    /// Registers an async closure under `name`.
    pub fn with_fn<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(CallbackPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.with_handler(name, FnHandler(f))
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn CallbackHandler>, DispatchError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::CallbackNotRegistered(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).sorted().collect()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
