use crate::callback::{CallbackDispatcher, CallbackHandler, Dispatch, FunctionRegistry};
use crate::config::EngineConfig;
use crate::error::{FlowError, NavigationError};
use crate::navigator::{Navigator, Resolution, StepOutcome};
use crate::render::render;
use crate::store::ScreenStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// The fields a USSD gateway posts on every turn of a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UssdRequest {
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "serviceCode", default)]
    pub service_code: String,
    /// Every input of the session so far, joined by the delimiter.
    #[serde(default)]
    pub text: String,
}

impl UssdRequest {
    /// The newest input of the session.
    pub fn last_input(&self, delimiter: char) -> &str {
        self.text.rsplit(delimiter).next().unwrap_or_default()
    }
}

/// The rendered answer to one request.
#[derive(Debug)]
pub struct UssdReply {
    /// `"CON <message>"` or `"END <message>"`.
    pub body: String,
    /// Set when the rendered screen ends the session.
    pub session_ended: bool,
    /// The callback run for the screen that was just exited, if any.
    pub dispatch: Option<Dispatch>,
}

impl std::fmt::Display for UssdReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.body)
    }
}

/// Ties the screen store, navigator, dispatcher and renderer together to
/// answer gateway requests.
#[derive(Debug, Clone)]
pub struct UssdFlow {
    store: Arc<ScreenStore>,
    dispatcher: CallbackDispatcher,
    config: EngineConfig,
}

pub struct UssdFlowBuilder {
    store: Arc<ScreenStore>,
    registry: FunctionRegistry,
    config: EngineConfig,
    strict_callbacks: bool,
}

impl UssdFlowBuilder {
    pub fn new(store: Arc<ScreenStore>) -> Self {
        Self {
            store,
            registry: FunctionRegistry::new(),
            config: EngineConfig::default(),
            strict_callbacks: false,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_handler<H: CallbackHandler>(mut self, name: &str, handler: H) -> Self {
        self.registry.insert(name, handler);
        self
    }

    /// Fail `build` when a `function` callback in the store is not registered.
    pub fn strict_callbacks(mut self, strict: bool) -> Self {
        self.strict_callbacks = strict;
        self
    }

    pub fn build(self) -> Result<UssdFlow, FlowError> {
        let dispatcher = CallbackDispatcher::new(self.registry, &self.config)?;
        if self.strict_callbacks {
            dispatcher.verify(&self.store)?;
        }
        Ok(UssdFlow {
            store: self.store,
            dispatcher,
            config: self.config,
        })
    }
}

impl UssdFlow {
    pub fn builder(store: impl Into<Arc<ScreenStore>>) -> UssdFlowBuilder {
        UssdFlowBuilder::new(store.into())
    }

    pub fn store(&self) -> &ScreenStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &CallbackDispatcher {
        &self.dispatcher
    }

    pub fn navigator(&self) -> Navigator<'_> {
        Navigator::with_config(&self.store, &self.config)
    }

    pub fn resolve(&self, flow: &str, text: &str) -> Result<Resolution<'_>, NavigationError> {
        self.navigator().resolve(flow, text)
    }

    /// Renders the screen `text` leads to without running any callback.
    pub fn preview(&self, flow: &str, text: &str) -> Result<String, FlowError> {
        let resolution = self.resolve(flow, text)?;
        Ok(render(
            resolution.current,
            resolution.outcome == StepOutcome::Retried,
        )?)
    }

    /// Answers a request against the default flow.
    pub async fn handle(&self, request: &UssdRequest) -> Result<UssdReply, FlowError> {
        self.handle_flow(&self.config.default_flow, request).await
    }

    /// Answers a request: replays its input, runs the callback of the screen
    /// the newest input exited, and renders the next screen.
    pub async fn handle_flow(
        &self,
        flow: &str,
        request: &UssdRequest,
    ) -> Result<UssdReply, FlowError> {
        let resolution = self.resolve(flow, &request.text)?;
        let last_input = request.last_input(self.config.delimiter);

        let dispatch = match (resolution.outcome, resolution.previous) {
            (StepOutcome::Advanced, Some(previous)) => {
                self.dispatcher
                    .dispatch(
                        &request.session_id,
                        &request.phone_number,
                        last_input,
                        previous,
                    )
                    .await?
            }
            _ => {
                debug!(session_id = %request.session_id, "Skipping callback");
                None
            }
        };

        let body = render(
            resolution.current,
            resolution.outcome == StepOutcome::Retried,
        )?;
        let session_ended = resolution.current.screen_type.is_terminal();

        info!(
            session_id = %request.session_id,
            service_code = %request.service_code,
            flow = resolution.flow.name(),
            screen = %resolution.current.name,
            session_ended = session_ended,
            "Handled USSD request"
        );

        Ok(UssdReply {
            body,
            session_ended,
            dispatch,
        })
    }
}
