use thiserror::Error;

/// Errors that can occur while loading a screen-definitions document.
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    #[error("Failed to parse screen definitions: {0}")]
    DocumentParse(String),

    #[error("Could not read screen definitions from '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Flow '{flow}' has no screen named 'initial_screen'")]
    MissingInitialScreen { flow: String },

    #[error("Flow '{flow}' defines screen '{screen}' more than once")]
    DuplicateScreen { flow: String, screen: String },

    #[error("Screen '{screen}' has an invalid regex pattern: {message}")]
    InvalidPattern { screen: String, message: String },

    #[error("Screen '{screen}' has an invalid validation rule: {message}")]
    InvalidValidation { screen: String, message: String },
}

/// Errors that can occur while replaying input against a flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Flow '{0}' not found")]
    FlowNotFound(String),

    #[error("Screen '{screen}' not found in flow '{flow}'")]
    ScreenNotFound { flow: String, screen: String },

    #[error("Invalid schema: screen '{screen}' {reason}")]
    InvalidSchema { screen: String, reason: String },

    #[error("go_to chain starting at '{start}' does not terminate: {chain}")]
    GoToCycle { start: String, chain: String },
}

/// Errors that can occur while rendering a screen into its wire form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Screen '{screen}' has unsupported type '{type_name}'")]
    UnsupportedScreenType { screen: String, type_name: String },
}

/// Errors that can occur while executing a screen callback.
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    #[error("Callback '{0}' is not registered")]
    CallbackNotRegistered(String),

    #[error("Unable to reach callback endpoint '{url}'")]
    CallbackUnreachable { url: String },

    #[error("HTTP callback to '{url}' failed: {message}")]
    Transport { url: String, message: String },

    #[error("Callback '{name}' failed: {message}")]
    Handler { name: String, message: String },

    #[error("Async callback pool is saturated ({limit} callbacks in flight)")]
    PoolSaturated { limit: usize },
}

/// Any error surfaced while handling a single session request.
#[derive(Error, Debug, Clone)]
pub enum FlowError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
