//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the ussd-flow crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use ussd_flow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let store = ScreenStore::from_file("templates/screens.json")?;
//! let navigator = Navigator::new(&store);
//!
//! let resolution = navigator.resolve("main", "1*2")?;
//! println!("{}", render(resolution.current, false)?);
//! # Ok(())
//! # }
//! ```

// Engine entry points
pub use crate::navigator::{Navigator, Resolution, StepOutcome};
pub use crate::render::render;
pub use crate::session::{UssdFlow, UssdFlowBuilder, UssdReply, UssdRequest};
pub use crate::store::{Flow, INITIAL_SCREEN, ScreenStore};
pub use crate::validator::accepts;

// Screen model
pub use crate::screen::{
    CallbackDefinition, CallbackKind, CallbackMode, DefinitionsDocument, Screen,
    ScreenDefinition, ScreenType,
};

// Callbacks
pub use crate::callback::{
    CallbackDispatcher, CallbackHandler, CallbackOutcome, CallbackPayload, Dispatch,
    FunctionRegistry, HandlerResult,
};

// Configuration and errors
pub use crate::config::EngineConfig;
pub use crate::error::{DispatchError, FlowError, NavigationError, RenderError, SchemaError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
