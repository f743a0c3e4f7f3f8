//! # ussd-flow - Stateless USSD Dialog Engine
//!
//! **ussd-flow** drives menu-style USSD sessions from a declarative graph of
//! screens. A USSD gateway sends the whole input history of a session on every
//! request; nothing is stored between turns. The engine replays that history
//! against the screen graph to find where the session is, runs the callback of
//! the screen that was just left, and renders the next prompt.
//!
//! ## Core Workflow
//!
//! 1.  **Load Definitions**: Parse a `screens.json` document into a [`store::ScreenStore`].
//!     Regex rules are compiled and every flow is checked for an `initial_screen`.
//! 2.  **Build the Engine**: Use `UssdFlow::builder` to attach a [`callback::FunctionRegistry`]
//!     and an [`config::EngineConfig`].
//! 3.  **Handle Requests**: Pass each gateway request to `UssdFlow::handle`. The reply
//!     is the `"CON ..."` or `"END ..."` string the gateway expects.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ussd_flow::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = ScreenStore::from_json(r#"{
//!         "flows": { "main": { "screens": [
//!             { "name": "initial_screen", "type": "input", "data": "1. Balance\n2. Airtime",
//!               "validation": { "kind": "list", "value": ["1", "2"] },
//!               "next_screen": "menu_{user_response}",
//!               "callback": { "type": "function", "name": "audit", "mode": "async" } },
//!             { "name": "menu_1", "type": "info", "data": "Your balance is 42" },
//!             { "name": "menu_2", "type": "info", "data": "Airtime sent" }
//!         ] } }
//!     }"#)?;
//!
//!     let registry = FunctionRegistry::new().with_fn("audit", |payload: CallbackPayload| async move {
//!         println!("{} chose {}", payload.phone_number, payload.user_input);
//!         Ok(serde_json::Value::Null)
//!     });
//!
//!     let engine = UssdFlow::builder(store)
//!         .with_registry(registry)
//!         .strict_callbacks(true)
//!         .build()?;
//!
//!     let request = UssdRequest {
//!         phone_number: "+254700000000".to_string(),
//!         session_id: "ATUid_1".to_string(),
//!         service_code: "*384#".to_string(),
//!         text: "1".to_string(),
//!     };
//!     let reply = engine.handle(&request).await?;
//!     assert_eq!(reply.body, "END Your balance is 42");
//!     Ok(())
//! }
//! ```

pub mod callback;
pub mod config;
pub mod error;
pub mod navigator;
pub mod prelude;
pub mod render;
pub mod screen;
pub mod session;
pub mod store;
pub mod validator;

pub use navigator::{Navigator, Resolution, StepOutcome};
pub use session::{UssdFlow, UssdReply, UssdRequest};
pub use store::ScreenStore;
