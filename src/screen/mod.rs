pub mod definition;
pub mod target;

pub use definition::*;
pub use target::{PLACEHOLDER, Target, substitute};

use crate::error::SchemaError;
use crate::validator::Validation;
use ahash::AHashMap;

/// A screen ready for navigation, with its validation rule compiled.
#[derive(Debug, Clone)]
pub struct Screen {
    pub name: String,
    pub screen_type: ScreenType,
    pub data: String,
    pub retry_message: Option<String>,
    pub validation: Option<Validation>,
    pub retry: bool,
    pub next_screen: Option<String>,
    pub go_to: Option<String>,
    pub mappings: Option<AHashMap<String, String>>,
    pub callback: Option<CallbackDefinition>,
}

impl Screen {
    pub fn compile(definition: ScreenDefinition) -> Result<Self, SchemaError> {
        let validation = definition
            .validation
            .map(|rule| Validation::compile(&definition.name, rule))
            .transpose()?;

        Ok(Self {
            validation,
            screen_type: definition.screen_type,
            data: definition.data,
            retry_message: definition.retry_message,
            retry: definition.retry,
            next_screen: definition.next_screen,
            go_to: definition.go_to,
            mappings: definition.mappings,
            callback: definition.callback,
            name: definition.name,
        })
    }

    /// The post-validation target: a non-empty `next_screen` wins over `go_to`.
    pub fn transition_target(&self) -> Option<&str> {
        fn present(target: &Option<String>) -> Option<&str> {
            target.as_deref().filter(|s| !s.is_empty())
        }
        present(&self.next_screen).or(present(&self.go_to))
    }

    /// Translates raw input through `mappings` when present. Unmapped input
    /// becomes the empty string.
    pub fn translate<'a>(&'a self, input: &'a str) -> &'a str {
        match &self.mappings {
            Some(mappings) => mappings.get(input).map(String::as_str).unwrap_or(""),
            None => input,
        }
    }

    /// The text shown to the user, preferring the retry message on a retry.
    pub fn message(&self, retry: bool) -> &str {
        match (&self.retry_message, retry) {
            (Some(retry_message), true) => retry_message,
            _ => &self.data,
        }
    }
}
