use crate::error::SchemaError;
use crate::screen::{Screen, ValidationDefinition, ValidationKind, ValidationValue};
use ahash::AHashSet;
use regex::Regex;

/// A compiled validation rule.
#[derive(Debug, Clone)]
pub enum Validation {
    /// Input must match the pattern starting at its first character.
    Pattern(Regex),
    /// Input must be exactly one of the members.
    Members(AHashSet<String>),
}

impl Validation {
    /// Compiles a rule from its document form. Regex patterns are anchored at
    /// the start of the input but not at the end, so `[0-9]` accepts `"12"`.
    pub fn compile(screen: &str, definition: ValidationDefinition) -> Result<Self, SchemaError> {
        match (definition.kind, definition.value) {
            (ValidationKind::Regex, ValidationValue::Single(pattern)) => {
                let anchored = format!("^(?:{})", pattern);
                Regex::new(&anchored)
                    .map(Validation::Pattern)
                    .map_err(|e| SchemaError::InvalidPattern {
                        screen: screen.to_string(),
                        message: e.to_string(),
                    })
            }
            (ValidationKind::Regex, ValidationValue::Many(_)) => {
                Err(SchemaError::InvalidValidation {
                    screen: screen.to_string(),
                    message: "regex rule expects a single pattern string".to_string(),
                })
            }
            (ValidationKind::List, ValidationValue::Single(member)) => {
                Ok(Validation::Members(std::iter::once(member).collect()))
            }
            (ValidationKind::List, ValidationValue::Many(members)) => {
                Ok(Validation::Members(members.into_iter().collect()))
            }
        }
    }

    pub fn accepts(&self, input: &str) -> bool {
        match self {
            Validation::Pattern(regex) => regex.is_match(input),
            Validation::Members(members) => members.contains(input),
        }
    }
}

/// Decides whether `input` satisfies the screen's validation rule.
/// A screen without a rule accepts any input.
pub fn accepts(screen: &Screen, input: &str) -> bool {
    screen
        .validation
        .as_ref()
        .is_none_or(|validation| validation.accepts(input))
}
