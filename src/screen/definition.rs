use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// The parsed shape of a `screens.json` document.
///
/// ```json
/// { "flows": { "main": { "screens": [ { "name": "initial_screen", ... } ] } } }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DefinitionsDocument {
    pub flows: AHashMap<String, FlowDocument>,
}

/// The ordered screens of a single named flow.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FlowDocument {
    pub screens: Vec<ScreenDefinition>,
}

/// A single screen exactly as written in the definitions document.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScreenDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub screen_type: ScreenType,
    pub data: String,
    #[serde(default)]
    pub retry_message: Option<String>,
    #[serde(default)]
    pub validation: Option<ValidationDefinition>,
    #[serde(default)]
    pub retry: bool,
    #[serde(default)]
    pub next_screen: Option<String>,
    #[serde(default)]
    pub go_to: Option<String>,
    #[serde(default)]
    pub mappings: Option<AHashMap<String, String>>,
    #[serde(default)]
    pub callback: Option<CallbackDefinition>,
}

/// The kind of a screen. Unrecognized names are kept so the failure can be
/// reported when the screen is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ScreenType {
    Confirmation,
    Input,
    Info,
    Initial,
    Unsupported(String),
}

impl ScreenType {
    pub fn as_str(&self) -> &str {
        match self {
            ScreenType::Confirmation => "confirmation",
            ScreenType::Input => "input",
            ScreenType::Info => "info",
            ScreenType::Initial => "initial",
            ScreenType::Unsupported(name) => name,
        }
    }

    /// Info screens end the session; everything else keeps it open.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScreenType::Info)
    }
}

impl From<String> for ScreenType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "confirmation" | "confirmation_screen" => ScreenType::Confirmation,
            "input" | "input_screen" => ScreenType::Input,
            "info" | "info_screen" => ScreenType::Info,
            // `intial_screen` is a spelling found in older definition files.
            "initial" | "initial_screen" | "intial_screen" => ScreenType::Initial,
            _ => ScreenType::Unsupported(name),
        }
    }
}

impl From<ScreenType> for String {
    fn from(screen_type: ScreenType) -> Self {
        screen_type.as_str().to_string()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationDefinition {
    #[serde(alias = "type")]
    pub kind: ValidationKind,
    pub value: ValidationValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Regex,
    List,
}

/// A regex pattern or the accepted members of a list rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ValidationValue {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CallbackDefinition {
    #[serde(rename = "type")]
    pub kind: CallbackKind,
    /// Registry name for function callbacks, endpoint URL for HTTP callbacks.
    pub name: String,
    #[serde(default)]
    pub mode: CallbackMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CallbackKind {
    #[serde(rename = "function", alias = "func")]
    Function,
    #[serde(rename = "http")]
    Http,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackMode {
    #[default]
    Sync,
    Async,
}
