use crate::error::RenderError;
use crate::screen::{Screen, ScreenType};

/// Wire prefix telling the gateway to keep the session open.
pub const CONTINUE: &str = "CON";
/// Wire prefix telling the gateway to end the session.
pub const END: &str = "END";

/// Converts a screen into the `"<CON|END> <message>"` string expected by the
/// USSD gateway. With `retry` set, the screen's retry message is shown when it
/// has one.
pub fn render(screen: &Screen, retry: bool) -> Result<String, RenderError> {
    let prefix = wire_prefix(&screen.screen_type).ok_or_else(|| {
        RenderError::UnsupportedScreenType {
            screen: screen.name.clone(),
            type_name: screen.screen_type.as_str().to_string(),
        }
    })?;
    Ok(format!("{} {}", prefix, screen.message(retry)))
}

fn wire_prefix(screen_type: &ScreenType) -> Option<&'static str> {
    match screen_type {
        ScreenType::Info => Some(END),
        ScreenType::Confirmation | ScreenType::Input | ScreenType::Initial => Some(CONTINUE),
        ScreenType::Unsupported(_) => None,
    }
}
