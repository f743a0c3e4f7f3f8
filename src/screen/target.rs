/// Placeholder replaced by the (possibly mapped) user input in screen targets.
pub const PLACEHOLDER: &str = "{user_response}";

/// A transition target split into its optional flow and its screen template.
///
/// `"billing.confirm"` switches to flow `billing` and looks up `confirm`;
/// `"menu_{user_response}"` stays in the active flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub flow: Option<&'a str>,
    pub screen: &'a str,
}

impl<'a> Target<'a> {
    /// Splits on the first `.`, before any placeholder substitution, so user
    /// input containing a dot never triggers a flow switch.
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once('.') {
            Some((flow, screen)) => Target {
                flow: Some(flow),
                screen,
            },
            None => Target {
                flow: None,
                screen: raw,
            },
        }
    }

    pub fn resolve(&self, user_response: &str) -> String {
        substitute(self.screen, user_response)
    }
}

/// Fills every `{user_response}` placeholder. Other braces are left as-is.
pub fn substitute(template: &str, user_response: &str) -> String {
    template.replace(PLACEHOLDER, user_response)
}
