//! # Navigator
//!
//! Recovers the position of a USSD session by replaying its full input
//! history against a flow. No session state is kept between requests: the
//! same flow and the same input string always resolve to the same screens.
//!
//! For each token, oldest first:
//!
//! - accepted by the current screen: follow `next_screen` (or `go_to`), then
//!   follow any `go_to` chain on the landing screen without consuming input;
//! - rejected by a `retry` screen: stay put;
//! - rejected otherwise: fall back to `initial_screen` of the active flow.

use crate::config::EngineConfig;
use crate::error::NavigationError;
use crate::screen::{Screen, Target};
use crate::store::{Flow, ScreenStore};
use crate::validator;
use itertools::Itertools;
use tracing::debug;

/// What happened to the last token of the replayed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No input yet; the session is on `initial_screen`.
    Start,
    /// The token was accepted and a transition was taken.
    Advanced,
    /// The token was rejected and the screen is shown again.
    Retried,
    /// The token was rejected and the session restarted at `initial_screen`.
    FellBack,
}

/// The result of replaying a session's input.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'s> {
    /// The screen exited by the most recent accepted token, if any.
    pub previous: Option<&'s Screen>,
    /// The screen to show next.
    pub current: &'s Screen,
    /// The flow that was active when replay finished.
    pub flow: &'s Flow,
    pub outcome: StepOutcome,
}

/// Replays accumulated input against the flows of a [`ScreenStore`].
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'s> {
    store: &'s ScreenStore,
    delimiter: char,
    max_goto_hops: usize,
}

impl<'s> Navigator<'s> {
    pub fn new(store: &'s ScreenStore) -> Self {
        Self::with_config(store, &EngineConfig::default())
    }

    pub fn with_config(store: &'s ScreenStore, config: &EngineConfig) -> Self {
        Self {
            store,
            delimiter: config.delimiter,
            max_goto_hops: config.max_goto_hops,
        }
    }

    /// Resolves `(previous, current)` for `input` in the flow named `flow_name`.
    pub fn resolve(&self, flow_name: &str, input: &str) -> Result<Resolution<'s>, NavigationError> {
        let flow = self.store.flow(flow_name)?;
        self.replay(flow, input)
    }

    /// Replays `input` starting from the initial screen of `flow`.
    pub fn replay(&self, flow: &'s Flow, input: &str) -> Result<Resolution<'s>, NavigationError> {
        let mut flow = flow;
        let mut current = flow.initial_screen();
        let mut previous = None;
        let mut outcome = StepOutcome::Start;

        if input.is_empty() {
            return Ok(Resolution {
                previous,
                current,
                flow,
                outcome,
            });
        }

        for token in input.split(self.delimiter) {
            if validator::accepts(current, token) {
                let (landing_flow, landing) = self.advance(flow, current, token)?;
                previous = Some(current);
                (flow, current) = self.follow_go_to(landing_flow, landing, token)?;
                outcome = StepOutcome::Advanced;
            } else if current.retry {
                outcome = StepOutcome::Retried;
            } else {
                current = flow.initial_screen();
                outcome = StepOutcome::FellBack;
            }

            debug!(
                token = token,
                flow = flow.name(),
                screen = %current.name,
                outcome = ?outcome,
                "Replayed input token"
            );
        }

        Ok(Resolution {
            previous,
            current,
            flow,
            outcome,
        })
    }

    /// Takes the post-validation transition out of `screen`.
    fn advance(
        &self,
        flow: &'s Flow,
        screen: &'s Screen,
        token: &str,
    ) -> Result<(&'s Flow, &'s Screen), NavigationError> {
        let target = Target::parse(screen.transition_target().unwrap_or(""));
        let flow = match target.flow {
            Some(name) => self.store.flow(name)?,
            None => flow,
        };

        let name = target.resolve(screen.translate(token));
        if name.is_empty() {
            return Err(NavigationError::InvalidSchema {
                screen: screen.name.clone(),
                reason: "has no transition target for accepted input".to_string(),
            });
        }
        Ok((flow, flow.screen(&name)?))
    }

    /// Follows zero-width `go_to` hops until a screen without one is reached.
    fn follow_go_to(
        &self,
        flow: &'s Flow,
        landing: &'s Screen,
        token: &str,
    ) -> Result<(&'s Flow, &'s Screen), NavigationError> {
        let mut flow = flow;
        let mut current = landing;
        let mut visited: Vec<(&str, &str)> = vec![(flow.name(), landing.name.as_str())];

        while let Some(go_to) = current.go_to.as_deref() {
            if visited.len() > self.max_goto_hops {
                return Err(Self::cycle_error(landing, &visited));
            }

            let target = Target::parse(go_to);
            if let Some(name) = target.flow {
                debug!(from = flow.name(), to = name, "Switching flow");
                flow = self.store.flow(name)?;
            }

            let name = target.resolve(token);
            if name.is_empty() {
                return Err(NavigationError::InvalidSchema {
                    screen: current.name.clone(),
                    reason: "has a go_to that resolves to an empty name".to_string(),
                });
            }
            current = flow.screen(&name)?;

            let key = (flow.name(), current.name.as_str());
            let revisited = visited.contains(&key);
            visited.push(key);
            if revisited {
                return Err(Self::cycle_error(landing, &visited));
            }
        }

        Ok((flow, current))
    }

    fn cycle_error(landing: &Screen, visited: &[(&str, &str)]) -> NavigationError {
        NavigationError::GoToCycle {
            start: landing.name.clone(),
            chain: visited
                .iter()
                .map(|(flow, screen)| format!("{}.{}", flow, screen))
                .join(" -> "),
        }
    }
}
