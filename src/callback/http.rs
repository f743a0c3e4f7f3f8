use super::{CallbackOutcome, CallbackPayload};
use crate::error::DispatchError;
use std::time::Duration;
use tracing::debug;

/// Posts callback payloads as JSON to the endpoint named by the screen.
///
/// The client is built once and cloned cheaply; every request carries the
/// configured timeout and is never retried.
#[derive(Debug, Clone)]
pub struct HttpCallbackClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpCallbackClient {
    pub fn new(timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Transport {
                url: String::new(),
                message: format!("could not build HTTP client: {}", e),
            })?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends `payload` and returns the response status and body. Non-2xx
    /// responses are returned as-is.
    pub async fn post(
        &self,
        url: &str,
        payload: &CallbackPayload,
    ) -> Result<CallbackOutcome, DispatchError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(url, e))?;
        debug!(url = url, status = status, "HTTP callback answered");

        Ok(CallbackOutcome::Http { status, body })
    }
}

fn classify(url: &str, error: reqwest::Error) -> DispatchError {
    if error.is_timeout() {
        DispatchError::CallbackUnreachable {
            url: url.to_string(),
        }
    } else {
        DispatchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
