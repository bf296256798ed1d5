use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::state::FormState;
use crate::llm::{GeminiClient, Provider, RequestError};

/// Why a submission ended without a response.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("Failed to get response: {0}")]
    Request(#[from] RequestError),
}

/// Owns the form state and runs submissions against the selected provider.
///
/// State lives in a watch channel so a front end can follow transitions
/// (e.g. to draw a loading indicator) while a submission is in flight.
pub struct FormController {
    client: GeminiClient,
    state: watch::Sender<FormState>,
}

/// Lowers the loading flag if a submission exits without settling,
/// including when its future is dropped mid-request.
struct SubmitGuard<'a> {
    state: &'a watch::Sender<FormState>,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                debug!("submission abandoned, clearing loading flag");
                *state = state.settled();
                true
            } else {
                false
            }
        });
    }
}

impl FormController {
    pub fn new(client: GeminiClient, provider: Provider) -> Self {
        let (state, _) = watch::channel(FormState::new(provider));
        Self { client, state }
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn select_provider(&self, provider: Provider) {
        info!("Selected provider: {}", provider.label());
        self.state.send_modify(|state| *state = state.with_provider(provider));
    }

    pub fn set_question(&self, question: impl Into<String>) {
        let question = question.into();
        self.state.send_modify(|state| *state = state.with_question(question));
    }

    /// Runs one submission cycle and returns the settled state.
    ///
    /// Ignored while another submission is still loading.
    pub async fn submit(&self) -> FormState {
        let mut request = None;
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                debug!("submission already in flight, ignoring");
                return false;
            }
            if state.question().trim().is_empty() {
                *state = state.failed(SubmitError::EmptyQuestion.to_string());
                return true;
            }
            *state = state.submitting();
            request = Some((state.provider(), state.question().to_string()));
            true
        });

        let Some((provider, question)) = request else {
            return self.state();
        };

        let _guard = SubmitGuard { state: &self.state };

        match self.dispatch(provider, &question).await {
            Ok(text) => {
                info!("Received response from {}", provider);
                self.state.send_modify(|state| *state = state.answered(text));
            }
            Err(err) => {
                error!(status = ?err.status(), "Error fetching data from {}: {}", provider, err);
                let message = SubmitError::from(err).to_string();
                self.state.send_modify(|state| *state = state.failed(message));
            }
        }

        self.state()
    }

    async fn dispatch(&self, provider: Provider, question: &str) -> Result<String, RequestError> {
        match provider.placeholder_response() {
            Some(text) => Ok(text.to_string()),
            None => {
                info!(
                    "Asking {} model {} ({} chars)",
                    provider,
                    self.client.config().model,
                    question.len()
                );
                self.client.generate(question).await
            }
        }
    }
}
