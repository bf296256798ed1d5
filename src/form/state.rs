//! Transient view state of the question form.
//!
//! The response text, the error message and the loading flag are all views of
//! a single [`Phase`], so a settled form never shows both a response and an
//! error. Every transition builds a new [`FormState`].

use crate::llm::Provider;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Answered(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    provider: Provider,
    question: String,
    phase: Phase,
}

impl FormState {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Submitting)
    }

    pub fn response(&self) -> &str {
        match &self.phase {
            Phase::Answered(text) => text,
            _ => "",
        }
    }

    pub fn error_message(&self) -> &str {
        match &self.phase {
            Phase::Failed(message) => message,
            _ => "",
        }
    }

    pub fn with_provider(&self, provider: Provider) -> Self {
        Self {
            provider,
            ..self.clone()
        }
    }

    pub fn with_question(&self, question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..self.clone()
        }
    }

    /// Clears any previous outcome and raises the loading flag.
    pub fn submitting(&self) -> Self {
        self.with_phase(Phase::Submitting)
    }

    pub fn answered(&self, text: impl Into<String>) -> Self {
        self.with_phase(Phase::Answered(text.into()))
    }

    pub fn failed(&self, message: impl Into<String>) -> Self {
        self.with_phase(Phase::Failed(message.into()))
    }

    /// Back to idle with no outcome.
    pub fn settled(&self) -> Self {
        self.with_phase(Phase::Idle)
    }

    fn with_phase(&self, phase: Phase) -> Self {
        Self {
            provider: self.provider,
            question: self.question.clone(),
            phase,
        }
    }
}
