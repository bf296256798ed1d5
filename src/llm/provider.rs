use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// The selectable language-model backends. Only Gemini is wired to a live call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Provider {
    #[default]
    Gemini,
    Gpt,
    Claude,
}

const GPT_PLACEHOLDER: &str = "For GPT, you would integrate with the OpenAI API here.
                Example: You'd need to fetch from 'https://api.openai.com/v1/chat/completions' with your OpenAI API key and appropriate payload.";

const CLAUDE_PLACEHOLDER: &str = "For Claude, you would integrate with the Anthropic API here.
                Example: You'd need to fetch from 'https://api.anthropic.com/v1/messages' with your Anthropic API key and appropriate payload.";

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Gemini, Provider::Gpt, Provider::Claude];

    pub fn id(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Gpt => "gpt",
            Provider::Claude => "claude",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini (Live Demo)",
            Provider::Gpt => "GPT (Placeholder)",
            Provider::Claude => "Claude (Placeholder)",
        }
    }

    /// Static instructional text for providers without a live integration.
    pub fn placeholder_response(&self) -> Option<&'static str> {
        match self {
            Provider::Gemini => None,
            Provider::Gpt => Some(GPT_PLACEHOLDER),
            Provider::Claude => Some(CLAUDE_PLACEHOLDER),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.id() == wanted)
            .ok_or_else(|| format!("unknown provider '{}' (expected gemini, gpt or claude)", s.trim()))
    }
}
