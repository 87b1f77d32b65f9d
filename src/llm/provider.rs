//! Provider metadata: ids, env keys, default models, endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// AI completion backends the app can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAi,
    Groq,
    Gemini,
}

impl Provider {
    /// Auto-detection order when no explicit provider is configured.
    pub const ALL: [Provider; 4] = [
        Provider::Anthropic,
        Provider::OpenAi,
        Provider::Groq,
        Provider::Gemini,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
            Provider::Groq => "groq",
            Provider::Gemini => "gemini",
        }
    }

    pub fn env_key(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-haiku-4-5-20251001",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::Gemini => "gemini-2.0-flash",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Blended USD rate per million tokens for the default model, assuming
    /// an even input/output split. Groq is treated as free tier.
    pub fn usd_per_million_tokens(&self) -> f64 {
        match self {
            Provider::Anthropic => 3.0,
            Provider::OpenAi => 0.375,
            Provider::Groq => 0.0,
            Provider::Gemini => 0.25,
        }
    }

    /// Rough spend for `total_tokens` at this provider's blended rate.
    pub fn estimate_cost_usd(&self, total_tokens: u64) -> f64 {
        total_tokens as f64 / 1_000_000.0 * self.usd_per_million_tokens()
    }

    pub fn info(&self) -> ProviderInfo {
        let (name, cost_hint) = match self {
            Provider::Anthropic => ("Claude Haiku", "~$0.002/action"),
            Provider::OpenAi => ("GPT-4o mini", "~$0.001/action"),
            Provider::Groq => ("Llama 3.1 on Groq", "Free tier / ~$0.0001"),
            Provider::Gemini => ("Gemini Flash", "Free tier / ~$0.0001"),
        };
        ProviderInfo {
            id: self.id().to_string(),
            name: name.to_string(),
            env_key: self.env_key().to_string(),
            default_model: self.default_model().to_string(),
            cost_hint: cost_hint.to_string(),
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
            .iter()
            .copied()
            .find(|p| p.id() == wanted)
            .ok_or_else(|| format!("Unknown provider: {}", s))
    }
}

/// Provider metadata for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub env_key: String,
    pub default_model: String,
    pub cost_hint: String,
}

/// All known providers and their display info.
pub fn all_providers() -> Vec<ProviderInfo> {
    Provider::ALL.iter().map(Provider::info).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_str() {
        for p in Provider::ALL {
            assert_eq!(p.id().parse::<Provider>().unwrap(), p);
        }
        assert_eq!(" GROQ ".parse::<Provider>().unwrap(), Provider::Groq);
        assert!("local".parse::<Provider>().is_err());
    }

    #[test]
    fn groq_uses_openai_compatible_endpoint() {
        assert!(Provider::Groq.base_url().ends_with("/openai/v1"));
    }

    #[test]
    fn cost_estimate_uses_blended_rate() {
        assert_eq!(Provider::Groq.estimate_cost_usd(5_000_000), 0.0);
        assert!((Provider::OpenAi.estimate_cost_usd(1_000_000) - 0.375).abs() < 1e-12);
        assert!((Provider::OpenAi.estimate_cost_usd(2_000) - 0.00075).abs() < 1e-12);
        assert_eq!(Provider::Anthropic.estimate_cost_usd(0), 0.0);
    }

    #[test]
    fn listing_covers_every_provider() {
        let infos = all_providers();
        assert_eq!(infos.len(), 4);
        assert_eq!(infos[0].env_key, "ANTHROPIC_API_KEY");
    }
}
