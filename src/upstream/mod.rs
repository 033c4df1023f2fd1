pub mod classifier;
pub mod gemini;
pub mod weather;

use crate::error::AppError;
use async_trait::async_trait;
use serde::Serialize;

/// Role vocabulary of the generation provider. Assistant turns map to
/// `model` on the wire; everything else is `user`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One role-tagged text part of an outbound generation request.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl GenerationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Text-generation provider seam. Exactly one outbound call per invocation;
/// retries and fallbacks belong to the caller.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, turns: &[GenerationTurn]) -> Result<String, AppError>;
}

/// Image classifier seam. Returns label -> probability pairs in upstream
/// order so ties can be broken by first occurrence.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    async fn classify(&self, image: &str) -> Result<Vec<(String, f64)>, AppError>;
}

/// Current-conditions provider seam.
#[async_trait]
pub trait WeatherClient: Send + Sync {
    async fn current(&self, city: &str) -> Result<weather::CurrentConditions, AppError>;
}
