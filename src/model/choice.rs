use std::str::FromStr;

use serde::Serialize;

use crate::config::AppConfig;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    #[default]
    Primary,
    Secondary,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [ModelChoice::Primary, ModelChoice::Secondary];

    /// Label shown in the model selector.
    pub fn label(self) -> &'static str {
        match self {
            ModelChoice::Primary => "GPT-4",
            ModelChoice::Secondary => "GPT-3.5",
        }
    }

    pub fn model_id(self, cfg: &AppConfig) -> &str {
        match self {
            ModelChoice::Primary => &cfg.primary_model,
            ModelChoice::Secondary => &cfg.secondary_model,
        }
    }
}

impl FromStr for ModelChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "primary" | "gpt-4" => Ok(ModelChoice::Primary),
            "secondary" | "gpt-3.5" => Ok(ModelChoice::Secondary),
            other => Err(format!("unknown model choice: {other}")),
        }
    }
}
