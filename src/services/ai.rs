use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::model::analysis::AnalysisPayload;

const TIMEOUT_SECS: u64 = 60;
const TEMPERATURE: f64 = 0.7;

/// A chat-completion endpoint: one prompt in, the reply text out.
pub trait CompletionBackend {
    fn complete(&self, model: &str, prompt: &str) -> Result<String, AnalysisError>;
}

pub struct HttpBackend {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(cfg: &AppConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(HttpBackend {
            client,
            endpoint: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl CompletionBackend for HttpBackend {
    fn complete(&self, model: &str, prompt: &str) -> Result<String, AnalysisError> {
        let body = json!({
            "model": model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": TEMPERATURE
        });

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send()?;
        let status = resp.status();

        // Read as text first so an error body is never lost to a JSON failure.
        let text = resp.text()?;

        if !status.is_success() {
            return Err(AnalysisError::Api(extract_error_message(status, &text)));
        }

        content_from_response(&text)
    }
}

fn content_from_response(text: &str) -> Result<String, AnalysisError> {
    let chat: ChatResponse = serde_json::from_str(text)
        .map_err(|e| AnalysisError::Format(format!("invalid completion envelope: {e}")))?;

    chat.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AnalysisError::Format("missing choices[0].message.content".into()))
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    // Common shapes: { "error": { "message": "..." } } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet = match trimmed.char_indices().nth(400) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}

pub fn build_prompt(sentence: &str) -> String {
    format!(
        r#"
以下の台湾華語の文章を解析し、JSON形式で返してください。

文章: {sentence}

出力形式：
{{
"japanese": "自然な日本語訳（要点補足付き）",
"pinyin": "声調記号付きピンイン",
"glossary": [
  {{"term": "台湾華語単語", "meaning": "日本語の意味", "pinyin": "声調記号付き"}}
]
}}
"#
    )
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(?P<body>.*?)\n?\s*```\s*$")
            .expect("fence pattern is valid")
    })
}

/// Parses the model's reply into the typed payload. A Markdown code fence
/// around the JSON is tolerated; anything else that is not the full object
/// is an error.
pub fn parse_payload(content: &str) -> Result<AnalysisPayload, AnalysisError> {
    let body = match fence_re().captures(content) {
        Some(caps) => caps.name("body").map_or(content, |m| m.as_str()),
        None => content,
    };

    Ok(serde_json::from_str::<AnalysisPayload>(body.trim())?)
}

/// One sentence through the endpoint: prompt, call, parse.
pub fn analyze_sentence(
    backend: &dyn CompletionBackend,
    model: &str,
    sentence: &str,
) -> Result<AnalysisPayload, AnalysisError> {
    let prompt = build_prompt(sentence);
    let content = backend.complete(model, &prompt)?;
    tracing::debug!(chars = content.chars().count(), "received completion");
    parse_payload(&content)
}
