//! HTTP judge - AI debate judging over an OpenAI-compatible chat API.
//!
//! The model is prompted to answer in JSON; responses are coerced leniently
//! (extract the outermost JSON object, default missing fields, clamp scores
//! to the 0-10 scale) because generated output is never fully trusted.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::debate::{ParticipantScore, Room, Turn, TurnFeedback};
use crate::domain::foundation::ParticipantId;
use crate::ports::{DebateJudge, JudgeError, Verdict};

/// Configuration for the HTTP judge.
#[derive(Debug, Clone)]
pub struct HttpJudgeConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpJudgeConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// AI judge backed by an OpenAI-compatible chat completions endpoint.
pub struct HttpJudge {
    config: HttpJudgeConfig,
    client: Client,
}

impl HttpJudge {
    /// Creates a new HTTP judge.
    pub fn new(config: HttpJudgeConfig) -> Result<Self, JudgeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JudgeError::unavailable(format!("http client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Sends a chat completion and returns the assistant's text.
    async fn chat(&self, system: &str, user: String, temperature: f32) -> Result<String, JudgeError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            temperature,
            max_tokens: 800,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgeError::Timeout
                } else {
                    JudgeError::unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(JudgeError::unavailable(format!(
                "judge returned HTTP {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::malformed(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| JudgeError::malformed("response contained no choices"))
    }
}

#[async_trait]
impl DebateJudge for HttpJudge {
    async fn analyze_turn(&self, content: &str, topic: &str) -> Result<TurnFeedback, JudgeError> {
        let prompt = analysis_prompt(content, topic);
        let text = self
            .chat(
                "You are a professional debate judge using the LCR evaluation model.",
                prompt,
                0.3,
            )
            .await?;
        let value = extract_json(&text)?;
        Ok(feedback_from_value(&value))
    }

    async fn final_verdict(
        &self,
        room: &Room,
        turns: &[Turn],
        scores: &HashMap<ParticipantId, ParticipantScore>,
    ) -> Result<Verdict, JudgeError> {
        let prompt = verdict_prompt(room, turns, scores);
        let text = self
            .chat("You are a professional debate judge.", prompt, 0.5)
            .await?;
        let value = extract_json(&text)?;
        Ok(verdict_from_value(&value))
    }

    async fn transcribe_audio(&self, audio_url: &str) -> Result<String, JudgeError> {
        // Transcription runs through the same chat surface; dedicated audio
        // endpoints vary too much between compatible providers.
        let prompt = format!(
            "Transcribe the debate audio recording referenced by '{}'. \
             Reply with the plain transcript only.",
            audio_url
        );
        self.chat("You are an accurate audio transcriber.", prompt, 0.0)
            .await
    }
}

/// Builds the LCR analysis prompt for a single turn.
fn analysis_prompt(content: &str, topic: &str) -> String {
    format!(
        "You are an expert debate judge. Analyze this argument using the LCR model:\n\n\
         **Logic (40%)**: Reasoning, coherence, argument structure\n\
         **Credibility (35%)**: Evidence, facts, reliability\n\
         **Rhetoric (25%)**: Persuasiveness, delivery, clarity\n\n\
         Argument: \"{}\"\n\n\
         Context: {}\n\n\
         Provide scores (0-10) and brief feedback in JSON format:\n\
         {{\"logic\": score, \"credibility\": score, \"rhetoric\": score, \
         \"feedback\": \"brief analysis\", \"strengths\": [\"point1\"], \
         \"weaknesses\": [\"point1\"]}}",
        content, topic
    )
}

/// Builds the final verdict prompt.
fn verdict_prompt(
    room: &Room,
    turns: &[Turn],
    scores: &HashMap<ParticipantId, ParticipantScore>,
) -> String {
    let scores_json = serde_json::to_string(scores).unwrap_or_else(|_| "{}".to_string());
    let transcript: String = turns
        .iter()
        .map(|t| format!("[round {} / {}] {}\n", t.round_number, t.speaker_id, t.content))
        .collect();
    format!(
        "You are a debate judge. Based on the following scores and transcript, \
         determine the winner and provide feedback.\n\n\
         **Debate Topic:** {}\n\n\
         **Participant Scores:** {}\n\n\
         **Transcript:**\n{}\n\
         Provide a final verdict in JSON:\n\
         {{\"winner_id\": \"participant-uuid\", \"summary\": \"Overall debate summary\", \
         \"feedback\": {{\"participant-uuid\": \"personalized feedback\"}}}}",
        room.topic, scores_json, transcript
    )
}

/// Extracts the outermost JSON object from model output.
///
/// Models often wrap JSON in prose or code fences; take the substring from
/// the first `{` to the last `}` and parse that.
fn extract_json(text: &str) -> Result<Value, JudgeError> {
    let start = text
        .find('{')
        .ok_or_else(|| JudgeError::malformed("no JSON object in response"))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| JudgeError::malformed("no JSON object in response"))?;
    if end < start {
        return Err(JudgeError::malformed("unbalanced JSON object in response"));
    }
    serde_json::from_str(&text[start..=end]).map_err(|e| JudgeError::malformed(e.to_string()))
}

/// Clamps a judge-supplied score onto the 0-10 scale; missing fields are 0.
fn score_field(value: &Value, field: &str) -> f64 {
    value
        .get(field)
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 10.0)
}

fn string_list(value: &Value, field: &str) -> Vec<String> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Coerces a loose JSON object into turn feedback.
fn feedback_from_value(value: &Value) -> TurnFeedback {
    TurnFeedback {
        logic: score_field(value, "logic"),
        credibility: score_field(value, "credibility"),
        rhetoric: score_field(value, "rhetoric"),
        commentary: value
            .get("feedback")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        strengths: string_list(value, "strengths"),
        weaknesses: string_list(value, "weaknesses"),
    }
}

/// Coerces a loose JSON object into a verdict.
fn verdict_from_value(value: &Value) -> Verdict {
    let winner_id = value
        .get("winner_id")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok());
    let feedback = value
        .get("feedback")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| {
                    let id: ParticipantId = k.parse().ok()?;
                    Some((id, v.as_str()?.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();
    Verdict {
        winner_id,
        summary: value
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("Debate concluded.")
            .to_string(),
        feedback,
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_json_strips_surrounding_prose() {
        let text = "Here is my verdict:\n```json\n{\"logic\": 8}\n```\nHope that helps!";
        let value = extract_json(text).unwrap();
        assert_eq!(value, json!({"logic": 8}));
    }

    #[test]
    fn extract_json_fails_without_object() {
        assert!(extract_json("no json here").is_err());
    }

    #[test]
    fn feedback_coercion_defaults_missing_fields_to_zero() {
        let feedback = feedback_from_value(&json!({"logic": 8.5}));
        assert_eq!(feedback.logic, 8.5);
        assert_eq!(feedback.credibility, 0.0);
        assert_eq!(feedback.rhetoric, 0.0);
        assert!(feedback.strengths.is_empty());
    }

    #[test]
    fn feedback_coercion_clamps_out_of_scale_scores() {
        let feedback = feedback_from_value(&json!({"logic": 42, "credibility": -3}));
        assert_eq!(feedback.logic, 10.0);
        assert_eq!(feedback.credibility, 0.0);
    }

    #[test]
    fn verdict_coercion_ignores_unparseable_winner() {
        let verdict = verdict_from_value(&json!({
            "winner_id": "participant_1",
            "summary": "A close debate."
        }));
        assert!(verdict.winner_id.is_none());
        assert_eq!(verdict.summary, "A close debate.");
    }

    #[test]
    fn verdict_coercion_parses_participant_keyed_feedback() {
        let id = ParticipantId::new();
        let verdict = verdict_from_value(&json!({
            "summary": "s",
            "feedback": { id.to_string(): "Strong close", "not-a-uuid": "dropped" }
        }));
        assert_eq!(verdict.feedback.len(), 1);
        assert_eq!(verdict.feedback.get(&id).unwrap(), "Strong close");
    }
}
