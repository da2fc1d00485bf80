//! Gemini `generateContent` wire types.
//!
//! Gemini-specific request/response shapes. The wire-neutral types live in
//! `mutsumi_types::persona`.

use serde::{Deserialize, Serialize};

use mutsumi_types::persona::{Part, PersonaRequest, Turn};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// One content part. Exactly one field is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set on thought summaries; those parts are not part of the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<&Part> for GeminiPart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text(text) => GeminiPart {
                text: Some(text.clone()),
                ..Default::default()
            },
            Part::InlineImage { mime_type, data } => GeminiPart {
                inline_data: Some(InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                }),
                ..Default::default()
            },
        }
    }
}

impl From<&Turn> for GeminiContent {
    fn from(turn: &Turn) -> Self {
        GeminiContent {
            role: Some(turn.role.to_string()),
            parts: turn.parts.iter().map(GeminiPart::from).collect(),
        }
    }
}

impl From<&PersonaRequest> for GenerateContentRequest {
    fn from(request: &PersonaRequest) -> Self {
        let mut contents: Vec<GeminiContent> =
            request.history.iter().map(GeminiContent::from).collect();
        contents.push(GeminiContent {
            role: Some("user".to_string()),
            parts: request.message.iter().map(GeminiPart::from).collect(),
        });

        let system_instruction = (!request.system_instruction.trim().is_empty()).then(|| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(request.system_instruction.clone()),
                ..Default::default()
            }],
        });

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, skipping thought parts.
    /// `None` when there is no candidate at all.
    pub fn reply_text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| p.thought != Some(true))
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutsumi_types::persona::PersonaProfile;

    #[test]
    fn test_request_shape() {
        let profile = PersonaProfile {
            system_instruction: "persona".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.85,
        };
        let request = PersonaRequest::new(
            &profile,
            vec![Turn::user(vec![Part::text("hi")]), Turn::model("……嗯。")],
            vec![
                Part::InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "aGk=".to_string(),
                },
                Part::text("look"),
            ],
        );

        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "persona");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["generationConfig"]["temperature"], 0.85);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "……嗯。");
        assert_eq!(contents[2]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(contents[2]["parts"][0]["inlineData"]["data"], "aGk=");
        assert!(contents[2]["parts"][0].get("text").is_none());
        assert_eq!(contents[2]["parts"][1]["text"], "look");
    }

    #[test]
    fn test_reply_text_joins_parts_and_skips_thoughts() {
        let json = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "planning", "thought": true},
                    {"text": "……在练习"},
                    {"text": "新曲子。"}
                ]},
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.reply_text().as_deref(), Some("……在练习新曲子。"));
    }

    #[test]
    fn test_reply_text_empty_and_missing() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert_eq!(blocked.reply_text(), None);
        assert_eq!(
            blocked.prompt_feedback.unwrap().block_reason.as_deref(),
            Some("SAFETY")
        );

        let no_content: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(no_content.reply_text().as_deref(), Some(""));
    }

    #[test]
    fn test_error_envelope() {
        let json = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let env: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(env.error.code, Some(400));
        assert_eq!(env.error.status.as_deref(), Some("INVALID_ARGUMENT"));
    }
}
