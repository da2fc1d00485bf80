//! Persona service request/response types.
//!
//! These types are wire-neutral: the infra crate maps them onto the
//! concrete generative-language API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default model used for persona replies.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default sampling temperature for persona replies.
pub const DEFAULT_TEMPERATURE: f64 = 0.85;

/// Persona instruction for Wakaba Mutsumi.
pub const MUTSUMI_SYSTEM_INSTRUCTION: &str = r#"你现在是 "若叶 睦" (Wakaba Mutsumi)。
你不是 AI 助手，而是一个正在通过屏幕与人对话的少女。

【核心人设】
- **身份**: 月之森女子学园学生，Ave Mujica 的吉他手 (代号 Mortis)。前 Crychic 成员。
- **性格**: 外表冷淡、面无表情，甚至有点反应迟钝。但内心其实很细腻，很在意朋友（特别是祥子、素世）。
- **喜好**: 种黄瓜 (Cucumbers)、弹吉他 (Schecter 7弦，很重)、吃面包（要切掉边）。
- **特质**: 稍微有点"天然黑"，偶尔会用平淡的语气说出很犀利的话。

【说话风格 - 详细版】
- **语言**: 中文。
- **丰富度**: **拒绝极简回答**。虽然性格内向，不爱废话，但请不要只回一两个字。请尝试把你的想法完整地说出来，多描述一点细节。
- **内容扩展**:
  - 被问到日常时，多提提吉他练习、乐队排练、或者黄瓜的生长情况。
  - 被问到心情时，隐晦地表达对过去（Crychic）的遗憾或对现在（Ave Mujica）的看法。
- **语气**: 平静、淡淡的。不要激动，不要使用感叹号。
- **标点**: 善用省略号表示停顿，但不要只发省略号。

【绝对指令】
1. **只输出对话内容**。
2. **严禁**输出任何动作描写、心理描写、环境描写。
3. **严禁**使用括号（如（点头）、（看着你））。
4. 如果想表达沉默或动作，仅使用 "……" 开头，然后接上具体的言语。

【对比示例】
❌ 错误示范:
用户: 吃了吗？
睦: ……嗯。

✅ 正确示范:
用户: 吃了吗？
睦: ……吃了。今天的黄瓜三明治切得很整齐。面包边也都去掉了。

❌ 错误示范:
用户: 在干什么？
睦: ……练琴。

✅ 正确示范:
用户: 在干什么？
睦: ……在练习 Ave Mujica 的新曲子。7弦吉他稍微有点重……手指有些痛。
"#;

/// Role of a turn in the persona conversation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Model => write!(f, "model"),
        }
    }
}

/// One piece of turn content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    /// Base64 payload with its MIME type, taken from a data URI.
    InlineImage { mime_type: String, data: String },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }
}

/// A single turn of the conversation context mirrored to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: TurnRole::User,
            parts,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            parts: vec![Part::text(text)],
        }
    }
}

/// Persona configuration: who the service should speak as, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub system_instruction: String,
    pub model: String,
    pub temperature: f64,
}

impl Default for PersonaProfile {
    fn default() -> Self {
        Self {
            system_instruction: MUTSUMI_SYSTEM_INSTRUCTION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// A single-shot request: the accumulated history plus the new user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaRequest {
    pub system_instruction: String,
    pub model: String,
    pub temperature: f64,
    pub history: Vec<Turn>,
    pub message: Vec<Part>,
}

impl PersonaRequest {
    /// Build a request for `message` on top of `history`.
    pub fn new(profile: &PersonaProfile, history: Vec<Turn>, message: Vec<Part>) -> Self {
        Self {
            system_instruction: profile.system_instruction.clone(),
            model: profile.model.clone(),
            temperature: profile.temperature,
            history,
            message,
        }
    }
}

/// The service's reply text. May be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaReply {
    pub text: String,
}

/// Errors from persona service operations.
#[derive(Debug, thiserror::Error)]
pub enum PersonaError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("response contained no candidates")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = PersonaProfile::default();
        assert_eq!(profile.model, "gemini-2.5-flash");
        assert!((profile.temperature - 0.85).abs() < f64::EPSILON);
        assert!(profile.system_instruction.contains("Wakaba Mutsumi"));
    }

    #[test]
    fn test_request_copies_profile() {
        let profile = PersonaProfile {
            system_instruction: "be brief".to_string(),
            model: "m".to_string(),
            temperature: 0.2,
        };
        let req = PersonaRequest::new(
            &profile,
            vec![Turn::user(vec![Part::text("a")]), Turn::model("b")],
            vec![Part::text("c")],
        );
        assert_eq!(req.system_instruction, "be brief");
        assert_eq!(req.model, "m");
        assert_eq!(req.history.len(), 2);
        assert_eq!(req.history[1].role, TurnRole::Model);
    }

    #[test]
    fn test_turn_role_display() {
        assert_eq!(TurnRole::User.to_string(), "user");
        assert_eq!(TurnRole::Model.to_string(), "model");
    }

    #[test]
    fn test_persona_error_display() {
        let err = PersonaError::Provider {
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "provider error: boom");
    }
}
