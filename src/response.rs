//! Synthetic invocation responses.
//!
//! Each model family gets the body shape its real Bedrock counterpart
//! returns, so client-side deserializers can be exercised unchanged:
//!
//! - `anthropic.claude*`: Anthropic Messages API object
//! - `amazon.titan*`: Titan text `results` object
//! - anything else: a generic `{output, usage}` object

use crate::catalog::ModelCatalog;
use crate::request::InvocationRequest;
use crate::tokens::estimate_tokens;
use serde::{Deserialize, Serialize};

/// Prefix of Anthropic Claude model identifiers.
pub const CLAUDE_PREFIX: &str = "anthropic.claude";

/// Prefix of Amazon Titan model identifiers.
pub const TITAN_PREFIX: &str = "amazon.titan";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Token usage in Anthropic / generic responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Estimated tokens in the request.
    pub input_tokens: u32,
    /// Estimated tokens in the generated text.
    pub output_tokens: u32,
}

/// Anthropic Messages API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaudeMessage {
    /// `msg_mock_<unix millis>`.
    pub id: String,
    /// Always `"message"`.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Always `"assistant"`.
    pub role: String,
    /// A single text block.
    pub content: Vec<ContentBlock>,
    /// Display name of the resolved profile.
    pub model: String,
    /// Always `"end_turn"`.
    pub stop_reason: String,
    /// Token usage.
    pub usage: Usage,
}

/// One content block of a [`ClaudeMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub block_type: String,
    /// Generated text.
    pub text: String,
}

/// Titan text generation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanResponse {
    /// Estimated tokens in the request.
    pub input_text_token_count: u32,
    /// A single result.
    pub results: Vec<TitanResult>,
}

/// One entry of [`TitanResponse::results`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanResult {
    /// Estimated tokens in `output_text`.
    pub token_count: u32,
    /// Generated text.
    pub output_text: String,
    /// Always `"FINISH"`.
    pub completion_reason: String,
}

/// Response for model families the mock has no dedicated shape for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericResponse {
    /// Generated text.
    pub output: String,
    /// Token usage.
    pub usage: Usage,
}

/// Any of the three response bodies. Serializes without a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InvocationResponse {
    /// `anthropic.claude*`
    Claude(ClaudeMessage),
    /// `amazon.titan*`
    Titan(TitanResponse),
    /// Everything else.
    Generic(GenericResponse),
}

impl InvocationResponse {
    /// Which schema this response uses.
    pub fn schema(&self) -> ResponseSchema {
        match self {
            Self::Claude(_) => ResponseSchema::Claude,
            Self::Titan(_) => ResponseSchema::Titan,
            Self::Generic(_) => ResponseSchema::Generic,
        }
    }

    /// `(input_tokens, output_tokens)` regardless of shape.
    pub fn token_counts(&self) -> (u32, u32) {
        match self {
            Self::Claude(msg) => (msg.usage.input_tokens, msg.usage.output_tokens),
            Self::Titan(titan) => (
                titan.input_text_token_count,
                titan.results.iter().map(|r| r.token_count).sum(),
            ),
            Self::Generic(generic) => (generic.usage.input_tokens, generic.usage.output_tokens),
        }
    }

    /// The generated text.
    pub fn output_text(&self) -> &str {
        match self {
            Self::Claude(msg) => msg.content.first().map_or("", |block| block.text.as_str()),
            Self::Titan(titan) => titan
                .results
                .first()
                .map_or("", |result| result.output_text.as_str()),
            Self::Generic(generic) => &generic.output,
        }
    }
}

// ---------------------------------------------------------------------------
// Schema selection
// ---------------------------------------------------------------------------

/// Response body family, chosen from the model identifier prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    /// Anthropic Messages API.
    Claude,
    /// Amazon Titan text.
    Titan,
    /// Fallback `{output, usage}`.
    Generic,
}

impl ResponseSchema {
    /// Pick the schema for `model_id`. Checked in order: Claude, Titan, generic.
    pub fn for_model(model_id: &str) -> Self {
        if model_id.starts_with(CLAUDE_PREFIX) {
            Self::Claude
        } else if model_id.starts_with(TITAN_PREFIX) {
            Self::Titan
        } else {
            Self::Generic
        }
    }
}

/// Everything needed to render a response body, before picking a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Display name of the resolved profile.
    pub display_name: String,
    /// Estimated tokens in the request.
    pub input_tokens: u32,
    /// Generated text.
    pub output_text: String,
    /// Estimated tokens in `output_text`.
    pub output_tokens: u32,
}

impl Completion {
    /// Render this completion in the shape `model_id` calls for.
    pub fn render(self, model_id: &str) -> InvocationResponse {
        let usage = Usage {
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
        };
        match ResponseSchema::for_model(model_id) {
            ResponseSchema::Claude => InvocationResponse::Claude(ClaudeMessage {
                id: message_id(),
                message_type: "message".to_owned(),
                role: "assistant".to_owned(),
                content: vec![ContentBlock {
                    block_type: "text".to_owned(),
                    text: self.output_text,
                }],
                model: self.display_name,
                stop_reason: "end_turn".to_owned(),
                usage,
            }),
            ResponseSchema::Titan => InvocationResponse::Titan(TitanResponse {
                input_text_token_count: self.input_tokens,
                results: vec![TitanResult {
                    token_count: self.output_tokens,
                    output_text: self.output_text,
                    completion_reason: "FINISH".to_owned(),
                }],
            }),
            ResponseSchema::Generic => InvocationResponse::Generic(GenericResponse {
                output: self.output_text,
                usage,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Fixed completion text for a model.
pub fn mock_output_text(display_name: &str, input_tokens: u32) -> String {
    format!(
        "This is a mock response from {display_name}. Your request was processed \
         successfully. Input contained approximately {input_tokens} tokens."
    )
}

/// Build the completion for `request` against the resolved profile of `model_id`.
pub fn complete(catalog: &ModelCatalog, model_id: &str, request: &InvocationRequest) -> Completion {
    let profile = catalog.resolve(model_id);
    let input_tokens = estimate_tokens(&request.prompt_text());
    let output_text = mock_output_text(profile.display_name, input_tokens);
    let output_tokens = estimate_tokens(&output_text);
    Completion {
        display_name: profile.display_name.to_owned(),
        input_tokens,
        output_text,
        output_tokens,
    }
}

/// Synthesize the full response body for one invocation.
pub fn synthesize(
    catalog: &ModelCatalog,
    model_id: &str,
    request: &InvocationRequest,
) -> InvocationResponse {
    complete(catalog, model_id, request).render(model_id)
}

/// `msg_mock_<unix millis>`. Not unique within a millisecond.
fn message_id() -> String {
    format!("msg_mock_{}", chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    fn request(raw: &str) -> InvocationRequest {
        InvocationRequest::parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn schema_selection_by_prefix() {
        assert_eq!(
            ResponseSchema::for_model("anthropic.claude-3-haiku-20240307-v1:0"),
            ResponseSchema::Claude
        );
        assert_eq!(
            ResponseSchema::for_model("anthropic.claude-v2"),
            ResponseSchema::Claude
        );
        assert_eq!(
            ResponseSchema::for_model("amazon.titan-text-lite-v1"),
            ResponseSchema::Titan
        );
        assert_eq!(
            ResponseSchema::for_model("meta.llama3-8b-instruct-v1:0"),
            ResponseSchema::Generic
        );
        assert_eq!(
            ResponseSchema::for_model("anthropic.other"),
            ResponseSchema::Generic
        );
        assert_eq!(ResponseSchema::for_model(""), ResponseSchema::Generic);
    }

    #[test]
    fn output_text_template() {
        assert_eq!(
            mock_output_text("titan-text-express", 7),
            "This is a mock response from titan-text-express. Your request was processed \
             successfully. Input contained approximately 7 tokens."
        );
    }

    #[test]
    fn complete_counts_tokens() {
        let catalog = ModelCatalog::builtin();
        let completion = complete(
            &catalog,
            "amazon.titan-text-express-v1",
            &request(r#"{"prompt":"abcd"}"#),
        );
        // `"abcd"` is 6 characters
        assert_eq!(completion.input_tokens, 2);
        assert_eq!(completion.display_name, "titan-text-express");
        assert_eq!(
            completion.output_tokens,
            estimate_tokens(&completion.output_text)
        );
    }

    #[test]
    fn complete_empty_body_counts_encoded_empty_string() {
        let catalog = ModelCatalog::builtin();
        let completion = complete(&catalog, "foo.bar-v1", &InvocationRequest::empty());
        assert_eq!(completion.input_tokens, 1);
        assert!(completion.output_text.contains("claude-3-sonnet-20240229"));
    }

    #[test]
    fn claude_shape() {
        let catalog = ModelCatalog::builtin();
        let resp = synthesize(
            &catalog,
            "anthropic.claude-3-haiku-20240307-v1:0",
            &request("{}"),
        );
        assert_eq!(resp.schema(), ResponseSchema::Claude);

        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["id"].as_str().unwrap().starts_with("msg_mock_"));
        assert_eq!(json["type"], "message");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["model"], "claude-3-haiku-20240307");
        assert_eq!(json["stop_reason"], "end_turn");
        assert_eq!(json["usage"]["input_tokens"], 1);
        assert!(json["usage"]["output_tokens"].as_u64().unwrap() > 0);
    }

    #[test]
    fn claude_id_embeds_millis() {
        let before = chrono::Utc::now().timestamp_millis();
        let id = message_id();
        let after = chrono::Utc::now().timestamp_millis();
        let millis: i64 = id.strip_prefix("msg_mock_").unwrap().parse().unwrap();
        assert!(millis >= before && millis <= after);
    }

    #[test]
    fn titan_shape() {
        let catalog = ModelCatalog::builtin();
        let resp = synthesize(&catalog, "amazon.titan-text-express-v1", &request("{}"));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["inputTextTokenCount"], 1);
        assert_eq!(json["results"][0]["completionReason"], "FINISH");
        assert!(
            json["results"][0]["outputText"]
                .as_str()
                .unwrap()
                .contains("titan-text-express")
        );
        assert!(json.get("usage").is_none());
    }

    #[test]
    fn generic_shape_for_unknown_model() {
        let catalog = ModelCatalog::builtin();
        let resp = synthesize(&catalog, "foo.bar-v1", &request(r#"{"prompt":"ab"}"#));
        assert_eq!(resp.schema(), ResponseSchema::Generic);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["usage"]["input_tokens"], 1);
        assert!(
            json["output"]
                .as_str()
                .unwrap()
                .contains("claude-3-sonnet-20240229")
        );
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn token_counts_agree_across_shapes() {
        let catalog = ModelCatalog::builtin();
        let body = request(r#"{"messages":[{"content":"hello there","role":"user"}]}"#);
        let claude = synthesize(&catalog, "anthropic.claude-3-sonnet-20240229-v1:0", &body);
        let generic = synthesize(&catalog, "mistral.mistral-7b", &body);
        assert_eq!(claude.token_counts(), generic.token_counts());
        assert_eq!(claude.output_text(), generic.output_text());
    }

    #[test]
    fn untagged_deserialize_picks_matching_variant() {
        let titan: InvocationResponse = serde_json::from_value(json!({
            "inputTextTokenCount": 3,
            "results": [{"tokenCount": 9, "outputText": "hi", "completionReason": "FINISH"}]
        }))
        .unwrap();
        assert_eq!(titan.schema(), ResponseSchema::Titan);
        assert_eq!(titan.token_counts(), (3, 9));

        let generic: InvocationResponse = serde_json::from_value(json!({
            "output": "hi",
            "usage": {"input_tokens": 1, "output_tokens": 2}
        }))
        .unwrap();
        assert_eq!(generic.schema(), ResponseSchema::Generic);
        assert_eq!(generic.output_text(), "hi");
    }
}
