// https://ai.google.dev/api/generate-content - structured output mode.
// The schema pins the payload to exactly the three fields the app renders;
// anything else coming back is treated as a failed fetch.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{ContextFailure, DeepContext};

const GENERATIVE_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub(crate) async fn generate_context(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    word: &str,
) -> Result<DeepContext, ContextFailure> {
    let url = format!("{GENERATIVE_API_URL}/{model}:generateContent");
    let res = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(&context_request(word))
        .send()
        .await
        .map_err(ContextFailure::Fetch)?;
    if !res.status().is_success() {
        return Err(ContextFailure::Status(res.status()));
    }
    let response = res
        .json::<GenerateContentResponse>()
        .await
        .map_err(ContextFailure::Deserialize)?;
    context_from_response(response)
}

fn context_request(word: &str) -> GenerateContentRequest {
    let prompt = format!(
        "Provide a deep context for the word \"{word}\". Include:\n\
         1. A memorable mnemonic device to remember its meaning.\n\
         2. A brief etymology (origin) in one sentence.\n\
         3. A unique usage tip.\n\
         Keep it professional, engaging, and concise."
    );
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: json!({
                "type": "OBJECT",
                "properties": {
                    "mnemonic": {
                        "type": "STRING",
                        "description": "A short, clever memory aid for the word."
                    },
                    "etymology": {
                        "type": "STRING",
                        "description": "The historical origin of the word in a single sentence."
                    },
                    "usageTip": {
                        "type": "STRING",
                        "description": "A tip on how to use the word correctly in conversation or writing."
                    }
                },
                "required": ["mnemonic", "etymology", "usageTip"]
            }),
        },
    }
}

/// The model's answer arrives as a JSON document inside the first text part.
fn context_from_response(
    response: GenerateContentResponse,
) -> Result<DeepContext, ContextFailure> {
    let text = response
        .candidates
        .into_iter()
        .flat_map(|candidate| candidate.content.parts)
        .find_map(|part| (!part.text.is_empty()).then_some(part.text))
        .ok_or(ContextFailure::EmptyResponse)?;
    serde_json::from_str(&text).map_err(ContextFailure::MalformedPayload)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_structured_output_config() {
        let request = serde_json::to_value(context_request("ethereal")).unwrap();
        assert_eq!(
            request["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            request["generationConfig"]["responseSchema"]["required"],
            json!(["mnemonic", "etymology", "usageTip"])
        );
        let prompt = request["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("\"ethereal\""));
        assert!(prompt.contains("mnemonic device"));
    }

    #[test]
    fn response_text_is_parsed_into_context() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "parts": [{
                            "text": "{\"mnemonic\":\"m\",\"etymology\":\"e\",\"usageTip\":\"u\"}"
                        }]
                    }
                }]
            }"#,
        )
        .unwrap();
        let context = context_from_response(response).unwrap();
        assert_eq!(context.mnemonic, "m");
        assert_eq!(context.etymology, "e");
        assert_eq!(context.usage_tip, "u");
    }

    #[test]
    fn empty_candidates_are_a_failure() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            context_from_response(response),
            Err(ContextFailure::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_text_payload_is_a_failure() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"mnemonic\":\"only one field\"}" }] }
                }]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            context_from_response(response),
            Err(ContextFailure::MalformedPayload(_))
        ));
    }
}
