use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    config::GeminiConfig,
    enrichment::EnrichedFields,
    upstream::{HttpClient, MediaKind},
};

const GENERATE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CandidatePart {
    text: String,
}

/// Client for the Gemini text completion endpoint
pub struct GeminiClient {
    http: HttpClient,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Build a client, or None when no API key is configured
    pub fn from_config(config: &GeminiConfig) -> Option<Self> {
        if config.api_key.is_empty() {
            return None;
        }

        Some(Self {
            http: HttpClient::new(GENERATE_BASE_URL, REQUEST_TIMEOUT),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Ask the model to describe a title. Any failure, including a malformed
    /// reply, degrades to all-empty fields rather than an error.
    pub async fn describe(&self, title: &str, kind: MediaKind) -> EnrichedFields {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(title, kind),
                }],
            }],
        };

        let endpoint = format!("/{}:generateContent?key={}", self.model, self.api_key);

        let response: GenerateResponse = match self.http.post_json(&endpoint, &body).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Gemini call failed for '{title}': {e}");
                return EnrichedFields::default();
            }
        };

        response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| extract_fields(&p.text))
            .unwrap_or_default()
    }
}

fn build_prompt(title: &str, kind: MediaKind) -> String {
    format!(
        r#"Identify the {kind} "{title}".
Return a strictly valid JSON object (no markdown formatting) with these fields:
- "year": (string) Release year (e.g. "2023").
- "rating": (string) Average score 0-10 (e.g. "8.5").
- "status": (string) "Ongoing" or "Completed".
- "author": (string) Original creator/mangaka.
- "genre": (string) Comma-separated genres (e.g. "Action, Adventure").
- "synopsis": (string) A very short, engaging 1-sentence summary.
If unknown, return generic/empty values but valid JSON."#
    )
}

/// Pull the JSON object out of the model's reply, tolerating markdown
/// code-fence wrapping
fn extract_fields(text: &str) -> Option<EnrichedFields> {
    let mut raw = text.trim();
    raw = raw.strip_prefix("```json").unwrap_or(raw);
    raw = raw.strip_prefix("```").unwrap_or(raw);
    raw = raw.strip_suffix("```").unwrap_or(raw);
    let raw = raw.trim();

    serde_json::from_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_json() {
        let text = r#"{"year":"1999","rating":"8.7","status":"Ongoing","author":"Eiichiro Oda","genre":"Action, Adventure","synopsis":"Pirates chase a legendary treasure."}"#;

        let fields = extract_fields(text).unwrap();

        assert_eq!(fields.year, "1999");
        assert_eq!(fields.author, "Eiichiro Oda");
    }

    #[test]
    fn extracts_fenced_json() {
        let text = "```json\n{\"year\":\"2023\",\"rating\":\"\",\"status\":\"Completed\",\"author\":\"\",\"genre\":\"Drama\",\"synopsis\":\"\"}\n```";

        let fields = extract_fields(text).unwrap();

        assert_eq!(fields.year, "2023");
        assert_eq!(fields.status, "Completed");
        assert_eq!(fields.genre, "Drama");
    }

    #[test]
    fn tolerates_partial_objects() {
        let fields = extract_fields(r#"{"year":"2020"}"#).unwrap();

        assert_eq!(fields.year, "2020");
        assert!(fields.genre.is_empty());
    }

    #[test]
    fn rejects_non_json_reply() {
        assert!(extract_fields("Sorry, I cannot help with that.").is_none());
    }

    #[test]
    fn prompt_names_the_media_kind() {
        let prompt = build_prompt("One Piece", MediaKind::Anime);

        assert!(prompt.contains(r#"the anime "One Piece""#));
    }
}
