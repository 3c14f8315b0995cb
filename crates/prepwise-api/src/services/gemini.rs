// Gemini `generateContent`: plain text answers and image/design generation.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ServicesClient, endpoint};
use crate::error::{Error, Service};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

impl GenerateResponse {
    fn first_parts(self) -> Vec<Part> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
    }
}

/// Result of an image request: either base64 inline image bytes, or a
/// JSON design description when the model answered in text.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratedImage {
    Inline { mime: String, data: String },
    Design(serde_json::Value),
}

fn joined_text(parts: &[Part]) -> String {
    parts
        .iter()
        .map(|p| p.text.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}

impl ServicesClient {
    fn gemini_url(&self, model: &str, api_key: &SecretString) -> Result<url::Url, Error> {
        let mut url = endpoint(
            &self.endpoints().gemini,
            &format!("models/{model}:generateContent"),
        )?;
        url.query_pairs_mut()
            .append_pair("key", api_key.expose_secret());
        Ok(url)
    }

    /// Ask the model a question; returns the concatenated text parts of the
    /// first candidate (empty if the model returned none).
    pub async fn generate_text(
        &self,
        api_key: &SecretString,
        prompt: &str,
        model: &str,
    ) -> Result<String, Error> {
        let url = self.gemini_url(model, api_key)?;
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let resp: GenerateResponse = self
            .send_json(Service::Gemini, self.http().post(url).json(&body))
            .await?;
        Ok(joined_text(&resp.first_parts()))
    }

    /// Ask the model for an image. Inline image data wins; otherwise a text
    /// answer that parses as a JSON object is returned as a design.
    pub async fn generate_image(
        &self,
        api_key: &SecretString,
        prompt: &str,
        model: &str,
    ) -> Result<GeneratedImage, Error> {
        let url = self.gemini_url(model, api_key)?;
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });
        let resp: GenerateResponse = self
            .send_json(Service::Gemini, self.http().post(url).json(&body))
            .await?;
        let parts = resp.first_parts();

        if let Some(inline) = parts.iter().find_map(|p| p.inline_data.as_ref()) {
            if let (Some(mime), Some(data)) = (&inline.mime_type, &inline.data) {
                return Ok(GeneratedImage::Inline {
                    mime: mime.clone(),
                    data: data.clone(),
                });
            }
        }

        let text = joined_text(&parts);
        if text.starts_with('{') {
            if let Ok(design) = serde_json::from_str::<serde_json::Value>(&text) {
                return Ok(GeneratedImage::Design(design));
            }
        }

        Err(Error::NoImageData)
    }
}
