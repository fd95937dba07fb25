use crate::domain::ports::VisionModel;
use crate::utils::error::{Result, TriageError};
use base64::prelude::{Engine, BASE64_STANDARD};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// 市政照片(垃圾、塗鴉)容易誤觸安全過濾,
/// 所以每個請求都把四類全部關成 BLOCK_NONE。
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini generateContent 客戶端。影像以 inline base64 附在請求裡。
/// 所有失敗都回 ClassificationError,由分類階段降級成 other。
pub struct GeminiVisionClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiVisionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_endpoint(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn request_body(prompt: &str, image: &[u8], mime_type: &str) -> serde_json::Value {
        let safety_settings: Vec<serde_json::Value> = SAFETY_CATEGORIES
            .iter()
            .map(|category| {
                serde_json::json!({"category": category, "threshold": "BLOCK_NONE"})
            })
            .collect();

        serde_json::json!({
            "contents": [{
                "parts": [
                    {"text": prompt},
                    {"inline_data": {
                        "mime_type": mime_type,
                        "data": BASE64_STANDARD.encode(image),
                    }},
                ]
            }],
            "safetySettings": safety_settings,
        })
    }
}

impl VisionModel for GeminiVisionClient {
    async fn generate(&self, prompt: &str, image: &[u8], mime_type: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&Self::request_body(prompt, image, mime_type))
            .send()
            .await
            .map_err(|e| TriageError::ClassificationError(format!("model unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::ClassificationError(format!(
                "model endpoint returned {}",
                status
            )));
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            TriageError::ClassificationError(format!("unparseable model response: {}", e))
        })?;

        // 安全封鎖時 candidates 沒有文字 part,一樣當分類失敗
        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                TriageError::ClassificationError("response carries no text candidate".into())
            })
    }
}
