//! Gemini API連携
//!
//! 画像1枚 + 説明プロンプトをgenerateContentへ送り、説明文を受け取る

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use image_ai_common::{
    build_describe_prompt, parse_description_response, AnalysisClient, AnalysisError, ImageData,
};

use crate::config::Config;
use crate::error::{ImageAiError, Result};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_image_size: u32,
}

impl GeminiClient {
    pub fn new(api_key: String, config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            api_key,
            model: config.model.clone(),
            max_image_size: config.max_image_size,
        }
    }

    /// 送信ペイロードを準備する
    ///
    /// 推奨サイズを超える画像は縮小してJPEG再エンコードする。
    /// デコードできないバイト列はそのまま送る（検証はAPI側に任せる）
    fn prepare_payload(&self, image: &ImageData) -> (String, String) {
        if let Ok(decoded) = image::load_from_memory(&image.bytes) {
            if decoded.width().max(decoded.height()) > self.max_image_size {
                let resized = decoded.resize(
                    self.max_image_size,
                    self.max_image_size,
                    image::imageops::FilterType::Triangle,
                );
                let mut buf = Vec::new();
                let mut cursor = std::io::Cursor::new(&mut buf);
                if resized.write_to(&mut cursor, image::ImageFormat::Jpeg).is_ok() {
                    let data = base64::engine::general_purpose::STANDARD.encode(&buf);
                    return ("image/jpeg".to_string(), data);
                }
            }
        }

        let data = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        (image.mime_type.clone(), data)
    }

    async fn request_description(
        &self,
        image: &ImageData,
        instruction: Option<&str>,
    ) -> Result<String> {
        let (mime_type, data) = self.prepare_payload(image);

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: build_describe_prompt(instruction),
                    },
                    Part::InlineData {
                        inline_data: InlineData { mime_type, data },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ImageAiError::ApiCall(format!("リクエスト送信に失敗: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageAiError::ApiCall(format!(
                "APIがエラーを返しました (status {}): {}",
                status, body
            )));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ImageAiError::ApiCall(format!("レスポンスの読み取りに失敗: {}", e)))?;

        payload
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| ImageAiError::ApiCall("レスポンスが空です".to_string()))
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    async fn analyze(
        &self,
        image: &ImageData,
        instruction: Option<&str>,
    ) -> std::result::Result<String, AnalysisError> {
        let response_text = self
            .request_description(image, instruction)
            .await
            .map_err(|e| AnalysisError::new(e.to_string()))?;

        parse_description_response(&response_text).map_err(|e| AnalysisError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // リクエスト/レスポンス シリアライズテスト
    // =============================================

    #[test]
    fn test_gemini_request_serialize() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: "テストプロンプト".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let json = serde_json::to_string(&request).expect("シリアライズ失敗");
        assert!(json.contains("\"contents\""));
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"temperature\":0.1"));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
    }

    #[test]
    fn test_part_inline_data_serialize() {
        let part = Part::InlineData {
            inline_data: InlineData {
                mime_type: "image/jpeg".to_string(),
                data: "base64data".to_string(),
            },
        };
        let json = serde_json::to_string(&part).expect("シリアライズ失敗");
        assert!(json.contains("\"inline_data\""));
        assert!(json.contains("\"mime_type\":\"image/jpeg\""));
        assert!(json.contains("\"data\":\"base64data\""));
    }

    #[test]
    fn test_gemini_response_deserialize() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "{\"description\": \"庭のバラ\"}"
                    }]
                }
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(response.candidates.len(), 1);
        assert!(response.candidates[0].content.parts[0].text.contains("庭のバラ"));
    }

    #[test]
    fn test_prepare_payload_passes_through_undecodable_bytes() {
        let config = Config {
            api_key: None,
            model: "gemini-2.0-flash-exp".to_string(),
            max_image_size: 100,
            timeout_seconds: 5,
        };
        let client = GeminiClient::new("dummy".to_string(), &config);

        // デコード不能なバイト列はMIMEもデータも元のまま
        let image = ImageData::new(vec![0xFF, 0xD8, 0xFF, 0x00], "image/jpeg");
        let (mime, data) = client.prepare_payload(&image);
        assert_eq!(mime, "image/jpeg");
        assert_eq!(
            data,
            base64::engine::general_purpose::STANDARD.encode(&*image.bytes)
        );
    }
}
