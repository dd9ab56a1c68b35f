//! レスポンスパーサー
//!
//! AIサービスのレスポンスから説明文を取り出す。
//! jsonフェンス → 生のJSONオブジェクト → プレーンテキスト の順で解釈する

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Deserialize)]
struct DescriptionPayload {
    description: String,
}

/// レスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
///
/// # Examples
/// ```
/// use image_ai_common::extract_json;
///
/// let response = "結果: {\"description\": \"海辺の写真\"}";
/// let json = extract_json(response).unwrap();
/// assert!(json.contains("description"));
/// ```
pub fn extract_json(response: &str) -> Option<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            return Some(response[start..start + end_offset].trim());
        }
    }

    // 生の {...} を探す
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end >= start {
        return Some(&response[start..=end]);
    }
    None
}

/// 説明文レスポンスをパース
///
/// `{"description": ...}` 形式のJSONを優先し、JSONとして解釈できない
/// レスポンスはプレーンテキストの説明文とみなして前後の空白を落とす
pub fn parse_description_response(response: &str) -> Result<String> {
    if let Some(json_str) = extract_json(response) {
        if let Ok(payload) = serde_json::from_str::<DescriptionPayload>(json_str) {
            return Ok(payload.description);
        }
        // JSONに見えたが説明文の形ではない: プレーンテキスト扱いへ
    }

    let text = response.trim();
    if text.is_empty() {
        return Err(Error::Parse("レスポンスが空です".to_string()));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // extract_json テスト
    // =============================================

    #[test]
    fn test_extract_json_with_block() {
        let response = r#"Here is the analysis:
```json
{"description": "砂浜と青い海"}
```
Some additional text."#;

        let json = extract_json(response).unwrap();
        assert!(json.contains("description"));
        assert!(json.contains("砂浜と青い海"));
    }

    #[test]
    fn test_extract_json_raw_object() {
        let response = r#"{"description": "夜景の写真"}"#;
        assert_eq!(extract_json(response), Some(r#"{"description": "夜景の写真"}"#));
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"結果は {"description": "かもめ"} です"#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_none_for_plain_text() {
        assert_eq!(extract_json("No JSON here, just plain text."), None);
        assert_eq!(extract_json(""), None);
    }

    // =============================================
    // parse_description_response テスト
    // =============================================

    #[test]
    fn test_parse_description_from_json_block() {
        let response = "```json\n{\"description\": \"公園で遊ぶ犬\"}\n```";
        let description = parse_description_response(response).unwrap();
        assert_eq!(description, "公園で遊ぶ犬");
    }

    #[test]
    fn test_parse_description_from_raw_json() {
        let response = r#"{"description": "赤い屋根の家"}"#;
        assert_eq!(parse_description_response(response).unwrap(), "赤い屋根の家");
    }

    #[test]
    fn test_parse_description_plain_text_fallback() {
        // JSONを返さないモデル向け: プレーンテキストをそのまま説明文にする
        let response = "  この画像には山並みが写っています。  \n";
        assert_eq!(
            parse_description_response(response).unwrap(),
            "この画像には山並みが写っています。"
        );
    }

    #[test]
    fn test_parse_description_json_without_description_field() {
        // JSONには見えるが形が違う: プレーンテキスト扱い
        let response = r#"{"caption": "別のキー"}"#;
        assert_eq!(parse_description_response(response).unwrap(), response);
    }

    #[test]
    fn test_parse_description_empty_is_error() {
        let result = parse_description_response("   \n ");
        assert!(result.is_err());
        if let Err(Error::Parse(msg)) = result {
            assert!(msg.contains("空"));
        } else {
            panic!("Expected Parse error");
        }
    }
}
