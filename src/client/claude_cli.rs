//! Claude CLI連携
//!
//! 画像を一時ファイルへ書き出し、claude CLIに読ませて説明文を得る

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use image_ai_common::{
    build_describe_prompt, new_item_id, parse_description_response, AnalysisClient, AnalysisError,
    ImageData,
};

use crate::config::Config;
use crate::error::{ImageAiError, Result};

pub struct ClaudeCliClient {
    timeout: Duration,
}

impl ClaudeCliClient {
    pub fn new(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// 画像を一時ファイルへ書き出す（CLIにはパスでしか渡せない）
    fn stage_image(image: &ImageData) -> Result<PathBuf> {
        let dir = std::env::temp_dir().join("image-ai");
        std::fs::create_dir_all(&dir)?;

        let file_name = format!(
            "{}.{}",
            new_item_id("stage"),
            extension_for_mime(&image.mime_type)
        );
        let path = dir.join(file_name);
        std::fs::write(&path, &image.bytes)?;
        Ok(path)
    }

    async fn run_claude(&self, prompt: &str) -> Result<String> {
        // 改行と引用符を落としてコマンドラインで渡す
        let sanitized = prompt.replace('\n', " ").replace('"', "\\\"");

        #[cfg(windows)]
        let output = Command::new("cmd")
            .args(["/c", "claude", "-p", &sanitized, "--output-format", "text"])
            .output();

        #[cfg(not(windows))]
        let output = Command::new("claude")
            .args(["-p", &sanitized, "--output-format", "text"])
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| {
                ImageAiError::CliExecution(format!("タイムアウト ({}秒)", self.timeout.as_secs()))
            })?
            .map_err(|e| ImageAiError::CliExecution(format!("Claude CLI実行エラー: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ImageAiError::CliExecution(format!(
                "Claude CLI failed (code {:?}): {}",
                output.status.code(),
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl AnalysisClient for ClaudeCliClient {
    async fn analyze(
        &self,
        image: &ImageData,
        instruction: Option<&str>,
    ) -> std::result::Result<String, AnalysisError> {
        let path = Self::stage_image(image).map_err(|e| AnalysisError::new(e.to_string()))?;

        let prompt = format!(
            "次の画像ファイルを読み込んでください: {}\n\n{}",
            path.display().to_string().replace('\\', "/"),
            build_describe_prompt(instruction)
        );

        let outcome = self.run_claude(&prompt).await;

        // 一時ファイルは結果に関わらず消す（失敗しても無視）
        let _ = std::fs::remove_file(&path);

        let response = outcome.map_err(|e| AnalysisError::new(e.to_string()))?;
        parse_description_response(&response).map_err(|e| AnalysisError::new(e.to_string()))
    }
}

fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/gif"), "gif");
        assert_eq!(extension_for_mime("image/webp"), "webp");
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("何か別の値"), "jpg");
    }

    #[test]
    fn test_stage_image_writes_bytes() {
        let image = ImageData::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg");
        let path = ClaudeCliClient::stage_image(&image).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(path.extension().unwrap(), "jpg");

        std::fs::remove_file(&path).ok();
    }
}
