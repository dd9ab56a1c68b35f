//! 解析クライアント実装
//!
//! - Gemini API (HTTP)
//! - Claude CLI (サブプロセス)

mod claude_cli;
mod gemini;

pub use claude_cli::ClaudeCliClient;
pub use gemini::GeminiClient;

use std::sync::Arc;

use image_ai_common::AnalysisClient;

use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::Result;

/// プロバイダ設定から解析クライアントを構築
pub fn build_client(provider: AiProvider, config: &Config) -> Result<Arc<dyn AnalysisClient>> {
    match provider {
        AiProvider::Gemini => Ok(Arc::new(GeminiClient::new(config.get_api_key()?, config))),
        AiProvider::ClaudeCli => Ok(Arc::new(ClaudeCliClient::new(config))),
    }
}
