//! image-ai-rust
//!
//! 画像AI解析ツール（逐次解析キュー）。
//! コアのキュー/ストア/コントローラは image-ai-common 側にあり、
//! このクレートはCLIと各プロバイダの解析クライアント実装を持つ

pub mod ai_provider;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod scanner;

pub use error::{ImageAiError, Result};
