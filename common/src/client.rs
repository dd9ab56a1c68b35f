//! 解析クライアント契約
//!
//! 外部AIサービス呼び出しの境界。失敗の種別（タイムアウト・HTTPエラー・
//! パース失敗など）はキューにとって不透明で、人間可読メッセージに一本化される

use async_trait::async_trait;
use thiserror::Error;

use crate::types::ImageData;

/// 解析失敗
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct AnalysisError {
    pub message: String,
}

impl AnalysisError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 外部AI記述サービスのアダプタ
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// 画像1枚を解析して説明文を返す
    ///
    /// instructionが無い場合でも失敗せず、汎用的な説明を生成する
    async fn analyze(
        &self,
        image: &ImageData,
        instruction: Option<&str>,
    ) -> Result<String, AnalysisError>;
}
