//! アイテム型定義
//!
//! 投入された画像1枚（Item）とその解析ライフサイクル状態。
//! 画像バイト列とidは作成後に変化しない

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::Engine as _;
use sha2::{Digest, Sha256};

/// アイテムID（生成後は不変）
pub type ItemId = String;

/// 画像データ
///
/// バイト列は作成後に不変。再解析でも同じArcを使い回す
#[derive(Debug, Clone)]
pub struct ImageData {
    pub bytes: Arc<[u8]>,
    pub mime_type: String,
}

impl ImageData {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: Arc::from(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// サムネイル表示用のData URLを生成
    pub fn to_data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime_type, encoded)
    }
}

/// アイテムの解析状態
///
/// 結果・エラーメッセージはDone/Failedのペイロードとして持つため、
/// 「結果とエラーが同時に立つ」状態は型の上で存在しない
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    Pending,
    Running,
    Done { description: String },
    Failed { message: String },
}

impl AnalysisState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisState::Pending => "pending",
            AnalysisState::Running => "running",
            AnalysisState::Done { .. } => "done",
            AnalysisState::Failed { .. } => "failed",
        }
    }

    /// まだ決着していない（Pending/Running）かどうか
    pub fn is_unsettled(&self) -> bool {
        matches!(self, AnalysisState::Pending | AnalysisState::Running)
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            AnalysisState::Done { description } => Some(description),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AnalysisState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// 投入された画像1枚
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub display_name: String,
    pub image: ImageData,
    pub state: AnalysisState,
}

impl Item {
    /// 新規アイテムを作成（状態は投入時点で即Pending）
    pub fn new(display_name: impl Into<String>, image: ImageData) -> Self {
        let display_name = display_name.into();
        let id = new_item_id(&display_name);
        Self {
            id,
            display_name,
            image,
            state: AnalysisState::Pending,
        }
    }

    /// 再解析用にPendingへ戻したコピーを返す（id・バイト列は維持）
    pub fn reset(&self) -> Self {
        Self {
            state: AnalysisState::Pending,
            ..self.clone()
        }
    }
}

static ITEM_SEQ: AtomicU64 = AtomicU64::new(0);

/// アイテムIDを生成
///
/// ファイル名 + タイムスタンプ + ハッシュ8桁。貼り付け画像など
/// 同名ファイルが同一ミリ秒に複数来てもシーケンス番号で衝突しない
pub fn new_item_id(display_name: &str) -> ItemId {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = ITEM_SEQ.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(display_name.as_bytes());
    hasher.update(millis.to_le_bytes());
    hasher.update(seq.to_le_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{}-{}-{}", display_name, millis, &digest[..8])
}
