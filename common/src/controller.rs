//! バッチコントローラ
//!
//! 新規投入 / 全件再解析 / 全消去のエントリポイント。
//! ストアとキューの変更はここかランナーだけが行い、プレゼンテーション層は
//! スナップショット購読とコマンド発行のみを行う

use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use crate::client::AnalysisClient;
use crate::intake::{default_pasted_name, sniff_image_mime, FileSource};
use crate::notice::{Notice, NoticeSink};
use crate::queue::AnalysisQueue;
use crate::store::ItemStore;
use crate::types::{ImageData, Item};

pub struct BatchController {
    store: Arc<ItemStore>,
    queue: Arc<AnalysisQueue>,
    instruction: Arc<RwLock<String>>,
    notices: NoticeSink,
}

impl BatchController {
    pub fn new(client: Arc<dyn AnalysisClient>, notices: NoticeSink) -> Self {
        let store = Arc::new(ItemStore::new());
        let instruction = Arc::new(RwLock::new(String::new()));
        let queue = AnalysisQueue::new(
            Arc::clone(&store),
            client,
            Arc::clone(&instruction),
            notices.clone(),
        );
        Self {
            store,
            queue,
            instruction,
            notices,
        }
    }

    /// 新規ファイルを投入する。受け付けた件数を返す
    ///
    /// 画像でないファイルは1件ずつ警告して弾き、残りの処理は続行する。
    /// 受け付けたアイテムは投入時点で即Pendingとしてストアに載り、
    /// キュー末尾へ並ぶ（ワーカーがいなければ起動される）
    pub fn submit_new(&self, files: Vec<FileSource>) -> usize {
        let mut accepted = Vec::new();

        for source in files {
            let file = match source.materialize() {
                Ok(file) => file,
                Err(err) => {
                    self.notices.send(Notice::ReadFailed {
                        name: err.name,
                        message: err.message,
                    });
                    continue;
                }
            };

            let Some(mime_type) = sniff_image_mime(&file.bytes) else {
                let name = file.name.unwrap_or_else(|| "無名データ".to_string());
                self.notices.send(Notice::InvalidFileType { name });
                continue;
            };

            // 貼り付け画像などの無名ソースには既定名を与える
            let display_name = file.name.unwrap_or_else(default_pasted_name);
            accepted.push(Item::new(display_name, ImageData::new(file.bytes, mime_type)));
        }

        if accepted.is_empty() {
            return 0;
        }

        let count = accepted.len();
        let ids = accepted.iter().map(|item| item.id.clone()).collect();
        self.store.append(accepted);
        self.queue.enqueue(ids);
        self.notices.send(Notice::Submitted { count });
        count
    }

    /// 全件を現在の指示文で再解析する。アイテムが無い場合は何もせずfalse
    ///
    /// 実行中のバッチがあっても新しい世代が取って代わる:
    /// 未開始のキュー項目は破棄し、全アイテムをid・順序を保ったまま
    /// Pendingへ戻して積み直す。飛行中だった呼び出しの結果は
    /// 世代チェックにより書き戻されない
    pub fn reanalyze_all(&self) -> bool {
        if self.store.is_empty() {
            return false;
        }

        self.queue.advance_generation();
        self.queue.discard_pending();

        let reset: Vec<Item> = self.store.snapshot().iter().map(Item::reset).collect();
        let ids = reset.iter().map(|item| item.id.clone()).collect();
        self.store.replace_all(reset);
        self.queue.enqueue(ids);
        self.notices.send(Notice::Reanalyzing);
        true
    }

    /// 全アイテム・キュー・指示文を無条件に消去する
    pub fn clear_all(&self) {
        self.queue.advance_generation();
        self.queue.discard_pending();
        self.store.clear();
        self.instruction.write().unwrap().clear();
        self.notices.send(Notice::Cleared);
    }

    /// 指示文を設定する（以後にディスパッチされるアイテムから反映される）
    pub fn set_instruction(&self, text: impl Into<String>) {
        *self.instruction.write().unwrap() = text.into();
    }

    pub fn instruction(&self) -> String {
        self.instruction.read().unwrap().clone()
    }

    /// 処理中かどうか
    ///
    /// 独立したフラグは持たず「キュー非空 or 未決着アイテムあり」で都度導出する
    pub fn is_processing(&self) -> bool {
        self.queue.queued_len() > 0 || self.store.has_unsettled()
    }

    pub fn store(&self) -> &Arc<ItemStore> {
        &self.store
    }

    pub fn subscribe_items(&self) -> watch::Receiver<Vec<Item>> {
        self.store.subscribe()
    }

    /// 全アイテムが決着するまで待つ
    pub async fn wait_until_idle(&self) {
        let mut rx = self.store.subscribe();
        loop {
            if !self.is_processing() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
