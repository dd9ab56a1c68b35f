//! 逐次解析キュー
//!
//! 同時実行は常に1件。pendingが何件あってもワーカーは1つで、
//! 先頭から順に 解析 → ストアへ書き戻し を繰り返す。
//! ドレイン中のenqueueはキュー末尾へ積むだけで、2本目のワーカーは
//! 起動しない（busyフラグによるガード）。
//!
//! キューが持つのはアイテムidの参照のみで、アイテムの寿命はストアが持つ。
//! 再解析・全消去は世代カウンタを進め、旧世代のまま飛行中だった
//! 呼び出しの結果は書き戻し時に破棄される

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::client::AnalysisClient;
use crate::notice::{Notice, NoticeSink};
use crate::store::ItemStore;
use crate::types::{AnalysisState, ItemId};

pub struct AnalysisQueue {
    store: Arc<ItemStore>,
    client: Arc<dyn AnalysisClient>,
    instruction: Arc<RwLock<String>>,
    notices: NoticeSink,
    pending: Mutex<VecDeque<ItemId>>,
    busy: AtomicBool,
    generation: AtomicU64,
    // tokio::spawnへ渡すArcを自身から取り出すための参照
    this: Weak<AnalysisQueue>,
}

impl AnalysisQueue {
    pub fn new(
        store: Arc<ItemStore>,
        client: Arc<dyn AnalysisClient>,
        instruction: Arc<RwLock<String>>,
        notices: NoticeSink,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            store,
            client,
            instruction,
            notices,
            pending: Mutex::new(VecDeque::new()),
            busy: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            this: this.clone(),
        })
    }

    /// キュー末尾へ追加し、ワーカーがいなければ起動する
    pub fn enqueue(&self, ids: Vec<ItemId>) {
        if ids.is_empty() {
            return;
        }
        self.pending.lock().unwrap().extend(ids);
        self.trigger();
    }

    /// まだ開始していないキュー項目を破棄する
    pub fn discard_pending(&self) -> usize {
        let mut pending = self.pending.lock().unwrap();
        let dropped = pending.len();
        pending.clear();
        dropped
    }

    /// 世代を進める。以降、旧世代の解析結果は書き戻されない
    pub fn advance_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn queued_len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// ワーカーがいなければドレインループを起動する
    fn trigger(&self) {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // ドレイン中: キューへ積むだけでよい
            return;
        }
        match self.this.upgrade() {
            Some(queue) => {
                tokio::spawn(async move { queue.drain().await });
            }
            None => self.busy.store(false, Ordering::Release),
        }
    }

    /// ドレインループ本体
    ///
    /// 先頭pop → 解析 → 書き戻し を空になるまで繰り返す。
    /// 「空を見てbusyを降ろした直後にenqueueされる」競合に備えて、
    /// 降ろした後にもう一度キューを確認する
    async fn drain(self: Arc<Self>) {
        loop {
            let next = self.pending.lock().unwrap().pop_front();
            let Some(id) = next else {
                self.busy.store(false, Ordering::Release);
                if self.pending.lock().unwrap().is_empty() {
                    return;
                }
                if self
                    .busy
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    // 別のtriggerが既にワーカーを起動した
                    return;
                }
                continue;
            };
            self.process_one(&id).await;
        }
    }

    /// アイテム1件を解析してストアへ書き戻す
    async fn process_one(&self, id: &ItemId) {
        // 全消去の直後などでアイテムが消えていたら黙ってスキップ
        let Some(item) = self.store.get(id) else {
            return;
        };

        let generation = self.generation.load(Ordering::Acquire);
        self.store.update_state(id, AnalysisState::Running);

        // 指示文はenqueue時点ではなくディスパッチ時点の値を使う
        let instruction = {
            let text = self.instruction.read().unwrap();
            if text.trim().is_empty() {
                None
            } else {
                Some(text.clone())
            }
        };

        let outcome = self.client.analyze(&item.image, instruction.as_deref()).await;

        // 再解析・全消去で世代が進んでいたら、この結果は古いので破棄
        if self.generation.load(Ordering::Acquire) != generation {
            return;
        }

        match outcome {
            Ok(description) => {
                if !self.store.update_state(id, AnalysisState::Done { description }) {
                    eprintln!("⚠ 既に存在しないアイテムへの書き戻しを無視: {}", id);
                }
            }
            Err(err) => {
                let message = err.message;
                let written = self.store.update_state(
                    id,
                    AnalysisState::Failed {
                        message: message.clone(),
                    },
                );
                if written {
                    self.notices.send(Notice::AnalysisFailed {
                        name: item.display_name.clone(),
                        message,
                    });
                }
                // 失敗は当該アイテムに閉じる。残りのキューは続行
            }
        }
    }
}
