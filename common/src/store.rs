//! アイテムストア
//!
//! 投入済みアイテムと解析状態の唯一の保管場所。
//! 変更のたびにwatchチャネルへスナップショットを配信し、
//! プレゼンテーション層はそれを購読して表示を更新する。
//! コアのロジックは購読者の有無に依存しない

use std::sync::Mutex;

use tokio::sync::watch;

use crate::types::{AnalysisState, Item};

pub struct ItemStore {
    items: Mutex<Vec<Item>>,
    snapshot_tx: watch::Sender<Vec<Item>>,
}

impl ItemStore {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(Vec::new());
        Self {
            items: Mutex::new(Vec::new()),
            snapshot_tx,
        }
    }

    /// アイテムを末尾に追加（投入順を維持）
    pub fn append(&self, new_items: Vec<Item>) {
        let mut items = self.items.lock().unwrap();
        items.extend(new_items);
        self.publish(&items);
    }

    /// 状態を更新する。未知のidならfalse（致命的ではない）
    pub fn update_state(&self, id: &str, state: AnalysisState) -> bool {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.state = state;
                self.publish(&items);
                true
            }
            None => false,
        }
    }

    /// 全アイテムを置き換える（再解析のリセットで使用。順序・idは呼び出し側が維持する）
    pub fn replace_all(&self, new_items: Vec<Item>) {
        let mut items = self.items.lock().unwrap();
        *items = new_items;
        self.publish(&items);
    }

    /// ストアを空にする
    pub fn clear(&self) {
        let mut items = self.items.lock().unwrap();
        items.clear();
        self.publish(&items);
    }

    pub fn get(&self, id: &str) -> Option<Item> {
        self.items.lock().unwrap().iter().find(|item| item.id == id).cloned()
    }

    pub fn snapshot(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }

    /// Pending/Runningのアイテムが残っているか
    pub fn has_unsettled(&self) -> bool {
        self.items.lock().unwrap().iter().any(|item| item.state.is_unsettled())
    }

    /// スナップショット購読（プレゼンテーション層用）
    pub fn subscribe(&self) -> watch::Receiver<Vec<Item>> {
        self.snapshot_tx.subscribe()
    }

    fn publish(&self, items: &[Item]) {
        self.snapshot_tx.send_replace(items.to_vec());
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageData;

    fn item(name: &str) -> Item {
        Item::new(name, ImageData::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg"))
    }

    #[test]
    fn test_append_preserves_order() {
        let store = ItemStore::new();
        store.append(vec![item("a.jpg"), item("b.jpg")]);
        store.append(vec![item("c.jpg")]);

        let names: Vec<String> = store
            .snapshot()
            .iter()
            .map(|i| i.display_name.clone())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_update_state_unknown_id_is_noop() {
        let store = ItemStore::new();
        store.append(vec![item("a.jpg")]);

        let updated = store.update_state(
            "存在しないid",
            AnalysisState::Done {
                description: "x".to_string(),
            },
        );
        assert!(!updated);
        assert_eq!(store.snapshot()[0].state, AnalysisState::Pending);
    }

    #[test]
    fn test_update_state_sets_result() {
        let store = ItemStore::new();
        let target = item("a.jpg");
        let id = target.id.clone();
        store.append(vec![target]);

        assert!(store.update_state(
            &id,
            AnalysisState::Done {
                description: "夕焼けの空".to_string(),
            },
        ));
        assert_eq!(store.snapshot()[0].state.description(), Some("夕焼けの空"));
        assert!(!store.has_unsettled());
    }

    #[test]
    fn test_replace_all_and_clear() {
        let store = ItemStore::new();
        store.append(vec![item("a.jpg"), item("b.jpg")]);

        let reset: Vec<Item> = store.snapshot().iter().map(Item::reset).collect();
        let ids: Vec<String> = reset.iter().map(|i| i.id.clone()).collect();
        store.replace_all(reset);

        let after: Vec<String> = store.snapshot().iter().map(|i| i.id.clone()).collect();
        assert_eq!(after, ids);
        assert!(store.has_unsettled());

        store.clear();
        assert!(store.is_empty());
        assert!(!store.has_unsettled());
    }

    #[test]
    fn test_subscribe_sees_latest_snapshot() {
        let store = ItemStore::new();
        let rx = store.subscribe();
        store.append(vec![item("a.jpg")]);
        assert_eq!(rx.borrow().len(), 1);
    }
}
