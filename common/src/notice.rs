//! 通知イベント
//!
//! トースト相当の一時通知。フロントエンドが受信側を持ち、
//! コアは送るだけ。受信側がいなくても送信は失敗扱いにしない

use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 画像を受け付けてキューに積んだ
    Submitted { count: usize },
    /// 画像ファイルではないため却下した
    InvalidFileType { name: String },
    /// ファイルを読み込めなかった（アイテムは作られない）
    ReadFailed { name: String, message: String },
    /// 解析に失敗した（バッチは続行）
    AnalysisFailed { name: String, message: String },
    /// 全件を再解析する
    Reanalyzing,
    /// 全消去した
    Cleared,
}

/// 通知の送信側。クローンして各コンポーネントへ配る
#[derive(Clone)]
pub struct NoticeSink {
    tx: mpsc::UnboundedSender<Notice>,
}

impl NoticeSink {
    pub fn send(&self, notice: Notice) {
        // 受信側が先に終了していても無視する
        let _ = self.tx.send(notice);
    }
}

/// 通知チャネルを作成する
pub fn notice_channel() -> (NoticeSink, mpsc::UnboundedReceiver<Notice>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NoticeSink { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_without_receiver_does_not_panic() {
        let (sink, rx) = notice_channel();
        drop(rx);
        sink.send(Notice::Cleared);
    }

    #[test]
    fn test_notices_arrive_in_order() {
        let (sink, mut rx) = notice_channel();
        sink.send(Notice::Submitted { count: 2 });
        sink.send(Notice::Reanalyzing);

        assert_eq!(rx.try_recv().unwrap(), Notice::Submitted { count: 2 });
        assert_eq!(rx.try_recv().unwrap(), Notice::Reanalyzing);
        assert!(rx.try_recv().is_err());
    }
}
