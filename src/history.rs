// パス: src/history.rs
// 役割: `history` コマンドが表示する直近入力の上限付きログを保持する
// 意図: 表示専用の読み取りモデルを分類・実行経路から切り離す
// 関連ファイル: src/repl/cmd.rs, src/store.rs
//! 表示専用の入力履歴ログ。
//!
//! 直近 N 件の入力行を FIFO で保持する。分類やコンパイルには
//! 一切影響せず、`history` コマンドの表示にのみ使われる。

use std::collections::VecDeque;

/// 保持する履歴件数の既定値。
pub const HISTORY_CAPACITY: usize = 50;

/// 上限付きの入力履歴。満杯時は最古のエントリから追い出す。
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl HistoryLog {
    /// 既定容量で空の履歴を生成する。
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// 容量を指定して空の履歴を生成する（テスト向け）。
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 入力行を記録する。容量超過時は最古の行を追い出す。
    pub fn record(&mut self, line: &str) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_string());
    }

    /// 古い順にエントリを辿るイテレータを返す。
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
