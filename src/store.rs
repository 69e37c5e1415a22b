// パス: src/store.rs
// 役割: 受理済み宣言を蓄積するグローバルコードバッファを提供する
// 意図: 上限付きの追記専用バッファとして明示し、暗黙の切り詰めを排除する
// 関連ファイル: src/unit.rs, src/repl/cmd.rs, src/errors.rs
//! 宣言断片の永続バッファ。
//!
//! 受理した宣言を挿入順に連結して保持し、以後のすべての
//! コンパイル単位の固定部となる。追記は上限チェック付きの
//! アトミック操作で、失敗時はバッファを変更しない。
//! 縮小は `clear` のみ。並べ替えは行わない。

use crate::errors::{ShellError, ShellResult};

/// グローバルコードの既定上限（バイト）。
pub const MAX_GLOBAL_CODE: usize = 8192;

/// 受理済み宣言断片の追記専用バッファ。
#[derive(Debug, Clone)]
pub struct GlobalStore {
    code: String,
    capacity: usize,
}

impl GlobalStore {
    /// 既定上限で空のバッファを生成する。
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_GLOBAL_CODE)
    }

    /// 上限を指定して空のバッファを生成する（テスト向け）。
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: String::new(),
            capacity,
        }
    }

    /// 宣言断片と改行 1 つを末尾へ追記する。
    ///
    /// 追記後の総長が上限を超える場合は `CapacityExceeded` を返し、
    /// バッファは一切変更しない（部分書き込みなし）。
    pub fn append(&mut self, fragment: &str) -> ShellResult<()> {
        let requested = fragment.len() + 1;
        if self.code.len() + requested > self.capacity {
            return Err(ShellError::CapacityExceeded {
                used: self.code.len(),
                requested,
                limit: self.capacity,
            });
        }
        self.code.push_str(fragment);
        self.code.push('\n');
        Ok(())
    }

    /// バッファを空にする。失敗しない。
    pub fn clear(&mut self) {
        self.code.clear();
    }

    /// 現在の内容への参照を返す。副作用なし。
    #[must_use]
    pub fn snapshot(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }
}

impl Default for GlobalStore {
    fn default() -> Self {
        Self::new()
    }
}
