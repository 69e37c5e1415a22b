// パス: src/repl/mod.rs
// 役割: REPL サブモジュール群の窓口
// 意図: 外部へはセッション制御の最小 API だけを見せる
// 関連ファイル: src/repl/cmd.rs, src/repl/printer.rs
//! 対話ループとセッション制御。

pub mod cmd;
mod printer;

pub use cmd::{run_repl, ReplMsg, ReplSession};
