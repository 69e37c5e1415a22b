// パス: src/lib.rs
// 役割: クレートのモジュール構成と公開 API の宣言
// 意図: 入力分類から外部コンパイラ連携までの層を一望できるようにする
// 関連ファイル: src/repl/mod.rs, src/classify.rs, src/toolchain.rs
//! C-Shell: C の断片を逐次コンパイルして実行する対話シェル。
//!
//! 処理の流れは 1 行単位で固定されている。入力を [`classify`]
//! で分類し、宣言は [`store::GlobalStore`] へ蓄積、文と式は
//! [`unit::build_unit`] で自己完結なコンパイル単位へ組み立てて
//! [`toolchain::Toolchain`] 実装に渡す。対話ループ全体は
//! [`repl::run_repl`] が束ねる。
//!
//! [`classify`]: classify::classify

pub mod classify;
pub mod errors;
pub mod history;
pub mod repl;
pub mod store;
pub mod toolchain;
pub mod unit;

pub use errors::{ShellError, ShellResult};
pub use repl::{run_repl, ReplMsg, ReplSession};
