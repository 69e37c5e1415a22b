// パス: src/errors.rs
// 役割: セッション内で発生しうるエラー種別を一元的に定義する
// 意図: ターン単位で復旧可能な失敗を型で区別し、セッションを落とさない
// 関連ファイル: src/store.rs, src/unit.rs, src/toolchain.rs

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// シェル実行中に発生しうるエラー種別。
///
/// いずれもターン単位で復旧可能であり、セッションを終了させない。
/// 子プロセスの非ゼロ終了はエラーではなく `ExitStatus` として返すため
/// ここには含めない。
#[derive(Debug, Error)]
pub enum ShellError {
    /// グローバルコードバッファの上限超過。store は変更されない。
    #[error("グローバルコードが上限 {limit} バイトを超えます (現在 {used}, 追加 {requested})")]
    CapacityExceeded {
        used: usize,
        requested: usize,
        limit: usize,
    },
    /// 組み立てたコンパイル単位が上限超過。単位は生成されない。
    #[error("コンパイル単位が上限 {limit} バイトを超えます (必要 {size})")]
    SizeExceeded { size: usize, limit: usize },
    /// 外部コンパイラがコンパイル単位を拒否した。
    #[error("外部コマンド実行に失敗しました: {command} (status: {status:?})\n{stderr}")]
    CompileFailure {
        command: String,
        status: Option<ExitStatus>,
        stderr: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    pub fn compile_failure(
        command: impl Into<String>,
        status: Option<ExitStatus>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CompileFailure {
            command: command.into(),
            status,
            stderr: stderr.into(),
        }
    }
}

/// シェル操作の結果を表す型。
pub type ShellResult<T> = Result<T, ShellError>;
