// パス: src/toolchain.rs
// 役割: 外部コンパイラの呼び出しと生成バイナリの実行を抽象化する
// 意図: 遅く信頼できない境界をトレイトへ隔離し、コア側を外部プロセスなしでテスト可能にする
// 関連ファイル: src/repl/cmd.rs, src/unit.rs, src/errors.rs
//! 外部ツールチェーン連携。
//!
//! コアが環境へ要求するのは「単位をコンパイルして成果物を得る」
//! 「成果物を実行して終了ステータスを得る」「セッション終了時に
//! 片付ける」の 3 操作のみ。`GccToolchain` が gcc と一時
//! ディレクトリでこれを実装する。呼び出しは同期・ブロッキングで、
//! タイムアウトは設けない。

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use tempfile::TempDir;

use crate::errors::{ShellError, ShellResult};

/// コンパイラ実行ファイルを上書きする環境変数。
const COMPILER_ENV: &str = "CSHELL_CC";

/// 既定のコンパイラコマンド。
const DEFAULT_COMPILER: &str = "gcc";

/// コンパイル済み成果物へのハンドル。
#[derive(Debug, Clone)]
pub struct Artifact {
    path: PathBuf,
}

impl Artifact {
    /// 実行可能ファイルのパスから成果物ハンドルを作る。
    /// 独自の `Toolchain` 実装が成果物を返す際に使う。
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// コアが外部環境へ要求する 3 操作。
pub trait Toolchain {
    /// 自己完結なコンパイル単位から実行可能な成果物を生成する。
    /// 過去の成果物に依存も変更もしない。
    fn compile(&mut self, unit: &str) -> ShellResult<Artifact>;

    /// 成果物を完了まで実行し、終了ステータスを返す。
    /// 子プロセスの stdout/stderr は呼び出し側のストリームを継承する。
    fn run(&mut self, artifact: &Artifact) -> ShellResult<ExitStatus>;

    /// セッション終了時に一時成果物を削除する。ベストエフォート。
    fn cleanup(&mut self) -> io::Result<()>;
}

/// gcc と一時ディレクトリによる標準実装。
///
/// 一時ディレクトリはセッションで 1 つを遅延生成し、各ターンは
/// その中の固定名 `unit.c` / `unit_bin` を書き換える。単位テキストは
/// 毎回全体を書き直すため、コンパイルが過去の成果物へ依存することはない。
pub struct GccToolchain {
    compiler: String,
    work_dir: Option<TempDir>,
}

impl GccToolchain {
    /// `CSHELL_CC` があればそれを、なければ gcc を使う実装を生成する。
    #[must_use]
    pub fn new() -> Self {
        let compiler = env::var(COMPILER_ENV).unwrap_or_else(|_| DEFAULT_COMPILER.to_string());
        Self::with_compiler(compiler)
    }

    /// コンパイラコマンドを指定して生成する（テスト向け）。
    #[must_use]
    pub fn with_compiler(compiler: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
            work_dir: None,
        }
    }

    fn work_dir(&mut self) -> io::Result<&TempDir> {
        let dir = match self.work_dir.take() {
            Some(dir) => dir,
            None => TempDir::new()?,
        };
        Ok(self.work_dir.insert(dir))
    }
}

impl Default for GccToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolchain for GccToolchain {
    fn compile(&mut self, unit: &str) -> ShellResult<Artifact> {
        let (src_path, bin_path) = {
            let dir = self.work_dir()?;
            (dir.path().join("unit.c"), dir.path().join("unit_bin"))
        };
        fs::write(&src_path, unit)?;

        let mut cmd = Command::new(&self.compiler);
        cmd.arg("-o").arg(&bin_path).arg(&src_path);
        match cmd.output() {
            Ok(out) if out.status.success() => Ok(Artifact { path: bin_path }),
            Ok(out) => Err(ShellError::compile_failure(
                format!("{} -o {} {}", self.compiler, bin_path.display(), src_path.display()),
                Some(out.status),
                String::from_utf8_lossy(&out.stderr).into_owned(),
            )),
            Err(err) => Err(ShellError::compile_failure(
                self.compiler.clone(),
                None,
                format!("コンパイラを起動できません: {err}"),
            )),
        }
    }

    fn run(&mut self, artifact: &Artifact) -> ShellResult<ExitStatus> {
        // 標準入出力を継承したまま完了を待つ。
        let status = Command::new(artifact.path()).status()?;
        Ok(status)
    }

    fn cleanup(&mut self) -> io::Result<()> {
        match self.work_dir.take() {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}
