// パス: src/repl/cmd.rs
// 役割: REPL のメインループと 1 ターン分の分類・振り分け・実行を司る
// 意図: セッション状態を唯一の所有者として管理し、外部連携を注入可能に保つ
// 関連ファイル: src/classify.rs, src/store.rs, src/toolchain.rs, src/repl/printer.rs
//! C-Shell のセッション制御。
//!
//! 1 ターンは「行を読む → 分類する → 宣言ならグローバルコードへ、
//! 式・文ならコンパイル単位を組み立てて外部ツールチェーンへ」の
//! 順で進む。グローバルコードと履歴はこのモジュールの
//! `ReplSession` だけが変更する。ターン内の失敗はすべて
//! メッセージとして報告され、セッションは継続する。

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::classify::{classify, Category, MetaKind};
use crate::history::HistoryLog;
use crate::store::GlobalStore;
use crate::toolchain::{GccToolchain, Toolchain};
use crate::unit::{build_unit, FragmentKind};

use super::printer::{render_banner, render_help};

/// 対話セッションを開始し、ユーザー入力を処理し続ける。
///
/// # Examples
/// ```no_run
/// # fn main() {
/// cshell::repl::run_repl();
/// # }
/// ```
pub fn run_repl() {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut editor = match LineReader::new() {
        Ok(editor) => editor,
        Err(err) => {
            let _ = writeln!(stderr, "ラインエディタの初期化に失敗しました: {}", err);
            return;
        }
    };
    let mut toolchain = GccToolchain::new();
    if let Err(err) = run_repl_with(&mut editor, &mut toolchain, &mut stdout, &mut stderr) {
        let _ = writeln!(stderr, "REPL 実行中にエラーが発生しました: {}", err);
    }
}

/// 行入力が返す 3 種類の結果を表す列挙体。
pub(crate) enum ReadResult {
    Line(String),
    Eof,
    Interrupted,
}

/// REPL に必要な最小限の行入力抽象。
pub(crate) trait ReplLineSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadResult>;
    fn add_history(&mut self, entry: &str);
    fn save_history(&mut self) -> io::Result<()>;
}

/// rustyline を用いた標準の行入力実装。
///
/// エディタ自身の永続履歴（上矢印で辿るもの）はここで管理し、
/// `history` コマンドが表示するセッション内の `HistoryLog` とは
/// 独立している。
struct LineReader {
    editor: rustyline::DefaultEditor,
    history_path: Option<PathBuf>,
}

impl LineReader {
    fn new() -> rustyline::Result<Self> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let history_path = history_path();
        if let Some(path) = &history_path {
            // 初回起動などファイルが無い場合は黙って続行する。
            let _ = editor.load_history(path);
        }
        Ok(Self {
            editor,
            history_path,
        })
    }
}

/// 永続履歴ファイルの保存場所を環境変数とホームから決定する。
fn history_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("CSHELL_HISTORY_FILE") {
        return Some(PathBuf::from(path));
    }
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .map(|home| home.join(".cshell_history"))
}

impl ReplLineSource for LineReader {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(rustyline::error::ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(rustyline::error::ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(err) => Err(io::Error::new(io::ErrorKind::Other, err)),
        }
    }

    fn add_history(&mut self, entry: &str) {
        let _ = self.editor.add_history_entry(entry);
    }

    fn save_history(&mut self) -> io::Result<()> {
        let Some(path) = &self.history_path else {
            return Ok(());
        };
        self.editor
            .save_history(path)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    }
}

/// セッションがユーザーへ返す応答メッセージのカテゴリ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplMsg {
    Out(String),
    Err(String),
}

/// グローバルコードと入力履歴をまとめて保持するセッション状態。
///
/// 両者を変更するのはこの構造体のメソッドのみ。別セッションを
/// 並走させたい場合はもう 1 つ `ReplSession` を作ればよい。
#[derive(Debug, Clone, Default)]
pub struct ReplSession {
    store: GlobalStore,
    history: HistoryLog,
}

impl ReplSession {
    /// 空の状態でセッションを構築する。
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: GlobalStore::new(),
            history: HistoryLog::new(),
        }
    }

    /// 現在のグローバルコードを参照する。
    #[must_use]
    pub fn global_code(&self) -> &str {
        self.store.snapshot()
    }

    /// 入力 1 行を分類して処理し、出力メッセージを返す。
    ///
    /// `help` と `exit` はループ側で先に処理される前提のため
    /// ここでは空応答を返す。空行も何もしない。
    pub fn execute_line<T: Toolchain>(&mut self, line: &str, toolchain: &mut T) -> Vec<ReplMsg> {
        let line = line.trim();
        match classify(line) {
            Category::Meta(MetaKind::Empty)
            | Category::Meta(MetaKind::Help)
            | Category::Meta(MetaKind::Exit) => Vec::new(),
            Category::Meta(MetaKind::Clear) => {
                self.store.clear();
                vec![ReplMsg::Out("グローバルコードを消去しました".into())]
            }
            Category::Meta(MetaKind::Show) => {
                if self.store.is_empty() {
                    vec![ReplMsg::Out("(グローバルコードは空です)".into())]
                } else {
                    vec![ReplMsg::Out(format!(
                        "現在のグローバルコード:\n{}",
                        self.store.snapshot()
                    ))]
                }
            }
            Category::Meta(MetaKind::History) => {
                if self.history.is_empty() {
                    return vec![ReplMsg::Out("(履歴はありません)".into())];
                }
                let mut msgs = vec![ReplMsg::Out("入力履歴:".into())];
                for (idx, entry) in self.history.iter().enumerate() {
                    msgs.push(ReplMsg::Out(format!("  {}: {}", idx + 1, entry)));
                }
                msgs
            }
            Category::Declaration => {
                self.history.record(line);
                match self.store.append(line) {
                    Ok(()) => vec![ReplMsg::Out("グローバルコードへ追加しました".into())],
                    Err(err) => vec![ReplMsg::Err(err.to_string())],
                }
            }
            Category::Expression => {
                self.history.record(line);
                self.dispatch(line, FragmentKind::Expression, toolchain)
            }
            Category::Statement => {
                self.history.record(line);
                self.dispatch(line, FragmentKind::Statement, toolchain)
            }
        }
    }

    /// コンパイル単位を組み立てて外部ツールチェーンへ渡す。
    fn dispatch<T: Toolchain>(
        &mut self,
        fragment: &str,
        kind: FragmentKind,
        toolchain: &mut T,
    ) -> Vec<ReplMsg> {
        let unit = match build_unit(self.store.snapshot(), fragment, kind) {
            Ok(unit) => unit,
            Err(err) => return vec![ReplMsg::Err(err.to_string())],
        };
        let artifact = match toolchain.compile(&unit) {
            Ok(artifact) => artifact,
            Err(err) => {
                return vec![ReplMsg::Err(format!("コンパイルエラー: {}", err))];
            }
        };
        match toolchain.run(&artifact) {
            Ok(status) if status.success() => Vec::new(),
            // 非ゼロ終了は情報として報告するだけで、セッションは継続する。
            Ok(status) => match status.code() {
                Some(code) => vec![ReplMsg::Err(format!(
                    "実行が終了コード {} で終了しました",
                    code
                ))],
                None => vec![ReplMsg::Err("実行がシグナルで停止しました".into())],
            },
            Err(err) => vec![ReplMsg::Err(format!("実行に失敗しました: {}", err))],
        }
    }
}

/// メッセージ列を標準出力・標準エラーへ振り分ける。
fn dispatch_messages<W: Write, E: Write>(
    msgs: Vec<ReplMsg>,
    out: &mut W,
    err: &mut E,
) -> io::Result<()> {
    for msg in msgs {
        match msg {
            ReplMsg::Out(s) => writeln!(out, "{}", s)?,
            ReplMsg::Err(s) => writeln!(err, "{}", s)?,
        }
    }
    Ok(())
}

fn run_repl_with<S, T, W, E>(
    source: &mut S,
    toolchain: &mut T,
    out: &mut W,
    err: &mut E,
) -> io::Result<()>
where
    S: ReplLineSource,
    T: Toolchain,
    W: Write,
    E: Write,
{
    render_banner(out)?;
    let mut session = ReplSession::new();

    loop {
        let line = match source.read_line("C>>> ") {
            Ok(ReadResult::Line(line)) => line,
            Ok(ReadResult::Eof) => {
                writeln!(out)?;
                break;
            }
            Ok(ReadResult::Interrupted) => continue,
            Err(e) => {
                writeln!(err, "入力エラー: {}", e)?;
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        source.add_history(input);

        match classify(input) {
            Category::Meta(MetaKind::Help) => {
                render_help(out)?;
                continue;
            }
            Category::Meta(MetaKind::Exit) => {
                writeln!(out, "さようなら")?;
                break;
            }
            _ => {
                let msgs = session.execute_line(input, toolchain);
                dispatch_messages(msgs, out, err)?;
            }
        }
    }

    if let Err(e) = source.save_history() {
        writeln!(err, "ヒストリーの保存に失敗しました: {}", e)?;
    }
    // 終了経路に関わらず一時成果物を片付ける。失敗は致命的にしない。
    if let Err(e) = toolchain.cleanup() {
        writeln!(err, "一時ファイルの削除に失敗しました: {}", e)?;
    }

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use std::io;

    use super::{
        dispatch_messages, run_repl_with, ReadResult, ReplLineSource, ReplMsg, ReplSession,
    };
    use crate::errors::{ShellError, ShellResult};
    use crate::toolchain::{Artifact, Toolchain};

    /// コンパイル・実行呼び出しを記録するテスト用のモック実装。
    #[derive(Default)]
    struct MockToolchain {
        compiled_units: Vec<String>,
        run_count: usize,
        cleaned: bool,
        fail_compile_with: Option<String>,
        run_exit_code: i32,
    }

    impl MockToolchain {
        fn new() -> Self {
            Self::default()
        }

        fn failing_compile(stderr: &str) -> Self {
            Self {
                fail_compile_with: Some(stderr.to_string()),
                ..Self::default()
            }
        }

        fn with_run_exit_code(code: i32) -> Self {
            Self {
                run_exit_code: code,
                ..Self::default()
            }
        }
    }

    fn exit_status(code: i32) -> std::process::ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code << 8)
    }

    impl Toolchain for MockToolchain {
        fn compile(&mut self, unit: &str) -> ShellResult<Artifact> {
            if let Some(stderr) = &self.fail_compile_with {
                return Err(ShellError::compile_failure("mock-cc", None, stderr.clone()));
            }
            self.compiled_units.push(unit.to_string());
            // パスは実在しなくてよい。run もモックが受けるため。
            Ok(mock_artifact())
        }

        fn run(&mut self, _artifact: &Artifact) -> ShellResult<std::process::ExitStatus> {
            self.run_count += 1;
            Ok(exit_status(self.run_exit_code))
        }

        fn cleanup(&mut self) -> io::Result<()> {
            self.cleaned = true;
            Ok(())
        }
    }

    fn mock_artifact() -> Artifact {
        Artifact::new("/nonexistent/unit_bin")
    }

    fn outs(msgs: &[ReplMsg]) -> Vec<&str> {
        msgs.iter()
            .filter_map(|m| match m {
                ReplMsg::Out(s) => Some(s.as_str()),
                ReplMsg::Err(_) => None,
            })
            .collect()
    }

    fn first_err(msgs: &[ReplMsg]) -> Option<&str> {
        msgs.iter().find_map(|m| match m {
            ReplMsg::Err(s) => Some(s.as_str()),
            ReplMsg::Out(_) => None,
        })
    }

    #[test]
    /// 宣言がグローバルコードへ入り、コンパイルが走らないことを確認する。
    fn declaration_is_stored_without_dispatch() {
        let mut session = ReplSession::new();
        let mut tc = MockToolchain::new();
        let msgs = session.execute_line("int x = 10;", &mut tc);
        assert!(outs(&msgs)
            .iter()
            .any(|s| s.contains("グローバルコードへ追加しました")));
        assert!(session.global_code().contains("int x = 10;"));
        assert!(tc.compiled_units.is_empty());
        assert_eq!(tc.run_count, 0);
    }

    #[test]
    /// 文が蓄積済み宣言と合成 main を含む単位になり、compile と run が 1 回ずつ走ることを確認する。
    fn statement_unit_contains_stored_declarations() {
        let mut session = ReplSession::new();
        let mut tc = MockToolchain::new();
        session.execute_line("int x = 10;", &mut tc);
        let msgs = session.execute_line("printf(\"%d\", x);", &mut tc);
        assert!(msgs.is_empty(), "unexpected: {:?}", msgs);

        assert_eq!(tc.compiled_units.len(), 1);
        assert_eq!(tc.run_count, 1);
        let unit = &tc.compiled_units[0];
        assert!(unit.contains("int x = 10;"));
        assert!(unit.contains("int main() {\nprintf(\"%d\", x);\n"));
        assert!(unit.contains("#include <stdio.h>"));
    }

    #[test]
    /// 裸の式が倍精度キャストの printf に包まれることを確認する。
    fn expression_is_wrapped_for_printing() {
        let mut session = ReplSession::new();
        let mut tc = MockToolchain::new();
        let msgs = session.execute_line("1 + 2 * 3", &mut tc);
        assert!(msgs.is_empty(), "unexpected: {:?}", msgs);
        assert!(tc.compiled_units[0].contains("(double)(1 + 2 * 3)"));
        assert_eq!(tc.run_count, 1);
    }

    #[test]
    /// clear 後に show が空メッセージを返すことを確認する。
    fn clear_then_show_reports_empty() {
        let mut session = ReplSession::new();
        let mut tc = MockToolchain::new();
        session.execute_line("int x = 10;", &mut tc);
        assert!(!session.global_code().is_empty());

        let msgs = session.execute_line("clear", &mut tc);
        assert!(outs(&msgs).iter().any(|s| s.contains("消去しました")));
        assert_eq!(session.global_code(), "");

        let msgs = session.execute_line("show", &mut tc);
        assert!(outs(&msgs)
            .iter()
            .any(|s| s.contains("グローバルコードは空です")));
    }

    #[test]
    /// show がグローバルコードを変更しないことを確認する。
    fn show_does_not_mutate_store() {
        let mut session = ReplSession::new();
        let mut tc = MockToolchain::new();
        session.execute_line("int x = 1;", &mut tc);
        let before = session.global_code().to_string();
        session.execute_line("show", &mut tc);
        session.execute_line("show", &mut tc);
        assert_eq!(session.global_code(), before);
    }

    #[test]
    /// コンパイル失敗時に run が走らず、セッション状態も変化しないことを確認する。
    fn compile_error_skips_run_and_keeps_state() {
        let mut session = ReplSession::new();
        let mut tc = MockToolchain::failing_compile("unit.c:7: error: expected ';'");
        session.execute_line("int x = 1;", &mut tc);
        let globals_before = session.global_code().to_string();

        let msgs = session.execute_line("printf(\"%d\", x)", &mut tc);
        let err = first_err(&msgs).expect("compile error message expected");
        assert!(err.contains("コンパイルエラー"), "{err}");
        assert!(err.contains("expected ';'"), "{err}");
        assert_eq!(tc.run_count, 0);
        assert_eq!(session.global_code(), globals_before);

        // 失敗後も次のターンは普通に処理される。
        let msgs = session.execute_line("show", &mut tc);
        assert!(!msgs.is_empty());
    }

    #[test]
    /// 非ゼロ終了コードが情報として報告され、致命的でないことを確認する。
    fn nonzero_exit_is_reported_not_fatal() {
        let mut session = ReplSession::new();
        let mut tc = MockToolchain::with_run_exit_code(3);
        let msgs = session.execute_line("exit(3);", &mut tc);
        let err = first_err(&msgs).expect("exit status message expected");
        assert!(err.contains("終了コード 3"), "{err}");

        // セッションは継続できる。
        let msgs = session.execute_line("history", &mut tc);
        assert!(!msgs.is_empty());
    }

    #[test]
    /// 履歴に非メタ行だけが 1 始まりで並ぶことを確認する。
    fn history_lists_non_meta_lines_in_order() {
        let mut session = ReplSession::new();
        let mut tc = MockToolchain::failing_compile("stub");
        session.execute_line("int x = 1;", &mut tc);
        session.execute_line("1 + 2", &mut tc);
        session.execute_line("show", &mut tc);
        session.execute_line("", &mut tc);

        let msgs = session.execute_line("history", &mut tc);
        let rendered = outs(&msgs).join("\n");
        assert!(rendered.contains("1: int x = 1;"));
        assert!(rendered.contains("2: 1 + 2"));
        assert!(!rendered.contains("show"));
    }

    #[test]
    /// 容量超過の宣言が拒否され、既存内容が保たれることを確認する。
    fn capacity_exceeded_reports_error_and_keeps_store() {
        let mut session = ReplSession::new();
        let mut tc = MockToolchain::new();
        let big = format!("int a[] = {{{}}};", "1,".repeat(5000));
        let msgs = session.execute_line(&big, &mut tc);
        let err = first_err(&msgs).expect("capacity error expected");
        assert!(err.contains("上限"), "{err}");
        assert_eq!(session.global_code(), "");
    }

    /// スクリプトされた行を順に返すテスト用の行入力。
    struct ScriptedLineSource {
        events: std::collections::VecDeque<ScriptEvent>,
        history: Vec<String>,
        saved: bool,
    }

    enum ScriptEvent {
        Line(&'static str),
        Eof,
    }

    impl ScriptedLineSource {
        fn new(events: impl IntoIterator<Item = ScriptEvent>) -> Self {
            Self {
                events: events.into_iter().collect(),
                history: Vec::new(),
                saved: false,
            }
        }
    }

    impl ReplLineSource for ScriptedLineSource {
        fn read_line(&mut self, _prompt: &str) -> io::Result<ReadResult> {
            match self.events.pop_front().unwrap_or(ScriptEvent::Eof) {
                ScriptEvent::Line(s) => Ok(ReadResult::Line(s.to_string())),
                ScriptEvent::Eof => Ok(ReadResult::Eof),
            }
        }

        fn add_history(&mut self, entry: &str) {
            self.history.push(entry.to_string());
        }

        fn save_history(&mut self) -> io::Result<()> {
            self.saved = true;
            Ok(())
        }
    }

    #[test]
    /// スクリプト駆動でループ全体を通し、終了時に cleanup が走ることを確認する。
    fn run_repl_with_script_executes_turns_and_cleans_up() {
        let events = vec![
            ScriptEvent::Line("help"),
            ScriptEvent::Line("int x = 10;"),
            ScriptEvent::Line("show"),
            ScriptEvent::Line("printf(\"%d\\n\", x);"),
            ScriptEvent::Line("exit"),
            ScriptEvent::Eof,
        ];
        let mut script = ScriptedLineSource::new(events);
        let mut tc = MockToolchain::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        run_repl_with(&mut script, &mut tc, &mut out, &mut err).unwrap();

        let stdout = String::from_utf8(out).unwrap();
        assert!(stdout.contains("C-Shell (Rust)"));
        assert!(stdout.contains("利用可能なコマンド"));
        assert!(stdout.contains("グローバルコードへ追加しました"));
        assert!(stdout.contains("int x = 10;"));
        assert!(stdout.contains("さようなら"));
        assert_eq!(tc.compiled_units.len(), 1);
        assert_eq!(tc.run_count, 1);
        assert!(tc.cleaned);
        assert!(script.saved);
        assert!(script.history.iter().any(|h| h == "int x = 10;"));
        assert!(err.is_empty(), "stderr: {}", String::from_utf8(err).unwrap());
    }

    #[test]
    /// EOF でも cleanup と履歴保存が行われることを確認する。
    fn run_repl_with_eof_still_cleans_up() {
        let mut script = ScriptedLineSource::new(vec![ScriptEvent::Eof]);
        let mut tc = MockToolchain::new();
        let mut out = Vec::new();
        let mut err = Vec::new();
        run_repl_with(&mut script, &mut tc, &mut out, &mut err).unwrap();
        assert!(tc.cleaned);
        assert!(script.saved);
    }

    #[test]
    /// メッセージ列が出力先ごとに振り分けられることを確認する。
    fn dispatch_messages_routes_by_kind() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        dispatch_messages(
            vec![ReplMsg::Out("a".into()), ReplMsg::Err("b".into())],
            &mut out,
            &mut err,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\n");
        assert_eq!(String::from_utf8(err).unwrap(), "b\n");
    }
}
