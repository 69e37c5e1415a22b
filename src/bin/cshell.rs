// パス: src/bin/cshell.rs
// 役割: 対話シェルを起動するコマンドラインエントリポイント
// 意図: 本体ロジックはライブラリ側へ寄せ、バイナリは起動だけにする
// 関連ファイル: src/repl/cmd.rs, src/lib.rs
//! `cshell-repl` 実行ファイル。

fn main() {
    cshell::run_repl();
}
