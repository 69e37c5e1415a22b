// パス: src/repl/printer.rs
// 役割: バナー・ヘルプなど対話時の定型メッセージ描画を集約する
// 意図: ユーザー向け表示を一箇所にまとめ、コマンド間で体裁を統一する
// 関連ファイル: src/repl/cmd.rs, src/classify.rs
//! REPL の定型メッセージ。

use std::io::{self, Write};

const HELP_TEXT: &str = concat!(
    "利用可能なコマンド:\n",
    "  help               ヘルプ（本メッセージ）\n",
    "  show               現在のグローバルコードを表示\n",
    "  clear              グローバルコードを消去\n",
    "  history            入力履歴を表示\n",
    "  exit / quit        終了\n",
    "\n",
    "入力の扱い:\n",
    "  int x = 10;        型キーワードで始まる宣言はグローバルコードへ蓄積\n",
    "  int sq(int n) { return n * n; }\n",
    "                     関数定義も同様に蓄積\n",
    "  printf(\"%d\\n\", x); 文は main に包んで一度だけ実行\n",
    "  1 + 2 * 3          裸の算術式は倍精度で評価して表示\n",
);

const BANNER: &str = concat!(
    "C-Shell (Rust) :: C の断片を逐次コンパイルして実行します\n",
    "help でコマンド一覧 :: exit / quit で終了\n",
);

/// 起動バナーを任意のライターへ描画する。
pub(crate) fn render_banner<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(BANNER.as_bytes())
}

/// ヘルプメッセージを任意のライターへ描画する。
pub(crate) fn render_help<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(HELP_TEXT.as_bytes())
}
