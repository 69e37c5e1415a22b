// パス: src/classify.rs
// 役割: 入力 1 行をカテゴリへ分類する規則を実装する
// 意図: ヒューリスティックを明示的な全域関数に閉じ込め、規則順を契約として固定する
// 関連ファイル: src/repl/cmd.rs, src/unit.rs, src/store.rs
//! 入力行の分類器。
//!
//! C の構文解析は行わず、接頭辞と文字集合による近似で
//! 宣言・式・文・メタコマンドの 4 系統へ振り分ける。
//! 規則は先勝ちの優先順で適用され、どの入力もちょうど 1 つの
//! カテゴリに写る（全域・決定的）。順序そのものが契約であり、
//! 宣言判定を式判定より先に置くことで「演算子を含む宣言」の
//! 曖昧さを解決している。

/// メタコマンドの種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    /// `help` でコマンド一覧を表示する。
    Help,
    /// `clear` でグローバルコードを消去する。
    Clear,
    /// `show` でグローバルコードを表示する。
    Show,
    /// `history` で入力履歴を表示する。
    History,
    /// `exit` / `quit` でセッションを終了する。
    Exit,
    /// 空行。何もしない。
    Empty,
}

/// 入力 1 行が属するカテゴリ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// グローバルコードへ蓄積する宣言（変数・関数定義・プロトタイプ）。
    Declaration,
    /// 評価して数値を表示する裸の算術式。
    Expression,
    /// 合成エントリポイント内で一度だけ実行する文。
    Statement,
    /// セッション操作のメタコマンド。
    Meta(MetaKind),
}

/// 宣言判定に用いる C の型キーワード。
const TYPE_KEYWORDS: [&str; 8] = [
    "int", "float", "double", "char", "void", "long", "short", "unsigned",
];

/// 式判定に用いる算術演算子の文字集合。
const ARITHMETIC_OPS: [char; 5] = ['+', '-', '*', '/', '%'];

/// 入力 1 行を分類する。副作用なし・決定的・全域。
#[must_use]
pub fn classify(line: &str) -> Category {
    let trimmed = line.trim();

    // 規則 1: メタコマンドと空行の完全一致（大文字小文字を区別）。
    match trimmed {
        "" => return Category::Meta(MetaKind::Empty),
        "help" => return Category::Meta(MetaKind::Help),
        "clear" => return Category::Meta(MetaKind::Clear),
        "show" => return Category::Meta(MetaKind::Show),
        "history" => return Category::Meta(MetaKind::History),
        "exit" | "quit" => return Category::Meta(MetaKind::Exit),
        _ => {}
    }

    // 規則 2/3: 型キーワードで始まり `{` か `;` を含むなら宣言。
    if starts_with_type_keyword(trimmed) && (trimmed.contains('{') || trimmed.contains(';')) {
        return Category::Declaration;
    }

    // 規則 4: 演算子を含み、`;` も `(` も含まないなら裸の式。
    if trimmed.contains(&ARITHMETIC_OPS[..]) && !trimmed.contains(';') && !trimmed.contains('(') {
        return Category::Expression;
    }

    // 規則 5: 残りはすべて文として扱う。
    Category::Statement
}

/// 行頭が型キーワード + 空白で始まるかを判定する。
fn starts_with_type_keyword(trimmed: &str) -> bool {
    TYPE_KEYWORDS.iter().any(|kw| {
        trimmed
            .strip_prefix(kw)
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_whitespace()))
    })
}
