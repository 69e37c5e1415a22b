// パス: src/unit.rs
// 役割: プリアンブルと蓄積済み宣言から自己完結なコンパイル単位を組み立てる
// 意図: 毎ターン使い捨ての完全なプログラムテキストを生成し、外部状態への依存を断つ
// 関連ファイル: src/store.rs, src/toolchain.rs, src/repl/cmd.rs
//! コンパイル単位の組み立て。
//!
//! 固定プリアンブル + グローバルコード + 合成エントリポイントを
//! 連結し、1 回のコンパイル・実行サイクルでのみ使われる
//! 完全なプログラムテキストを返す。出力は常に自己完結で、
//! 返されたテキスト以外の状態に依存しない。

use std::fmt::Write;

use crate::errors::{ShellError, ShellResult};

/// すべてのコンパイル単位に前置される固定インクルード群。
pub const PREAMBLE: &str =
    "#include <stdio.h>\n#include <stdlib.h>\n#include <string.h>\n#include <math.h>\n\n";

/// コンパイル単位の既定上限（バイト）。
pub const MAX_UNIT_SIZE: usize = 16384;

/// エントリポイントへ包む断片の種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// 裸の算術式。倍精度へキャストして `%g` で表示する。
    Expression,
    /// そのまま一度だけ実行する文。
    Statement,
}

/// プリアンブル・グローバルコード・断片からコンパイル単位を組み立てる。
///
/// 合計が `MAX_UNIT_SIZE` を超える場合は `SizeExceeded` を返し、
/// 部分的な単位は返さない。
pub fn build_unit(globals: &str, fragment: &str, kind: FragmentKind) -> ShellResult<String> {
    let mut unit = String::with_capacity(PREAMBLE.len() + globals.len() + fragment.len() + 96);
    unit.push_str(PREAMBLE);
    unit.push_str(globals);
    unit.push_str("\nint main() {\n");
    match kind {
        FragmentKind::Statement => {
            unit.push_str(fragment);
            unit.push('\n');
        }
        FragmentKind::Expression => {
            // 整数式でも一律に倍精度で評価結果を表示する。
            let _ = writeln!(unit, "printf(\"Result: %g\\n\", (double)({}));", fragment);
        }
    }
    unit.push_str("return 0;\n}\n");

    if unit.len() > MAX_UNIT_SIZE {
        return Err(ShellError::SizeExceeded {
            size: unit.len(),
            limit: MAX_UNIT_SIZE,
        });
    }
    Ok(unit)
}
