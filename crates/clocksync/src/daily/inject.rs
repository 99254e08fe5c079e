//! デイリーノートの管理ブロックを差し替える。

use chrono::NaiveDate;

use super::format::{QUOTE_PREFIX, SENTINEL};

/// 新規ファイルの初期内容（`# DD.MM.YYYY`）。
///
/// 見出しとブロックの間の空行は [`inject`] が追加する。
pub fn seed_content(date: NaiveDate) -> String {
    format!("# {}\n", date.format("%d.%m.%Y"))
}

/// 既存の管理ブロックを取り除き、空行 1 行に続けて新しいブロックを末尾に追加した内容を返す。
///
/// 最初に現れた [`SENTINEL`] 行と、それに続く引用行の連続を既存ブロックとみなす。
/// その直前の空行 1 行は前回追加した区切りなので一緒に取り除く。
/// それ以外の行はそのまま残す。
///
/// 行は [`str::lines`] で分割するため、`\r\n` の改行は `\n` に変換され、
/// 出力は常に `\n` で終わる。
pub fn inject(existing: &str, block: &[String]) -> String {
    let mut kept: Vec<&str> = existing.lines().collect();

    if let Some(sentinel) = kept.iter().position(|line| *line == SENTINEL) {
        let len = kept[sentinel + 1..]
            .iter()
            .take_while(|line| line.starts_with(QUOTE_PREFIX))
            .count();
        let start = match sentinel.checked_sub(1) {
            Some(prev) if kept[prev].is_empty() => prev,
            _ => sentinel,
        };
        kept.drain(start..=sentinel + len);
    }

    let mut content = String::with_capacity(existing.len());
    for line in kept {
        content.push_str(line);
        content.push('\n');
    }
    content.push('\n');
    for line in block {
        content.push_str(line);
        content.push('\n');
    }
    content
}
