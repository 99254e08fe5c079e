//! タイムエントリを Markdown の引用ブロックに整形する。

use chrono_tz::Tz;
use clockify::TimeEntry;

use super::NameMaps;
use super::duration::{Hms, duration_seconds, format_duration};

/// 管理ブロックの先頭行。既存ブロックの検出にも使う。
pub const SENTINEL: &str = "> [!clockify] Clockify time log";

/// 引用ブロックの行頭。
pub const QUOTE_PREFIX: &str = "> ";

const UNKNOWN_START: &str = "??:??";

/// 描画済みのブロックと、その日の合計時間。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    /// 先頭が [`SENTINEL`]、以降はエントリ 1 件につき 1 行
    pub lines: Vec<String>,
    /// 解析できた経過時間の合計
    pub total: Hms,
}

/// エントリ 1 件を 1 行に整形する。
///
/// `> {project} - {task}: {hh:mm:ss} ({HH:MM}|{description})`
pub fn render_entry(entry: &TimeEntry, names: &NameMaps, tz: Tz) -> String {
    let project = names.project(entry.project_id.as_deref());
    let task = names.task(entry.task_id.as_deref());
    let duration = format_duration(entry.time_interval.duration.as_deref());

    let start = entry.time_interval.start.map_or_else(
        || UNKNOWN_START.to_string(),
        |start| start.with_timezone(&tz).format("%H:%M").to_string(),
    );

    let description = entry.description.as_deref().unwrap_or_default().trim();

    let mut line = format!("{QUOTE_PREFIX}{project} - {task}: {duration} ({start}");
    if !description.is_empty() {
        line.push('|');
        line.push_str(description);
    }
    line.push(')');
    line
}

/// エントリ一覧を API が返した順にブロックへ整形し、合計時間を集計する。
pub fn render_block(entries: &[TimeEntry], names: &NameMaps, tz: Tz) -> RenderedBlock {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(SENTINEL.to_string());

    let mut total_seconds: u64 = 0;
    for entry in entries {
        total_seconds = total_seconds
            .saturating_add(duration_seconds(entry.time_interval.duration.as_deref()));
        lines.push(render_entry(entry, names, tz));
    }

    RenderedBlock {
        lines,
        total: Hms::from_seconds(total_seconds),
    }
}
