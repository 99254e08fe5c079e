//! Clockify のタイムログをデイリーノートに書き込む機能を提供する。
//!
//! 日ごとにエントリを取得して引用ブロックに整形し、
//! `{vault}/{YYYY-MM-DD}.md` の管理ブロックを差し替える。

mod duration;
mod format;
mod inject;
mod names;
mod sync;
mod vault;
mod window;

pub use sync::DailySyncer;

use names::NameMaps;
use window::DayWindow;

use chrono::NaiveDate;
use chrono_tz::Tz;

/// タイムゾーン `tz` での現在の日付を取得する。
pub fn today_in(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}
