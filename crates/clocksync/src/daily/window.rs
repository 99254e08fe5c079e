//! ローカルの 1 日を UTC の時刻範囲に変換する。

use anyhow::{Context as _, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone as _, Utc};
use chrono_tz::Tz;

/// ローカル日付の 0:00 から 23:59:59 までを表す UTC の範囲。終端を含む。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// `date` をタイムゾーン `tz` の 1 日として UTC の範囲を求める。
    ///
    /// 夏時間の切り替え日は 23 時間または 25 時間の範囲になる。
    pub fn compute(date: NaiveDate, tz: Tz) -> Result<Self> {
        let next = date
            .succ_opt()
            .with_context(|| format!("Date out of range: {date}"))?;

        let start = local_day_start(date, tz)?;
        let end = local_day_start(next, tz)? - TimeDelta::seconds(1);

        Ok(Self { start, end })
    }

    /// API の `start` パラメータ（`Z` 付き ISO 8601）。
    pub fn start_param(&self) -> String {
        format_utc(&self.start)
    }

    /// API の `end` パラメータ（`Z` 付き ISO 8601）。
    pub fn end_param(&self) -> String {
        format_utc(&self.end)
    }
}

/// ローカル日付の最初の瞬間を UTC で返す。
///
/// 0:00 が夏時間の空白に入る場合はその後の最初の有効な時刻、
/// 重複する場合は早い方を採用する。
fn local_day_start(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);

    (0..=24 * 4)
        .find_map(|quarter| {
            let local = midnight + TimeDelta::minutes(15 * quarter);
            tz.from_local_datetime(&local).earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("No valid local time on {date} in {tz}"))
}

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
