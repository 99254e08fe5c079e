//! Clockify が返す ISO 8601 形式の経過時間 (`PT1H7M23S`) を扱う。

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("duration regex is valid")
});

/// 時・分・秒の組。各値は正規化されない（`PT90M` は 0 時間 90 分のまま）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hms {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Hms {
    /// 秒数から正規化された時・分・秒を作る。
    pub fn from_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: total % 3600 / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }
}

/// `hh:mm:ss` 形式。時間は 2 桁を超えても折り返さない。
impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// 経過時間文字列の解析結果。
///
/// 文法に一致しない文字列はエラーにせず `Verbatim` としてそのまま保持する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDuration<'a> {
    /// 空文字列または値なし
    Empty,
    Parsed(Hms),
    /// 文法に一致しなかった入力
    Verbatim(&'a str),
}

impl ParsedDuration<'_> {
    /// 合計時間の集計に使う秒数。`Verbatim` は 0 秒として扱う。
    pub fn as_seconds(&self) -> u64 {
        match self {
            ParsedDuration::Parsed(hms) => hms.total_seconds(),
            ParsedDuration::Empty | ParsedDuration::Verbatim(_) => 0,
        }
    }
}

impl fmt::Display for ParsedDuration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedDuration::Empty => fmt::Display::fmt(&Hms::default(), f),
            ParsedDuration::Parsed(hms) => fmt::Display::fmt(hms, f),
            ParsedDuration::Verbatim(raw) => f.write_str(raw),
        }
    }
}

/// `PT(<h>H)?(<m>M)?(<s>S)?` 形式の経過時間を解析する。
pub fn parse_duration(raw: Option<&str>) -> ParsedDuration<'_> {
    let raw = match raw {
        None | Some("") => return ParsedDuration::Empty,
        Some(raw) => raw,
    };

    let Some(caps) = DURATION_RE.captures(raw) else {
        return ParsedDuration::Verbatim(raw);
    };

    let component = |i: usize| -> Option<u64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    match (component(1), component(2), component(3)) {
        (Some(hours), Some(minutes), Some(seconds)) => ParsedDuration::Parsed(Hms {
            hours,
            minutes,
            seconds,
        }),
        // u64 に収まらない桁数
        _ => ParsedDuration::Verbatim(raw),
    }
}

/// 経過時間を `hh:mm:ss` に変換する。解析できない場合は入力をそのまま返す。
pub fn format_duration(raw: Option<&str>) -> String {
    parse_duration(raw).to_string()
}

/// 経過時間を秒数に変換する。解析できない場合は 0。
pub fn duration_seconds(raw: Option<&str>) -> u64 {
    parse_duration(raw).as_seconds()
}
