//! Clockify API のレスポンスモデル。
//!
//! 利用するフィールドのみを定義し、未知のフィールドは無視する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API キーの所有ユーザー。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// 現在アクティブなワークスペース ID
    pub active_workspace: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// 1 件のタイムエントリ。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub time_interval: TimeInterval,
}

/// エントリの計測区間。
///
/// `duration` は ISO 8601 形式（例: `PT1H7M23S`）。計測中のエントリでは存在しない。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TimeInterval {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<String>,
}
