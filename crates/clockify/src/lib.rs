//! Clockify REST API の最小限のクライアント。
//!
//! ユーザー情報・プロジェクト・タスク・タイムエントリの取得のみをサポートする。
//! すべてのリクエストは `X-Api-Key` ヘッダーで認証する。

mod client;
mod error;
pub mod models;

pub use client::{ClientOptions, ClockifyClient, DEFAULT_BASE_URL, RetryPolicy};
pub use error::{ClockifyError, Result};
pub use models::{Project, Task, TimeEntry, TimeInterval, User};
pub use reqwest::StatusCode;
