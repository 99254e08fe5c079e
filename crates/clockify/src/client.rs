//! Clockify REST API クライアント。

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{ClockifyError, Result};
use crate::models::{Project, Task, TimeEntry, User};

pub const DEFAULT_BASE_URL: &str = "https://api.clockify.me/api/v1";

const API_KEY_HEADER: &str = "X-Api-Key";
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// 失敗したリクエストの再試行方針。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 初回を含む最大試行回数
    pub max_attempts: u32,
    /// 1 回目の再試行までの待ち時間（以降は倍々に伸びる）
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// `attempt` 回目（1 始まり）の失敗後に待つ時間を返す。
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1 << exponent)
            .min(MAX_BACKOFF)
    }
}

/// クライアントの接続設定。
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

pub struct ClockifyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl ClockifyClient {
    /// 新しい ClockifyClient を作成する。
    pub fn new(api_key: impl Into<String>, options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("clockify-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry: options.retry,
        })
    }

    /// API キーの所有ユーザーを取得する。
    pub async fn current_user(&self) -> Result<User> {
        self.get("/user", &[]).await
    }

    /// ワークスペースのプロジェクト一覧を取得する。
    pub async fn projects(&self, workspace_id: &str) -> Result<Vec<Project>> {
        self.get(&format!("/workspaces/{workspace_id}/projects"), &[])
            .await
    }

    /// プロジェクトのタスク一覧を取得する。
    pub async fn tasks(&self, workspace_id: &str, project_id: &str) -> Result<Vec<Task>> {
        self.get(
            &format!("/workspaces/{workspace_id}/projects/{project_id}/tasks"),
            &[],
        )
        .await
    }

    /// 指定区間に開始したユーザーのタイムエントリを取得する。
    ///
    /// `start` / `end` は `Z` 付きの ISO 8601 (UTC) 文字列で渡す。
    pub async fn time_entries(
        &self,
        workspace_id: &str,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<TimeEntry>> {
        self.get(
            &format!("/workspaces/{workspace_id}/user/{user_id}/time-entries"),
            &[("start", start), ("end", end)],
        )
        .await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET リクエストを送信し、再試行可能なエラーは方針に従って再送する。
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.get_once(path, query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        path,
                        attempt,
                        delay = %humantime::format_duration(delay),
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http
            .get(self.endpoint(path))
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClockifyError::Unauthorized);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClockifyError::Status { status, body });
        }

        tracing::debug!(path, status = %status, size = body.len(), "Clockify response");

        Ok(serde_json::from_str(&body)?)
    }
}
