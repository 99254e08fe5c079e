//! Clockify のタイムエントリをデイリーノートに同期する。

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{Days, NaiveDate};
use chrono_tz::Tz;
use clockify::{ClockifyClient, Project, Task, TimeEntry, User};
use tracing::{debug, error, info, warn};

use crate::config::Config;

use super::duration::Hms;
use super::format::render_block;
use super::inject::inject;
use super::vault::{note_path, read_note, write_note};
use super::{DayWindow, NameMaps};

/// 同期に必要な時間管理サービスの操作。
pub trait TimeTracker {
    async fn current_user(&self) -> clockify::Result<User>;

    async fn projects(&self, workspace_id: &str) -> clockify::Result<Vec<Project>>;

    async fn tasks(&self, workspace_id: &str, project_id: &str) -> clockify::Result<Vec<Task>>;

    async fn time_entries(
        &self,
        workspace_id: &str,
        user_id: &str,
        window: &DayWindow,
    ) -> clockify::Result<Vec<TimeEntry>>;
}

impl TimeTracker for ClockifyClient {
    async fn current_user(&self) -> clockify::Result<User> {
        ClockifyClient::current_user(self).await
    }

    async fn projects(&self, workspace_id: &str) -> clockify::Result<Vec<Project>> {
        ClockifyClient::projects(self, workspace_id).await
    }

    async fn tasks(&self, workspace_id: &str, project_id: &str) -> clockify::Result<Vec<Task>> {
        ClockifyClient::tasks(self, workspace_id, project_id).await
    }

    async fn time_entries(
        &self,
        workspace_id: &str,
        user_id: &str,
        window: &DayWindow,
    ) -> clockify::Result<Vec<TimeEntry>> {
        ClockifyClient::time_entries(
            self,
            workspace_id,
            user_id,
            &window.start_param(),
            &window.end_param(),
        )
        .await
    }
}

/// 同期全体の結果。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub updated: usize,
    /// エントリがなく何もしなかった日数
    pub skipped: usize,
    pub failed: usize,
}

/// 1 日分の同期結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOutcome {
    Skipped,
    Updated {
        path: PathBuf,
        entries: usize,
        total: Hms,
    },
}

/// 設定された日数分のデイリーノートを更新するシンクロナイザー。
pub struct DailySyncer<'a, T> {
    tracker: &'a T,
    vault_path: &'a Path,
    time_zone: Tz,
    days_back: u32,
}

impl<'a, T: TimeTracker> DailySyncer<'a, T> {
    pub fn new(tracker: &'a T, config: &'a Config) -> Self {
        Self {
            tracker,
            vault_path: &config.vault_path,
            time_zone: config.time_zone,
            days_back: config.days_back.get(),
        }
    }

    /// `today` から遡って各日を同期する。
    ///
    /// ユーザー情報とプロジェクト一覧の取得失敗は全体のエラーとする。
    /// 日ごとの失敗はログに記録して次の日に進む。
    pub async fn run(&self, today: NaiveDate) -> Result<SyncSummary> {
        let user = self
            .tracker
            .current_user()
            .await
            .context("Failed to resolve Clockify user (invalid API key or network issue)")?;
        info!(user = %user.id, workspace = %user.active_workspace, "Resolved Clockify user");

        let names = self.load_names(&user.active_workspace).await?;

        let mut summary = SyncSummary::default();
        for date in days_back_from(today, self.days_back) {
            match self.sync_day(&user, &names, date).await {
                Ok(DayOutcome::Skipped) => {
                    debug!(date = %date, "No time entries, skipping");
                    summary.skipped += 1;
                }
                Ok(DayOutcome::Updated {
                    path,
                    entries,
                    total,
                }) => {
                    info!(
                        date = %date,
                        total = %total,
                        entries,
                        path = %path.display(),
                        "Updated daily note"
                    );
                    summary.updated += 1;
                }
                Err(e) => {
                    let message = format!("{e:#}");
                    error!(date = %date, error = %message, "Failed to sync day");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// プロジェクト名とタスク名の対応表を作る。
    ///
    /// タスク一覧の取得に失敗したプロジェクトはタスク名なしで続行する。
    async fn load_names(&self, workspace_id: &str) -> Result<NameMaps> {
        let projects = self
            .tracker
            .projects(workspace_id)
            .await
            .context("Failed to fetch project list")?;

        let mut names = NameMaps::default();
        names.add_projects(&projects);

        for project in &projects {
            match self.tracker.tasks(workspace_id, &project.id).await {
                Ok(tasks) => names.add_tasks(&tasks),
                Err(e) => {
                    warn!(project = %project.name, error = %e, "Failed to fetch tasks for project");
                }
            }
        }

        info!(
            projects = names.project_count(),
            tasks = names.task_count(),
            "Loaded project and task names"
        );

        Ok(names)
    }

    /// 1 日分のエントリを取得し、ノートの管理ブロックを差し替える。
    async fn sync_day(
        &self,
        user: &User,
        names: &NameMaps,
        date: NaiveDate,
    ) -> Result<DayOutcome> {
        let window = DayWindow::compute(date, self.time_zone)?;

        let entries = self
            .tracker
            .time_entries(&user.active_workspace, &user.id, &window)
            .await
            .context("Failed to fetch time entries")?;

        if entries.is_empty() {
            return Ok(DayOutcome::Skipped);
        }

        let block = render_block(&entries, names, self.time_zone);

        let path = note_path(self.vault_path, date);
        let existing = read_note(&path, date)?;
        write_note(&path, &inject(&existing, &block.lines))?;

        Ok(DayOutcome::Updated {
            path,
            entries: entries.len(),
            total: block.total,
        })
    }
}

/// `today` を含めて `count` 日分の日付を新しい順に返す。
fn days_back_from(today: NaiveDate, count: u32) -> impl Iterator<Item = NaiveDate> {
    (0..u64::from(count)).map_while(move |i| today.checked_sub_days(Days::new(i)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use std::num::NonZeroU32;

    use chrono::{DateTime, Utc};
    use clockify::{ClockifyError, StatusCode, TimeInterval};
    use tempfile::TempDir;

    use crate::config::ApiConfig;
    use crate::daily::format::SENTINEL;

    /// メモリ上のデータを返すテスト用トラッカー。
    #[derive(Default)]
    struct FakeTracker {
        unauthorized: bool,
        projects: Vec<Project>,
        /// プロジェクト ID -> タスク。登録がないプロジェクトはエラーを返す
        tasks: HashMap<String, Vec<Task>>,
        /// 区間の開始パラメータ -> エントリ
        entries: HashMap<String, Vec<TimeEntry>>,
        /// エラーを返す区間の開始パラメータ
        failing_windows: Vec<String>,
        requested_windows: RefCell<Vec<String>>,
    }

    impl TimeTracker for FakeTracker {
        async fn current_user(&self) -> clockify::Result<User> {
            if self.unauthorized {
                return Err(ClockifyError::Unauthorized);
            }
            Ok(User {
                id: "u1".to_string(),
                active_workspace: "w1".to_string(),
                name: None,
                email: None,
            })
        }

        async fn projects(&self, _workspace_id: &str) -> clockify::Result<Vec<Project>> {
            Ok(self.projects.clone())
        }

        async fn tasks(&self, _workspace_id: &str, project_id: &str) -> clockify::Result<Vec<Task>> {
            self.tasks
                .get(project_id)
                .cloned()
                .ok_or_else(|| ClockifyError::Status {
                    status: StatusCode::NOT_FOUND,
                    body: "not found".to_string(),
                })
        }

        async fn time_entries(
            &self,
            _workspace_id: &str,
            _user_id: &str,
            window: &DayWindow,
        ) -> clockify::Result<Vec<TimeEntry>> {
            let key = window.start_param();
            self.requested_windows.borrow_mut().push(key.clone());

            if self.failing_windows.contains(&key) {
                return Err(ClockifyError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_string(),
                });
            }
            Ok(self.entries.get(&key).cloned().unwrap_or_default())
        }
    }

    // Europe/Moscow の各日の開始 (UTC)
    const JUL_12: &str = "2025-07-11T21:00:00Z";
    const JUL_11: &str = "2025-07-10T21:00:00Z";
    const JUL_10: &str = "2025-07-09T21:00:00Z";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 12).unwrap()
    }

    fn config(vault: &Path, days_back: u32) -> Config {
        Config {
            api_key: "key".to_string(),
            vault_path: vault.to_path_buf(),
            days_back: NonZeroU32::new(days_back).unwrap(),
            time_zone: Tz::Europe__Moscow,
            api: ApiConfig::default(),
        }
    }

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn task(id: &str, name: &str) -> Task {
        Task {
            id: id.to_string(),
            name: name.to_string(),
            project_id: None,
        }
    }

    fn entry(
        project_id: &str,
        task_id: Option<&str>,
        start: &str,
        duration: &str,
        description: &str,
    ) -> TimeEntry {
        TimeEntry {
            description: Some(description.to_string()),
            project_id: Some(project_id.to_string()),
            task_id: task_id.map(str::to_string),
            time_interval: TimeInterval {
                start: Some(start.parse::<DateTime<Utc>>().unwrap()),
                end: None,
                duration: Some(duration.to_string()),
            },
            ..Default::default()
        }
    }

    fn tracker() -> FakeTracker {
        FakeTracker {
            projects: vec![project("p1", "Backend"), project("p2", "Reading")],
            tasks: HashMap::from([
                ("p1".to_string(), vec![task("t1", "Review")]),
                ("p2".to_string(), vec![]),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sync_creates_note_with_block() {
        let vault = TempDir::new().unwrap();
        let mut tracker = tracker();
        tracker.entries.insert(
            JUL_12.to_string(),
            vec![
                entry("p1", Some("t1"), "2025-07-12T06:30:00Z", "PT1H7M23S", "call"),
                entry("p2", None, "2025-07-12T05:00:00Z", "PT5M", ""),
            ],
        );
        let config = config(vault.path(), 1);

        let summary = DailySyncer::new(&tracker, &config)
            .run(today())
            .await
            .unwrap();

        assert_eq!(
            summary,
            SyncSummary {
                updated: 1,
                skipped: 0,
                failed: 0
            }
        );

        let content = fs::read_to_string(vault.path().join("2025-07-12.md")).unwrap();
        assert_eq!(
            content,
            format!(
                "# 12.07.2025\n\n{SENTINEL}\n\
                 > Backend - Review: 01:07:23 (09:30|call)\n\
                 > Reading - No task: 00:05:00 (08:00)\n"
            )
        );
    }

    #[tokio::test]
    async fn test_day_without_entries_leaves_files_untouched() {
        let vault = TempDir::new().unwrap();
        let existing = "# 11.07.2025\n\nhand written\n";
        fs::write(vault.path().join("2025-07-11.md"), existing).unwrap();

        let tracker = tracker();
        let config = config(vault.path(), 2);

        let summary = DailySyncer::new(&tracker, &config)
            .run(today())
            .await
            .unwrap();

        assert_eq!(summary.skipped, 2);
        assert!(!vault.path().join("2025-07-12.md").exists());
        assert_eq!(
            fs::read_to_string(vault.path().join("2025-07-11.md")).unwrap(),
            existing
        );
    }

    #[tokio::test]
    async fn test_resync_replaces_previous_block() {
        let vault = TempDir::new().unwrap();
        let path = vault.path().join("2025-07-12.md");
        fs::write(
            &path,
            format!("# 12.07.2025\n\nnotes\n\n{SENTINEL}\n> Old - Entry: 00:01:00 (01:00)\n"),
        )
        .unwrap();

        let mut tracker = tracker();
        tracker.entries.insert(
            JUL_12.to_string(),
            vec![entry("p1", Some("t1"), "2025-07-12T10:00:00Z", "PT2H", "")],
        );
        let config = config(vault.path(), 1);
        let syncer = DailySyncer::new(&tracker, &config);

        syncer.run(today()).await.unwrap();
        let first = fs::read_to_string(&path).unwrap();
        syncer.run(today()).await.unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(
            first,
            format!("# 12.07.2025\n\nnotes\n\n{SENTINEL}\n> Backend - Review: 02:00:00 (13:00)\n")
        );
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_day_does_not_block_other_days() {
        let vault = TempDir::new().unwrap();
        let mut tracker = tracker();
        tracker.failing_windows.push(JUL_11.to_string());
        for day in [JUL_12, JUL_10] {
            tracker.entries.insert(
                day.to_string(),
                vec![entry("p1", None, "2025-07-10T06:00:00Z", "PT1M", "")],
            );
        }
        let config = config(vault.path(), 3);

        let summary = DailySyncer::new(&tracker, &config)
            .run(today())
            .await
            .unwrap();

        assert_eq!(
            summary,
            SyncSummary {
                updated: 2,
                skipped: 0,
                failed: 1
            }
        );
        assert!(vault.path().join("2025-07-12.md").exists());
        assert!(!vault.path().join("2025-07-11.md").exists());
        assert!(vault.path().join("2025-07-10.md").exists());
        assert_eq!(
            *tracker.requested_windows.borrow(),
            vec![JUL_12.to_string(), JUL_11.to_string(), JUL_10.to_string()]
        );
    }

    #[tokio::test]
    async fn test_task_fetch_failure_falls_back_to_no_task() {
        let vault = TempDir::new().unwrap();
        let mut tracker = tracker();
        tracker.tasks.remove("p1");
        tracker.entries.insert(
            JUL_12.to_string(),
            vec![entry("p1", Some("t1"), "2025-07-12T06:30:00Z", "PT5M", "")],
        );
        let config = config(vault.path(), 1);

        DailySyncer::new(&tracker, &config)
            .run(today())
            .await
            .unwrap();

        let content = fs::read_to_string(vault.path().join("2025-07-12.md")).unwrap();
        assert!(content.contains("> Backend - No task: 00:05:00 (09:30)"));
    }

    #[tokio::test]
    async fn test_identity_failure_aborts_before_writing() {
        let vault = TempDir::new().unwrap();
        let mut tracker = tracker();
        tracker.unauthorized = true;
        tracker.entries.insert(
            JUL_12.to_string(),
            vec![entry("p1", None, "2025-07-12T06:30:00Z", "PT5M", "")],
        );
        let config = config(vault.path(), 1);

        let result = DailySyncer::new(&tracker, &config).run(today()).await;

        assert!(result.is_err());
        assert!(tracker.requested_windows.borrow().is_empty());
        assert_eq!(fs::read_dir(vault.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_days_back_from() {
        let days: Vec<_> = days_back_from(today(), 3).collect();
        assert_eq!(
            days,
            vec![
                today(),
                NaiveDate::from_ymd_opt(2025, 7, 11).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            ]
        );
    }
}
