//! プロジェクト・タスク ID から表示名への対応表。

use std::collections::HashMap;

use clockify::{Project, Task};

pub const NO_PROJECT: &str = "No project";
pub const NO_TASK: &str = "No task";

/// 同期 1 回分の名前解決テーブル。構築後は読み取り専用。
#[derive(Debug, Clone, Default)]
pub struct NameMaps {
    projects: HashMap<String, String>,
    tasks: HashMap<String, String>,
}

impl NameMaps {
    pub fn add_projects<'a>(&mut self, projects: impl IntoIterator<Item = &'a Project>) {
        self.projects.extend(
            projects
                .into_iter()
                .map(|p| (p.id.clone(), p.name.clone())),
        );
    }

    pub fn add_tasks<'a>(&mut self, tasks: impl IntoIterator<Item = &'a Task>) {
        self.tasks
            .extend(tasks.into_iter().map(|t| (t.id.clone(), t.name.clone())));
    }

    /// プロジェクト名を返す。未知の ID や ID なしは `No project`。
    pub fn project(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.projects.get(id))
            .map_or(NO_PROJECT, String::as_str)
    }

    /// タスク名を返す。未知の ID や ID なしは `No task`。
    pub fn task(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.tasks.get(id))
            .map_or(NO_TASK, String::as_str)
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
