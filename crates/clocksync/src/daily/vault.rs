//! Vault 上のデイリーノートファイルの読み書き。

use std::{
    fs,
    io::{ErrorKind, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use tempfile::NamedTempFile;

use super::inject::seed_content;

/// 日付に対応するノートのパス（`{vault}/{YYYY-MM-DD}.md`）。
pub fn note_path(vault: &Path, date: NaiveDate) -> PathBuf {
    vault.join(format!("{}.md", date.format("%Y-%m-%d")))
}

/// ノートを読み込む。存在しない場合は見出しだけの初期内容を返す。
pub fn read_note(path: &Path, date: NaiveDate) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(seed_content(date)),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read daily note: {}", path.display()))
        }
    }
}

/// ノート全体を書き換える。
///
/// 同じディレクトリの一時ファイルに書いてから置き換えるため、
/// 途中で失敗しても元の内容か新しい内容のどちらかが残る。
/// 既存ノートのパーミッションは引き継ぎ、シンボリックリンクはリンク先を書き換える。
pub fn write_note(path: &Path, content: &str) -> Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = target
        .parent()
        .with_context(|| format!("Daily note has no parent directory: {}", path.display()))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let permissions = match fs::metadata(&target) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(e) if e.kind() == ErrorKind::NotFound => new_note_permissions(),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to inspect daily note: {}", path.display()));
        }
    };

    let mut file = NamedTempFile::new_in(dir).context("Failed to create temporary file")?;
    file.write_all(content.as_bytes())
        .context("Failed to write temporary file")?;
    if let Some(permissions) = permissions {
        file.as_file()
            .set_permissions(permissions)
            .context("Failed to set permissions on temporary file")?;
    }
    file.persist(&target)
        .with_context(|| format!("Failed to replace daily note: {}", path.display()))?;

    Ok(())
}

/// 新規ノートのパーミッション。一時ファイルの 0600 のままにしない。
#[cfg(unix)]
fn new_note_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt as _;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_note_permissions() -> Option<fs::Permissions> {
    None
}
