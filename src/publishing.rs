//! Collects a local folder for upload to the hosted Space.

use crate::hub_client::CommitFile;
use anyhow::{Context, Result};
use std::path::Path;

/// Directories never uploaded.
const IGNORED_DIRS: [&str; 2] = [".git", "__pycache__"];

/// Reads every file under `root`, recursively.
///
/// Paths are relative to `root`, `/`-separated and sorted, so the same
/// folder always produces the same commit.
pub fn collect_folder(root: &Path) -> Result<Vec<CommitFile>> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut files = Vec::new();
    collect_into(root, root, &mut files)?;
    files.sort_by(|a, b| a.path_in_repo.cmp(&b.path_in_repo));

    if files.is_empty() {
        anyhow::bail!("{} contains no files to upload", root.display());
    }
    Ok(files)
}

fn collect_into(root: &Path, dir: &Path, files: &mut Vec<CommitFile>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            let name = entry.file_name();
            if IGNORED_DIRS.iter().any(|ignored| name == *ignored) {
                tracing::debug!("Skipping {}", path.display());
                continue;
            }
            collect_into(root, &path, files)?;
        } else if file_type.is_file() {
            let relative = path.strip_prefix(root)?;
            let path_in_repo = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let content =
                std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            files.push(CommitFile {
                path_in_repo,
                content,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collects_nested_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "axum\n").unwrap();
        fs::write(dir.path().join("app.py"), "print()\n").unwrap();
        fs::create_dir_all(dir.path().join("static/img")).unwrap();
        fs::write(dir.path().join("static/img/logo.svg"), "<svg/>").unwrap();

        let files = collect_folder(dir.path()).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path_in_repo.as_str()).collect();
        assert_eq!(paths, vec!["app.py", "requirements.txt", "static/img/logo.svg"]);
        assert_eq!(files[0].content, b"print()\n".to_vec());
    }

    #[test]
    fn test_skips_git_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref").unwrap();
        fs::write(dir.path().join("Dockerfile"), "FROM scratch").unwrap();

        let files = collect_folder(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path_in_repo, "Dockerfile");
    }

    #[test]
    fn test_empty_or_missing_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_folder(dir.path()).is_err());
        assert!(collect_folder(&dir.path().join("missing")).is_err());
    }
}
