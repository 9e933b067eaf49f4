// src/fs.rs
use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScaffoldError};

/// 雛形生成が触るファイルシステムの操作。
/// 既存ファイルを書き換える操作は持たない (作成と追記のみ)。
pub trait Workspace {
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir(&mut self, path: &Path) -> Result<()>;
    /// 新しいファイルを作る。既に存在すればエラー
    fn create_file(&mut self, path: &Path, contents: &str) -> Result<()>;
    fn append(&mut self, path: &Path, contents: &str) -> Result<()>;
}

/// 実際のディスクに書き込む実装
#[derive(Debug, Default)]
pub struct DiskWorkspace;

impl Workspace for DiskWorkspace {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| ScaffoldError::io("read", path, e))
    }

    fn create_dir(&mut self, path: &Path) -> Result<()> {
        fs::create_dir(path).map_err(|e| ScaffoldError::io("create directory", path, e))
    }

    fn create_file(&mut self, path: &Path, contents: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| ScaffoldError::io("create", path, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| ScaffoldError::io("write", path, e))
    }

    fn append(&mut self, path: &Path, contents: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| ScaffoldError::io("open for append", path, e))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| ScaffoldError::io("append to", path, e))
    }
}

/// ディスクを読むだけで、変更はメモリ上に溜める実装 (--dry-run 用)。
/// 同じ実行の中では書いたはずの内容が読み返せるので、報告は本番と一致する。
#[derive(Debug, Default)]
pub struct DryRunWorkspace {
    dirs: HashSet<PathBuf>,
    files: HashMap<PathBuf, String>,
}

impl DryRunWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// 作成または追記される予定のファイル
    pub fn pending_files(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// 親ディレクトリが (ディスク上かこの実行の中で) 存在しなければ、
    /// ディスクと同じく NotFound で失敗させる
    fn require_parent(&self, op: &'static str, path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.is_dir(parent) => Err(
                ScaffoldError::io(op, path, std::io::ErrorKind::NotFound.into()),
            ),
            _ => Ok(()),
        }
    }
}

impl Workspace for DryRunWorkspace {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path) || path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(path) || path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        match self.files.get(path) {
            Some(contents) => Ok(contents.clone()),
            None => DiskWorkspace.read_to_string(path),
        }
    }

    fn create_dir(&mut self, path: &Path) -> Result<()> {
        if self.is_dir(path) || self.is_file(path) {
            return Err(ScaffoldError::io(
                "create directory",
                path,
                std::io::ErrorKind::AlreadyExists.into(),
            ));
        }
        self.require_parent("create directory", path)?;
        self.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn create_file(&mut self, path: &Path, contents: &str) -> Result<()> {
        self.require_parent("create", path)?;
        if self.is_file(path) {
            return Err(ScaffoldError::io(
                "create",
                path,
                std::io::ErrorKind::AlreadyExists.into(),
            ));
        }
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn append(&mut self, path: &Path, contents: &str) -> Result<()> {
        let mut current = self.read_to_string(path)?;
        current.push_str(contents);
        self.files.insert(path.to_path_buf(), current);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn disk_create_file_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("unit.php");
        let mut ws = DiskWorkspace;

        ws.create_file(&path, "first").unwrap();
        let err = ws.create_file(&path, "second").unwrap_err();

        assert!(matches!(err, ScaffoldError::Io { op: "create", .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn disk_append_requires_existing_file() {
        let tmp = TempDir::new().unwrap();
        let mut ws = DiskWorkspace;
        let err = ws.append(&tmp.path().join("missing.php"), "x").unwrap_err();
        assert!(matches!(err, ScaffoldError::Io { op: "open for append", .. }));
    }

    #[test]
    fn disk_create_dir_needs_parent() {
        let tmp = TempDir::new().unwrap();
        let mut ws = DiskWorkspace;
        let err = ws.create_dir(&tmp.path().join("a/b")).unwrap_err();
        assert!(matches!(err, ScaffoldError::Io { op: "create directory", .. }));
    }

    #[test]
    fn dry_run_fails_like_disk_when_parent_is_missing() {
        let tmp = TempDir::new().unwrap();
        let mut ws = DryRunWorkspace::new();

        let err = ws.create_dir(&tmp.path().join("template/user")).unwrap_err();
        assert!(matches!(err, ScaffoldError::Io { op: "create directory", .. }));

        let err = ws.create_file(&tmp.path().join("controller/user.php"), "").unwrap_err();
        assert!(matches!(err, ScaffoldError::Io { op: "create", .. }));

        // この実行の中で作ったディレクトリは親として使える
        ws.create_dir(&tmp.path().join("template")).unwrap();
        ws.create_dir(&tmp.path().join("template/user")).unwrap();
        ws.create_file(&tmp.path().join("template/user/list.php"), "").unwrap();
    }

    #[test]
    fn dry_run_reads_through_and_never_writes() {
        let tmp = TempDir::new().unwrap();
        let existing = tmp.path().join("existing.php");
        fs::write(&existing, "a").unwrap();

        let mut ws = DryRunWorkspace::new();
        ws.append(&existing, "b").unwrap();
        ws.create_dir(&tmp.path().join("new_dir")).unwrap();
        ws.create_file(&tmp.path().join("new_dir/new.php"), "").unwrap();

        assert_eq!(ws.read_to_string(&existing).unwrap(), "ab");
        assert!(ws.is_dir(&tmp.path().join("new_dir")));
        assert!(ws.is_file(&tmp.path().join("new_dir/new.php")));
        assert_eq!(ws.pending_files().count(), 2);

        assert_eq!(fs::read_to_string(&existing).unwrap(), "a");
        assert!(!tmp.path().join("new_dir").exists());
    }
}
