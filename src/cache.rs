// src/cache.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, ScaffoldError};
use crate::model::RouteTable;

/// 解決済みルート表のキャッシュファイル
#[derive(Debug, Clone)]
pub struct RouteTableCache {
    path: PathBuf,
}

impl RouteTableCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RouteTableCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 表全体を書き出し、以前のキャッシュを丸ごと置き換える。
    /// 一時ファイルに書いてから rename するので、途中で落ちても古いキャッシュが残る。
    pub fn write(&self, table: &RouteTable) -> Result<()> {
        let json = serde_json::to_string_pretty(table).map_err(|e| ScaffoldError::Json {
            path: self.path.clone(),
            source: e,
        })?;

        // 1) 親ディレクトリが無ければ作る
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| ScaffoldError::io("create cache directory", parent, e))?;
        }

        // 2) 隣に一時ファイルを書く
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json.as_bytes())
            .map_err(|e| ScaffoldError::io("write temporary cache", &tmp_path, e))?;

        // 3) 本来のパスへ置き換える
        if let Err(e) = rename_overwrite(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(ScaffoldError::io("replace cache", &self.path, e));
        }

        info!(path = %self.path.display(), routes = table.len(), "route cache written");
        Ok(())
    }

    /// キャッシュを読み込む (下流の利用者向け)
    pub fn read(&self) -> Result<RouteTable> {
        debug!(path = %self.path.display(), "reading route cache");

        let src = match fs::read_to_string(&self.path) {
            Ok(src) => src,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ScaffoldError::CacheMissing(self.path.clone()));
            }
            Err(e) => return Err(ScaffoldError::io("read route cache", &self.path, e)),
        };

        serde_json::from_str(&src).map_err(|e| ScaffoldError::Json {
            path: self.path.clone(),
            source: e,
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "routes".to_string());
        self.path
            .with_file_name(format!(".{file_name}.tmp.{}", std::process::id()))
    }
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}
