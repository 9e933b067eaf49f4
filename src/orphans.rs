// src/orphans.rs
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, ScaffoldError};
use crate::model::RouteTable;
use crate::stub::SOURCE_EXTENSION;

/// ルート表から参照されていないコントローラとテンプレート
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Orphans {
    pub controllers: Vec<PathBuf>,
    pub templates: Vec<PathBuf>,
}

impl Orphans {
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty() && self.templates.is_empty()
    }
}

/// コントローラ/テンプレートディレクトリを走査して孤立したユニットを列挙する。
/// 報告するだけで、削除はしない。
pub fn find_orphans(table: &RouteTable, controller_dir: &Path, template_dir: &Path) -> Result<Orphans> {
    let modules: HashSet<&str> = table.iter().map(|r| r.module.as_str()).collect();
    let actions: HashSet<(&str, &str)> = table
        .iter()
        .map(|r| (r.module.as_str(), r.action.as_str()))
        .collect();

    // 1) <controller_dir>/<module>.php
    let controllers = source_files(controller_dir, 1)?
        .into_iter()
        .filter(|path| {
            let module = stem(path);
            !modules.contains(module.as_str())
        })
        .collect();

    // 2) <template_dir>/<module>/<action>.php
    let templates = source_files(template_dir, 2)?
        .into_iter()
        .filter(|path| {
            let Some(module) = path
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
            else {
                return true;
            };
            let action = stem(path);
            !actions.contains(&(module.as_str(), action.as_str()))
        })
        .collect();

    Ok(Orphans {
        controllers,
        templates,
    })
}

/// `root` から深さ `depth` ちょうどにある拡張子付きファイルを名前順で返す
fn source_files(root: &Path, depth: usize) -> Result<BTreeSet<PathBuf>> {
    let mut found = BTreeSet::new();
    if !root.is_dir() {
        debug!(path = %root.display(), "directory missing; nothing to scan");
        return Ok(found);
    }

    for entry in WalkDir::new(root).min_depth(depth).max_depth(depth) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ScaffoldError::io("scan", path, e.into())
        })?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
        {
            found.insert(path.to_path_buf());
        }
    }
    Ok(found)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
