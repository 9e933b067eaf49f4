// src/error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// ルートのコンパイルと雛形生成で発生するエラー
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// ファイルシステム操作の失敗 (どの操作・どのパスかを保持する)
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON の読み書きに失敗した
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// グループでもリーフでもないノード
    #[error("malformed route node at {location}: {reason}")]
    Malformed { location: String, reason: String },

    /// 祖先を含めて module が一度も定義されなかったリーフ
    #[error("route {url:?} (action {action:?}) has no module on its path")]
    MissingModule { url: String, action: String },

    /// ファイル名・関数名に使えない module / action
    #[error("invalid {kind} name {name:?} at {location}")]
    InvalidName {
        kind: &'static str,
        name: String,
        location: String,
    },

    /// --strict 指定時の URL 重複
    #[error("duplicate route urls: {}", .0.join(", "))]
    DuplicateUrls(Vec<String>),

    /// キャッシュがまだ生成されていない
    #[error("route cache {} does not exist (run `update` first)", .0.display())]
    CacheMissing(PathBuf),
}

impl ScaffoldError {
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScaffoldError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
