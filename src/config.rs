// src/config.rs
use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;

use crate::error::{Result, ScaffoldError};

/// 各コンポーネントに渡すパス設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_dir: PathBuf,
    /// ルート宣言 (urls.json)
    pub routes_file: PathBuf,
    /// 解決済みルート表のキャッシュ
    pub cache_file: PathBuf,
    pub controller_dir: PathBuf,
    pub template_dir: PathBuf,
}

impl Config {
    /// アプリケーションの標準レイアウトからパスを組み立てる。
    /// `base_dir` は絶対パスに変換される。
    pub fn from_base_dir(base_dir: &Path) -> Result<Self> {
        let base_dir = base_dir
            .absolutize()
            .map_err(|e| ScaffoldError::io("resolve base directory", base_dir, e))?
            .to_path_buf();
        let app = base_dir.join("app");

        Ok(Config {
            routes_file: app.join("config").join("urls.json"),
            cache_file: app.join("cache").join("urls.cache.json"),
            controller_dir: app.join("controller"),
            template_dir: app.join("template"),
            base_dir,
        })
    }

    /// `None` でない値だけを差し替える。相対パスは base_dir 基準
    pub fn with_overrides(
        mut self,
        routes_file: Option<PathBuf>,
        cache_file: Option<PathBuf>,
        controller_dir: Option<PathBuf>,
        template_dir: Option<PathBuf>,
    ) -> Self {
        let base = self.base_dir.clone();
        let under_base = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };

        if let Some(p) = routes_file {
            self.routes_file = under_base(p);
        }
        if let Some(p) = cache_file {
            self.cache_file = under_base(p);
        }
        if let Some(p) = controller_dir {
            self.controller_dir = under_base(p);
        }
        if let Some(p) = template_dir {
            self.template_dir = under_base(p);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_conventional_layout() {
        let config = Config::from_base_dir(Path::new("/srv/site")).unwrap();
        assert_eq!(config.routes_file, Path::new("/srv/site/app/config/urls.json"));
        assert_eq!(config.cache_file, Path::new("/srv/site/app/cache/urls.cache.json"));
        assert_eq!(config.controller_dir, Path::new("/srv/site/app/controller"));
        assert_eq!(config.template_dir, Path::new("/srv/site/app/template"));
    }

    #[test]
    fn relative_base_becomes_absolute() {
        let config = Config::from_base_dir(Path::new("site")).unwrap();
        assert!(config.base_dir.is_absolute());
        assert!(config.base_dir.ends_with("site"));
    }

    #[test]
    fn overrides_resolve_against_base() {
        let config = Config::from_base_dir(Path::new("/srv/site"))
            .unwrap()
            .with_overrides(
                Some("routes.json".into()),
                None,
                Some("/elsewhere/controllers".into()),
                None,
            );
        assert_eq!(config.routes_file, Path::new("/srv/site/routes.json"));
        assert_eq!(config.controller_dir, Path::new("/elsewhere/controllers"));
        assert_eq!(config.template_dir, Path::new("/srv/site/app/template"));
    }
}
