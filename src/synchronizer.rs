// src/synchronizer.rs
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::fs::Workspace;
use crate::model::{ResolvedRoute, RouteTable};
use crate::report::{Reporter, ScaffoldEvent};
use crate::stub::{CONTROLLER_HEADER, DeclaredSymbols, SOURCE_EXTENSION, handler_name, handler_stub};

/// 1 回の同期で作成したものの件数
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub folders: usize,
    pub controllers: usize,
    pub handlers: usize,
    pub templates: usize,
}

impl SyncSummary {
    pub fn is_empty(&self) -> bool {
        *self == SyncSummary::default()
    }

    fn record(&mut self, event: &ScaffoldEvent) {
        match event {
            ScaffoldEvent::FolderCreated { .. } => self.folders += 1,
            ScaffoldEvent::ControllerCreated { .. } => self.controllers += 1,
            ScaffoldEvent::HandlerAdded { .. } => self.handlers += 1,
            ScaffoldEvent::TemplateCreated { .. } => self.templates += 1,
            ScaffoldEvent::DuplicateUrl { .. } => {}
        }
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} folders, {} controllers, {} handlers, {} templates created",
            self.folders, self.controllers, self.handlers, self.templates
        )
    }
}

/// 出来事を Reporter に流しつつ件数を数える
struct Tally<'r, R: Reporter + ?Sized> {
    reporter: &'r mut R,
    summary: SyncSummary,
}

impl<R: Reporter + ?Sized> Tally<'_, R> {
    fn emit(&mut self, event: ScaffoldEvent) {
        self.summary.record(&event);
        self.reporter.report(event);
    }
}

/// モジュールごとのコントローラを用意し、足りないハンドラだけを末尾に追記する
#[derive(Debug)]
pub struct ControllerSynchronizer {
    controller_dir: PathBuf,
    /// モジュール名 → 宣言済みの関数名
    declared: HashMap<String, DeclaredSymbols>,
}

impl ControllerSynchronizer {
    pub fn new(controller_dir: impl Into<PathBuf>) -> Self {
        ControllerSynchronizer {
            controller_dir: controller_dir.into(),
            declared: HashMap::new(),
        }
    }

    pub fn controller_path(&self, module: &str) -> PathBuf {
        self.controller_dir
            .join(format!("{module}.{SOURCE_EXTENSION}"))
    }

    fn ensure_handler<W, R>(
        &mut self,
        route: &ResolvedRoute,
        ws: &mut W,
        tally: &mut Tally<'_, R>,
    ) -> Result<()>
    where
        W: Workspace + ?Sized,
        R: Reporter + ?Sized,
    {
        let path = self.controller_path(&route.module);

        // 1) コントローラが無ければヘッダだけで作る
        if !ws.is_file(&path) {
            ws.create_file(&path, CONTROLLER_HEADER)?;
            self.declared.remove(&route.module);
            tally.emit(ScaffoldEvent::ControllerCreated {
                module: route.module.clone(),
                path: path.clone(),
            });
        }

        // 2) 宣言済みの関数名を静的に読み取る (モジュールごとに 1 回)
        let symbols = match self.declared.entry(route.module.clone()) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                let source = ws.read_to_string(&path)?;
                e.insert(DeclaredSymbols::scan(&source))
            }
        };

        // 3) 既にあるハンドラには触れない
        let handler = handler_name(&route.action);
        if symbols.contains(&handler) {
            debug!(module = %route.module, handler = %handler, "handler already present");
            return Ok(());
        }

        // 4) 雛形を末尾に追記する
        ws.append(&path, &handler_stub(route))?;
        symbols.insert(&handler);
        tally.emit(ScaffoldEvent::HandlerAdded {
            module: route.module.clone(),
            handler,
        });
        Ok(())
    }
}

/// モジュールごとのテンプレートフォルダと action ごとの空テンプレートを用意する。
/// 既存のテンプレートは一切変更しない
#[derive(Debug)]
pub struct TemplateSynchronizer {
    template_dir: PathBuf,
}

impl TemplateSynchronizer {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        TemplateSynchronizer {
            template_dir: template_dir.into(),
        }
    }

    pub fn module_dir(&self, module: &str) -> PathBuf {
        self.template_dir.join(module)
    }

    pub fn template_path(&self, module: &str, action: &str) -> PathBuf {
        self.module_dir(module)
            .join(format!("{action}.{SOURCE_EXTENSION}"))
    }

    fn ensure_module_dir<W, R>(&self, module: &str, ws: &mut W, tally: &mut Tally<'_, R>) -> Result<()>
    where
        W: Workspace + ?Sized,
        R: Reporter + ?Sized,
    {
        let dir = self.module_dir(module);
        if !ws.is_dir(&dir) {
            ws.create_dir(&dir)?;
            tally.emit(ScaffoldEvent::FolderCreated { path: dir });
        }
        Ok(())
    }

    fn ensure_template<W, R>(
        &self,
        route: &ResolvedRoute,
        ws: &mut W,
        tally: &mut Tally<'_, R>,
    ) -> Result<()>
    where
        W: Workspace + ?Sized,
        R: Reporter + ?Sized,
    {
        let path = self.template_path(&route.module, &route.action);
        if ws.is_file(&path) {
            return Ok(());
        }
        ws.create_file(&path, "")?;
        tally.emit(ScaffoldEvent::TemplateCreated {
            module: route.module.clone(),
            action: route.action.clone(),
            path,
        });
        Ok(())
    }
}

/// ルート表とソースツリーの差分を、追加だけで埋める。
///
/// 途中でファイル操作が失敗した場合はそこで中断し、それまでの変更は残る。
/// 変更の無い表で 2 回実行しても、2 回目は何もしない。
pub fn synchronize<W, R>(
    table: &RouteTable,
    controller_dir: &Path,
    template_dir: &Path,
    ws: &mut W,
    reporter: &mut R,
) -> Result<SyncSummary>
where
    W: Workspace + ?Sized,
    R: Reporter + ?Sized,
{
    let mut controllers = ControllerSynchronizer::new(controller_dir);
    let templates = TemplateSynchronizer::new(template_dir);
    let mut tally = Tally {
        reporter,
        summary: SyncSummary::default(),
    };

    for route in table {
        debug!(url = %route.url, module = %route.module, action = %route.action, "synchronizing route");
        templates.ensure_module_dir(&route.module, ws, &mut tally)?;
        controllers.ensure_handler(route, ws, &mut tally)?;
        templates.ensure_template(route, ws, &mut tally)?;
    }

    info!(summary = %tally.summary, "scaffolding synchronized");
    Ok(tally.summary)
}
