// src/report.rs
use std::fmt;
use std::path::PathBuf;

use colored::Colorize;

/// 雛形生成の途中で発生する出来事
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldEvent {
    FolderCreated { path: PathBuf },
    ControllerCreated { module: String, path: PathBuf },
    HandlerAdded { module: String, handler: String },
    TemplateCreated { module: String, action: String, path: PathBuf },
    DuplicateUrl { url: String, actions: Vec<String> },
}

impl fmt::Display for ScaffoldEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaffoldEvent::FolderCreated { path } => {
                write!(f, "  {} {}", "folder created:".green(), path.display())
            }
            ScaffoldEvent::ControllerCreated { module, path } => write!(
                f,
                "  {} {} ({})",
                "controller created:".green(),
                module.bold(),
                path.display()
            ),
            ScaffoldEvent::HandlerAdded { module, handler } => write!(
                f,
                "    {} {}::{}",
                "handler added:".bright_green(),
                module,
                handler.bold()
            ),
            ScaffoldEvent::TemplateCreated { path, .. } => {
                write!(f, "    {} {}", "template created:".bright_green(), path.display())
            }
            ScaffoldEvent::DuplicateUrl { url, actions } => write!(
                f,
                "  {} {} ({})",
                "duplicate url:".yellow(),
                url,
                actions.join(", ")
            ),
        }
    }
}

/// 出来事の受け取り先。状態もエラーも持たない
pub trait Reporter {
    fn report(&mut self, event: ScaffoldEvent);
}

/// 標準出力に 1 行ずつ表示する。silent のときは何も出さない
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    silent: bool,
}

impl ConsoleReporter {
    pub fn new(silent: bool) -> Self {
        ConsoleReporter { silent }
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: ScaffoldEvent) {
        tracing::debug!(?event, "scaffold event");
        if !self.silent {
            println!("{event}");
        }
    }
}

/// 受け取った出来事を溜めておく (テスト用)
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<ScaffoldEvent>,
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn report(&mut self, event: ScaffoldEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_events_as_single_lines() {
        colored::control::set_override(false);

        let line = ScaffoldEvent::HandlerAdded {
            module: "user".into(),
            handler: "executeList".into(),
        }
        .to_string();
        assert_eq!(line, "    handler added: user::executeList");

        let line = ScaffoldEvent::DuplicateUrl {
            url: "/same".into(),
            actions: vec!["m/a".into(), "m/b".into()],
        }
        .to_string();
        assert_eq!(line, "  duplicate url: /same (m/a, m/b)");
        assert!(!line.contains('\n'));
    }
}
