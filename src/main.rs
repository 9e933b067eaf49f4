// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cache;
mod config;
mod error;
mod fs;
mod model;
mod orphans;
mod parser;
mod report;
mod resolver;
mod stub;
mod synchronizer;

use cache::RouteTableCache;
use config::Config;
use error::ScaffoldError;
use fs::{DiskWorkspace, DryRunWorkspace};
use orphans::find_orphans;
use parser::parse_routes_in_file;
use report::{ConsoleReporter, Reporter, ScaffoldEvent};
use resolver::{find_duplicate_urls, resolve_route_table};
use synchronizer::synchronize;

/// CLI 引数定義
#[derive(Parser, Debug)]
#[command(
    name = "route-scaffolder",
    version,
    about = "ルート宣言ツリーを解決してキャッシュし、足りないコントローラ/テンプレートの雛形を生成する CLI ツール"
)]
struct Cli {
    /// アプリケーションのルートディレクトリ
    /// 例: `--base-dir /srv/my-app`
    #[arg(short = 'b', long = "base-dir", value_name = "DIR", default_value = ".")]
    base_dir: PathBuf,

    /// ルート宣言ファイル (既定: app/config/urls.json)
    #[arg(long = "routes", value_name = "FILE")]
    routes_file: Option<PathBuf>,

    /// ルート表キャッシュ (既定: app/cache/urls.cache.json)
    #[arg(long = "cache", value_name = "FILE")]
    cache_file: Option<PathBuf>,

    /// コントローラディレクトリ (既定: app/controller)
    #[arg(long = "controllers", value_name = "DIR")]
    controller_dir: Option<PathBuf>,

    /// テンプレートディレクトリ (既定: app/template)
    #[arg(long = "templates", value_name = "DIR")]
    template_dir: Option<PathBuf>,

    /// ログレベル (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// ルートを解決してキャッシュを更新し、足りない雛形を生成する
    Update {
        /// 作成したものを表示しない
        #[arg(short, long)]
        silent: bool,

        /// 何も書き込まずに、作成されるものだけを表示する
        #[arg(long)]
        dry_run: bool,

        /// URL の重複をエラーにする
        #[arg(long)]
        strict: bool,
    },

    /// キャッシュ済みのルート表を JSON で出力する
    Show,

    /// ルートから参照されていないコントローラ/テンプレートを一覧する
    Orphans,
}

fn main() -> Result<()> {
    // 1) CLI 引数をパース
    let cli = Cli::parse();

    // 2) ログは stderr へ (stdout は show の JSON 用)
    let filter = log_filter(&cli.log_level)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // 3) パス設定を組み立てる
    let config = Config::from_base_dir(&cli.base_dir)
        .context("failed to resolve base directory")?
        .with_overrides(
            cli.routes_file,
            cli.cache_file,
            cli.controller_dir,
            cli.template_dir,
        );
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Command::Update {
            silent,
            dry_run,
            strict,
        } => run_update(&config, silent, dry_run, strict),
        Command::Show => run_show(&config),
        Command::Orphans => run_orphans(&config),
    }
}

/// `--log-level` を EnvFilter に変換する。解釈できない値はエラー
fn log_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("invalid --log-level {level:?}"))
}

/// ルート宣言 → 解決 → キャッシュ → 雛形同期 を 1 回だけ実行する
fn run_update(config: &Config, silent: bool, dry_run: bool, strict: bool) -> Result<()> {
    let mut reporter = ConsoleReporter::new(silent);
    if !silent {
        let title = if dry_run {
            "Updating routes (dry run)..."
        } else {
            "Updating routes..."
        };
        println!("{}", title.green().bold());
    }

    // 1) ルート宣言を読み込む
    let tree = parse_routes_in_file(&config.routes_file).with_context(|| {
        format!(
            "failed to load route declaration {}",
            config.routes_file.display()
        )
    })?;

    // 2) 属性を継承させて平坦化
    let table = resolve_route_table(&tree).context("failed to resolve route tree")?;

    // 3) URL 重複の確認
    let duplicates = find_duplicate_urls(&table);
    if strict && !duplicates.is_empty() {
        return Err(ScaffoldError::DuplicateUrls(duplicates.into_keys().collect()).into());
    }
    for (url, actions) in duplicates {
        reporter.report(ScaffoldEvent::DuplicateUrl { url, actions });
    }

    // 4) キャッシュを置き換えてから雛形を同期する
    let summary = if dry_run {
        let mut workspace = DryRunWorkspace::new();
        let summary = synchronize(
            &table,
            &config.controller_dir,
            &config.template_dir,
            &mut workspace,
            &mut reporter,
        )
        .context("scaffolding synchronization failed")?;
        for path in workspace.pending_files() {
            tracing::info!(path = %path.display(), "would write");
        }
        summary
    } else {
        RouteTableCache::new(&config.cache_file)
            .write(&table)
            .context("failed to write route cache")?;
        synchronize(
            &table,
            &config.controller_dir,
            &config.template_dir,
            &mut DiskWorkspace,
            &mut reporter,
        )
        .context("scaffolding synchronization failed")?
    };

    if !reporter.is_silent() {
        println!();
        if summary.is_empty() {
            println!("  {} routes, scaffolding already up to date", table.len());
        } else {
            println!("  {} routes, {}", table.len(), summary);
        }
    }
    Ok(())
}

fn run_show(config: &Config) -> Result<()> {
    let cache = RouteTableCache::new(&config.cache_file);
    tracing::debug!(path = %cache.path().display(), "showing route cache");
    let table = cache.read()?;
    let json = serde_json::to_string_pretty(&table)?;
    println!("{}", json);
    Ok(())
}

fn run_orphans(config: &Config) -> Result<()> {
    let table = RouteTableCache::new(&config.cache_file).read()?;
    let orphans = find_orphans(&table, &config.controller_dir, &config.template_dir)
        .context("failed to scan source tree")?;

    if orphans.is_empty() {
        println!("{}", "No orphaned controllers or templates.".green());
        return Ok(());
    }
    for path in &orphans.controllers {
        println!("  {} {}", "controller:".yellow(), path.display());
    }
    for path in &orphans.templates {
        println!("  {} {}", "template:".yellow(), path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_accepts_levels_and_directives() {
        assert!(log_filter("debug").is_ok());
        assert!(log_filter("route_scaffolder=trace,warn").is_ok());
    }

    #[test]
    fn log_filter_rejects_garbage() {
        let err = log_filter("loud=[[").unwrap_err();
        assert!(err.to_string().contains("invalid --log-level"));
    }
}
