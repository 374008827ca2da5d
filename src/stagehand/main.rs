use chrono::Utc;
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use stagehand::api::SyncApi;
use stagehand::audit::FileAuditLog;
use stagehand::backup::BackupArchiver;
use stagehand::commands::{PullReport, PushReport};
use stagehand::config::Settings;
use stagehand::error::{Result, SyncError};
use stagehand::ledger::OperationLedger;
use stagehand::model::{format_bytes, ConflictRecord, HistoryEntry, SyncAction};
use stagehand::registry::StaticRegistry;
use std::path::PathBuf;

mod args;
use args::{Cli, Commands};

type Api = SyncApi<StaticRegistry, FileAuditLog>;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let api = init_api(&cli)?;

    match cli.command {
        Commands::Push {
            files,
            to,
            from,
            no_backup,
            force,
        } => handle_push(&api, &files, &from, &to, !no_backup, force),
        Commands::Pull {
            files,
            from,
            to,
            no_backup,
            force,
        } => handle_pull(&api, &files, &from, &to, !no_backup, force),
        Commands::Restore { backup, to } => handle_restore(&api, &backup, &to),
        Commands::Compare { files, from, to } => handle_compare(&api, &files, &from, &to),
        Commands::Conflicts { files, from, to } => handle_conflicts(&api, &files, &from, &to),
        Commands::Ls {
            env,
            folder,
            recursive,
        } => handle_ls(&api, &env, &folder, recursive),
        Commands::Envs => handle_envs(&api),
        Commands::Backups => handle_backups(&api),
        Commands::History {
            limit,
            user,
            action,
        } => handle_history(&api, limit, user, action),
        Commands::Stats => handle_stats(&api),
    }
}

fn init_api(cli: &Cli) -> Result<Api> {
    let env_file = cli
        .env_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(".env"));

    let proj_dirs = ProjectDirs::from("com", "stagehand", "stagehand")
        .ok_or_else(|| SyncError::Config("could not determine data directory".to_string()))?;
    let settings = Settings::load(&env_file, proj_dirs.data_dir())?;
    settings.ensure_dirs()?;

    let registry = settings.registry();
    let ledger = OperationLedger::open(settings.history_file.clone())?;
    let archiver =
        BackupArchiver::new(settings.backup_dir.clone()).with_max_backups(settings.max_backups);
    let audit = FileAuditLog::new(settings.log_file.clone());

    Ok(SyncApi::new(registry, ledger, archiver, audit, settings.user))
}

fn handle_push(
    api: &Api,
    files: &[String],
    from: &str,
    to: &[String],
    create_backup: bool,
    force: bool,
) -> Result<()> {
    let report = api.push(files, from, to, create_backup, force);
    render_push(&report);
    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn render_push(report: &PushReport) {
    for (env, files) in &report.success {
        println!(
            "{} {} file(s) pushed to {}",
            "ok".green().bold(),
            files.len(),
            env.bold()
        );
        for file in files {
            println!("   {}", file);
        }
        if let Some(backup) = report.backups.get(env) {
            println!("   {} {}", "backup:".blue(), backup);
        }
    }
    for (env, conflicts) in &report.conflicts {
        println!("{} {} blocked by conflicts", "!!".yellow().bold(), env.bold());
        render_conflicts(conflicts);
    }
    for (env, errors) in &report.file_errors {
        for error in errors {
            println!("{} {}: {}", "err".red().bold(), env, error);
        }
    }
    for error in &report.errors {
        println!("{} {}", "err".red().bold(), error);
    }
}

fn handle_pull(
    api: &Api,
    files: &[String],
    from: &str,
    to: &str,
    create_backup: bool,
    force: bool,
) -> Result<()> {
    let report = api.pull(files, from, to, create_backup, force)?;
    render_pull(&report, from, to);
    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn render_pull(report: &PullReport, from: &str, to: &str) {
    if !report.success.is_empty() {
        println!(
            "{} {} file(s) pulled from {} into {}",
            "ok".green().bold(),
            report.success.len(),
            from.bold(),
            to.bold()
        );
        for file in &report.success {
            println!("   {}", file);
        }
    }
    if let Some(backup) = &report.backup {
        println!("   {} {}", "backup:".blue(), backup);
    }
    if !report.conflicts.is_empty() {
        println!("{} pull blocked by conflicts", "!!".yellow().bold());
        render_conflicts(&report.conflicts);
    }
    for error in &report.errors {
        println!("{} {}", "err".red().bold(), error);
    }
}

fn render_conflicts(conflicts: &[ConflictRecord]) {
    for conflict in conflicts {
        println!("   {} — {}", conflict.file.bold(), conflict.message);
        if let (Some(source), Some(target)) = (&conflict.source_time, &conflict.target_time) {
            println!("     source: {}  target: {}", source, target);
        }
    }
}

fn handle_restore(api: &Api, backup: &str, to: &str) -> Result<()> {
    let extracted = api.restore(backup, to)?;
    println!(
        "{} {} file(s) restored from {} into {}",
        "ok".green().bold(),
        extracted.len(),
        backup,
        to.bold()
    );
    for file in &extracted {
        println!("   {}", file);
    }
    Ok(())
}

fn handle_compare(api: &Api, files: &[String], from: &str, to: &str) -> Result<()> {
    let report = api.compare(files, from, to)?;
    println!(
        "{} total — {} identical, {} different, {} new, {} not found",
        report.total,
        report.identical.to_string().green(),
        report.different.to_string().yellow(),
        report.new.to_string().blue(),
        report.not_found.to_string().red()
    );
    for record in &report.files {
        println!("  [{}] {}", record.comparison.status, record.file);
        if let (Some(source), Some(target)) = (&record.comparison.source, &record.comparison.target)
        {
            println!(
                "       source: {} ({})  target: {} ({})",
                source.modified, source.size_formatted, target.modified, target.size_formatted
            );
        }
    }
    Ok(())
}

fn handle_conflicts(api: &Api, files: &[String], from: &str, to: &str) -> Result<()> {
    let conflicts = api.check_conflicts(files, from, to)?;
    if conflicts.is_empty() {
        println!("{} no conflicts", "ok".green().bold());
    } else {
        println!("{} {} conflict(s)", "!!".yellow().bold(), conflicts.len());
        render_conflicts(&conflicts);
    }
    Ok(())
}

fn handle_ls(api: &Api, env: &str, folder: &str, recursive: bool) -> Result<()> {
    let files = api.list_files(env, folder, recursive)?;
    for file in &files {
        println!(
            "{:>10}  {}  {}",
            format_bytes(file.size),
            file.modified.format("%Y-%m-%d %H:%M:%S"),
            file.name
        );
    }
    println!("{} file(s)", files.len());
    Ok(())
}

fn handle_envs(api: &Api) -> Result<()> {
    for name in api.environments() {
        println!("{}", name);
    }
    Ok(())
}

fn handle_backups(api: &Api) -> Result<()> {
    let backups = api.list_backups()?;
    if backups.is_empty() {
        println!("no backups");
    }
    for name in backups {
        println!("{}", name);
    }
    Ok(())
}

fn handle_history(
    api: &Api,
    limit: usize,
    user: Option<String>,
    action: Option<String>,
) -> Result<()> {
    let action = match action.as_deref() {
        Some(s) => Some(
            s.parse::<SyncAction>()
                .map_err(SyncError::Config)?,
        ),
        None => None,
    };

    let entries = api.history(limit, user.as_deref(), action);
    if entries.is_empty() {
        println!("no history");
        return Ok(());
    }
    for entry in &entries {
        render_history_entry(entry);
    }
    Ok(())
}

fn render_history_entry(entry: &HistoryEntry) {
    let age = (Utc::now() - entry.timestamp)
        .to_std()
        .map(|d| timeago::Formatter::new().convert(d))
        .unwrap_or_else(|_| "just now".to_string());

    println!(
        "{} {} {} → {} by {} ({}, {})",
        entry.action.to_string().bold(),
        format!("{} file(s)", entry.file_count).dimmed(),
        entry.from,
        entry.to,
        entry.user.bold(),
        age,
        entry.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(backup) = &entry.backup_file {
        println!("   {} {}", "backup:".blue(), backup);
    }
}

fn handle_stats(api: &Api) -> Result<()> {
    let stats = api.stats();
    println!("{} {}", "total operations:".bold(), stats.total_operations);

    println!("{}", "by action:".bold());
    for (action, count) in &stats.by_action {
        println!("  {:<10} {}", action, count);
    }
    println!("{}", "by user:".bold());
    for (user, count) in &stats.by_user {
        println!("  {:<10} {}", user, count);
    }
    println!("{}", "by day:".bold());
    for (day, count) in &stats.by_day {
        println!("  {}  {}", day, count);
    }
    Ok(())
}
