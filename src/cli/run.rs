//! Command handlers: wire configuration, store, and engine together.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use super::args::{Arguments, Command, CommonArgs, ScanCommand, StatusCommand};
use super::exit_status::ExitStatus;
use crate::config::{CONFIG_FILE_NAME, ConfigLoadResult, default_config_json, load_config};
use crate::core::scan::{ScanOptions, Scanner};
use crate::core::store::{CategoryFilter, JsonStore, RecordStore};
use crate::report;

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Scan(cmd)) => scan(cmd),
        Some(Command::Status(cmd)) => status(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}

fn project_root(common: &CommonArgs) -> Result<PathBuf> {
    match &common.project_root {
        Some(root) => Ok(root.clone()),
        None => std::env::current_dir().context("Failed to resolve the current directory."),
    }
}

fn open_store(common: &CommonArgs, root: &Path, store_path: &str) -> Result<JsonStore> {
    let path = common
        .store
        .clone()
        .unwrap_or_else(|| root.join(store_path));
    JsonStore::open(&path)
}

fn scan(cmd: ScanCommand) -> Result<ExitStatus> {
    let root = project_root(&cmd.common)?;
    let ConfigLoadResult { config, from_file } = load_config(&root)?;
    if cmd.common.verbose && !from_file {
        eprintln!("note: no {} found, using defaults", CONFIG_FILE_NAME);
    }

    let store = open_store(&cmd.common, &root, &config.store_path)?;
    let locales = config.locale_set();
    let scanner = Scanner::new(&store, &locales, &config);
    let options = ScanOptions {
        templates: !cmd.forms_only,
        forms: !cmd.templates_only,
    };

    let summary = scanner.run(&root, options)?;
    store.flush()?;

    report::print_scan_summary(&summary);
    report::print_truncation_hint(&summary);

    Ok(if summary.has_errors() {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    })
}

fn status(cmd: StatusCommand) -> Result<ExitStatus> {
    let root = project_root(&cmd.common)?;
    let ConfigLoadResult { config, .. } = load_config(&root)?;
    let store = open_store(&cmd.common, &root, &config.store_path)?;

    let filter = match &cmd.category {
        Some(category) => CategoryFilter::Prefix(category.clone()),
        None => CategoryFilter::All,
    };
    let mut records = store.list_by_scope(&filter)?;
    if let Some(locale) = &cmd.locale {
        records.retain(|record| &record.locale_id == locale);
    }

    report::print_status_table(&records);
    Ok(ExitStatus::Success)
}

fn init() -> Result<ExitStatus> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }

    fs::write(config_path, default_config_json()?)?;
    println!("Created {}", CONFIG_FILE_NAME);
    Ok(ExitStatus::Success)
}
