//! Dispatch - run requests from a `.http` document
//!
//! Reads config, wires storage and logging, then hands off to a subcommand.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::mpsc;

use dispatch::cli::{Cli, Command};
use dispatch::constants::{APP_VERSION, LOG_FILE};
use dispatch::messages::{ExecutionReport, ExecutorCommand};
use dispatch::models::ExecutionResult;
use dispatch::network::{Executor, ExecutorActor, ReqwestTransport};
use dispatch::{check_for_update, find_block_at_line, parse, report, Config, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let storage = Storage::new(&config);
    storage.ensure_dir()?;

    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(storage.data_dir(), LOG_FILE);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(config.tracing_level())
        .init();

    tracing::info!(version = APP_VERSION, command = ?cli.command, "Starting");

    match cli.command {
        Command::List { file } => {
            let document = read_document(&storage, file.as_deref())?;
            list(&document);
            Ok(())
        }
        Command::Run {
            file,
            line,
            json,
            include_headers,
        } => {
            let document = read_document(&storage, file.as_deref())?;
            run_at_line(&config, &document, line as usize, json, include_headers).await
        }
        Command::RunAll {
            file,
            json,
            include_headers,
        } => {
            let document = read_document(&storage, file.as_deref())?;
            run_all(&config, &document, json, include_headers).await
        }
        Command::Import { file } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            storage.save_document(&content)?;
            println!(
                "Imported {} request(s) into {}",
                parse(&content).len(),
                storage.document_path().display()
            );
            Ok(())
        }
        Command::Path => {
            println!("{}", storage.document_path().display());
            Ok(())
        }
        Command::CheckUpdate => check_update(&config).await,
    }
}

/// The given file, or the stored document when none is given
fn read_document(storage: &Storage, file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => Ok(storage.load_document()),
    }
}

fn list(document: &str) {
    let blocks = parse(document);
    if blocks.is_empty() {
        println!("No requests found");
        return;
    }
    for (index, block) in blocks.iter().enumerate() {
        println!("{}", report::format_block_line(index, block));
    }
}

async fn run_at_line(
    config: &Config,
    document: &str,
    line: usize,
    json: bool,
    include_headers: bool,
) -> Result<()> {
    let blocks = parse(document);
    let Some(block) = find_block_at_line(&blocks, line - 1) else {
        bail!("No request at line {}", line);
    };

    let executor = Executor::with_timeout(config.timeout())?;
    let result = executor.execute_block(block).await;
    print_result(&result, json, include_headers)?;

    if let Some(error) = result.error {
        bail!("Request failed: {}", error);
    }
    Ok(())
}

async fn run_all(config: &Config, document: &str, json: bool, include_headers: bool) -> Result<()> {
    let blocks = parse(document);
    if blocks.is_empty() {
        println!("No requests found");
        return Ok(());
    }

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ExecutorCommand>();
    let (report_tx, mut report_rx) = mpsc::unbounded_channel::<ExecutionReport>();

    let actor = ExecutorActor::new(Executor::with_timeout(config.timeout())?, report_tx);
    let actor_handle = tokio::spawn(actor.run(cmd_rx));

    for (id, block) in blocks.into_iter().enumerate() {
        let _ = cmd_tx.send(ExecutorCommand::Execute {
            id: id as u64,
            block,
        });
    }
    let _ = cmd_tx.send(ExecutorCommand::Shutdown);

    // Reports arrive in completion order
    let mut failed = 0usize;
    while let Some(report) = report_rx.recv().await {
        if report.result.is_error() {
            failed += 1;
        }
        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", report::format_report_heading(&report));
            println!("{}", report::format_result(&report.result, include_headers));
        }
    }
    actor_handle.await.context("Executor actor panicked")?;

    if failed > 0 {
        bail!("{} request(s) failed", failed);
    }
    Ok(())
}

fn print_result(result: &ExecutionResult, json: bool, include_headers: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", report::format_result(result, include_headers));
    }
    Ok(())
}

async fn check_update(config: &Config) -> Result<()> {
    if !config.check_updates {
        println!("Update checks are disabled in config");
        return Ok(());
    }

    let transport = ReqwestTransport::new(config.timeout())?;
    let info = check_for_update(&transport, APP_VERSION, &config.releases_url).await;
    if info.update_available {
        println!(
            "Update available: {} -> {} ({})",
            info.current_version, info.latest_version, info.release_url
        );
    } else if info.latest_version.is_empty() {
        println!("Could not determine the latest version (current: {})", info.current_version);
    } else {
        println!("Up to date ({})", info.current_version);
    }
    Ok(())
}
