use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chatvault_sdk::{mint_thread_id, open_store, StorageConfig, ThreadRecord, ThreadStore};
use colored::Colorize;
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::List => cmd_list(open(cli.config.as_deref())?, &cli.format).await,
        Command::Show(args) => cmd_show(open(cli.config.as_deref())?, args, &cli.format).await,
        Command::Put(args) => cmd_put(open(cli.config.as_deref())?, args).await,
        Command::Delete(args) => cmd_delete(open(cli.config.as_deref())?, args).await,
        Command::Reindex => cmd_reindex(open(cli.config.as_deref())?).await,
        Command::NewId => { println!("{}", mint_thread_id()); Ok(()) },
    }
}

fn open(config_path: Option<&Path>) -> anyhow::Result<Arc<dyn ThreadStore>> {
    let config = match config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading storage configuration");
            StorageConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?
        }
        None => {
            debug!("no configuration file given; using defaults");
            StorageConfig::default()
        }
    };
    debug!(backend = ?config.backend, "opening thread store");
    Ok(open_store(&config)?)
}

async fn cmd_list(store: Arc<dyn ThreadStore>, format: &OutputFormat) -> anyhow::Result<()> {
    let entries = store.list().await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No threads.");
            }
            for entry in &entries {
                let title = match &entry.title {
                    Some(title) => title.normal(),
                    None => "(untitled)".dimmed(),
                };
                println!("{}  {}", entry.thread_id.yellow(), title);
            }
        }
    }
    Ok(())
}

async fn cmd_show(
    store: Arc<dyn ThreadStore>,
    args: ShowArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let record = store
        .get(&args.thread_id)
        .await?
        .with_context(|| format!("thread {} not found", args.thread_id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => print_thread(&record),
    }
    Ok(())
}

fn print_thread(record: &ThreadRecord) {
    println!(
        "Thread {}  {}",
        record.thread_id.yellow().bold(),
        record.title.as_deref().unwrap_or("(untitled)").bold()
    );
    if let Some(model) = &record.model {
        println!("  Model: {}", model.cyan());
    }
    println!("  Messages: {}", record.message_count());
    for message in &record.messages {
        println!();
        let mut line = format!("[{}]", message.role).green().to_string();
        if let Some(ms) = message.response_time_ms {
            line.push_str(&format!(" {}", format!("{ms} ms").dimmed()));
        }
        println!("{line}");
        println!("{}", message.text);
        for attachment in &message.inline_data {
            println!("  {} {}", "attachment:".blue(), attachment.uri);
        }
    }
}

async fn cmd_put(store: Arc<dyn ThreadStore>, args: PutArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let mut record: ThreadRecord = serde_json::from_str(&text)
        .with_context(|| format!("parsing thread record from {}", args.file.display()))?;
    if let Some(title) = args.title {
        record.title = Some(title);
    }

    let record = store.write(record).await?;
    println!(
        "{} Stored thread {} ({} messages)",
        "✓".green().bold(),
        record.thread_id.yellow(),
        record.message_count()
    );
    Ok(())
}

async fn cmd_delete(store: Arc<dyn ThreadStore>, args: DeleteArgs) -> anyhow::Result<()> {
    store.delete(&args.thread_id).await?;
    println!("{} Deleted thread {}", "✓".green().bold(), args.thread_id.yellow());
    Ok(())
}

async fn cmd_reindex(store: Arc<dyn ThreadStore>) -> anyhow::Result<()> {
    match store.reindex().await? {
        Some(count) => println!("{} Index rebuilt: {} threads", "✓".green().bold(), count),
        None => println!(
            "The {} backend keeps no index; nothing to rebuild.",
            store.backend_name().bold()
        ),
    }
    Ok(())
}
