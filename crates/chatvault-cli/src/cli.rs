use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chatvault",
    about = "Inspect and maintain chat thread stores",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Storage configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List stored threads, newest id first
    List,
    /// Print one thread with its messages
    Show(ShowArgs),
    /// Store a thread read from a JSON file
    Put(PutArgs),
    /// Delete a thread
    Delete(DeleteArgs),
    /// Rebuild the header index from the thread objects
    Reindex,
    /// Print a fresh time-ordered thread id
    NewId,
}

#[derive(Args)]
pub struct ShowArgs {
    pub thread_id: String,
}

#[derive(Args)]
pub struct PutArgs {
    /// JSON document holding one thread record
    pub file: PathBuf,
    /// Replace the record's title before storing it
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub thread_id: String,
}
