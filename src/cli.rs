use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dispatch", version, about = "Run HTTP requests written in a plain-text .http document", long_about = None)]
pub struct Cli {
    /// Config file (defaults to <config dir>/dispatch/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List the requests in a document
    List {
        /// Document to read (defaults to the stored document)
        file: Option<PathBuf>,
    },
    /// Run the request covering a line
    Run {
        file: Option<PathBuf>,
        /// 1-based line inside the request
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        line: u64,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
        /// Include response headers
        #[arg(short = 'i', long)]
        include_headers: bool,
    },
    /// Run every request in the document concurrently
    RunAll {
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
        #[arg(short = 'i', long)]
        include_headers: bool,
    },
    /// Replace the stored document with a file
    Import { file: PathBuf },
    /// Print the stored document path
    Path,
    /// Check for a newer release
    CheckUpdate,
}
