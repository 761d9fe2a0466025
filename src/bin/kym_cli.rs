//! Ad-hoc command-line client for the upstream meme API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use memevox::config;
use memevox::kym::{EntryTarget, KymClient, MemeSource};

#[derive(Parser)]
#[command(
    name = "kym-cli",
    about = "Query the meme knowledge base from the command line"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a keyword search and print the raw result records.
    Search {
        /// Keyword query.
        query: String,
        /// Maximum number of results.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Fetch a full entry by slug or URL and print it.
    Detail {
        /// Entry slug or full entry URL.
        target: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();
    let client = KymClient::new()?;

    match cli.command {
        Command::Search { query, limit } => {
            let results = client.search(&query, limit).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Detail { target } => {
            let target = parse_target(&target);
            let entry = client.fetch_entry(&target).await?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
    }

    Ok(())
}

fn parse_target(raw: &str) -> EntryTarget {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        EntryTarget::Url(raw.to_string())
    } else {
        EntryTarget::Slug(raw.to_string())
    }
}
