use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use spendlens_analysis::{
    analyze, apply_filters, report, Categorizer, ClassifierConfig, FilterSelection,
};
use spendlens_assistant::Engine;
use spendlens_core::{extract_accounts, Category, Transaction};
use spendlens_ingest::parse_file;

#[derive(Parser, Debug)]
#[command(
    name = "spendlens",
    version,
    about = "Personal finance analysis over exported bank statements"
)]
struct Cli {
    /// TOML file overriding the built-in categorization rules
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import statements, categorize, and print an analysis
    Analyze {
        /// CSV or PDF statement files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Restrict to these institutions (repeatable)
        #[arg(long = "account")]
        accounts: Vec<String>,

        /// Restrict to these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List accounts derived from the imported statements
    Accounts {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Ask the assistant a one-shot question about the imported data
    Chat {
        /// The question to ask
        query: String,

        /// CSV or PDF statement files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { files, accounts, categories, json } => {
            let txns = load(&files, cli.rules.as_deref()).await?;
            let selection = FilterSelection {
                accounts,
                categories: categories
                    .iter()
                    .map(|c| Category::from_str(c).map_err(anyhow::Error::msg))
                    .collect::<Result<Vec<_>>>()?,
            };
            let filtered: Vec<Transaction> =
                apply_filters(&txns, &selection).into_iter().cloned().collect();
            let analysis = analyze(&filtered);
            if json {
                println!("{}", report::to_json(&analysis)?);
            } else {
                print!("{}", report::to_text(&analysis));
            }
        }

        Command::Accounts { files } => {
            let txns = load(&files, cli.rules.as_deref()).await?;
            for account in extract_accounts(&txns) {
                println!(
                    "{} ({}) — {} transactions, spend {}, income {}",
                    account.name,
                    account.kind,
                    account.txn_count,
                    report::money(account.total_spend),
                    report::money(account.total_income)
                );
            }
        }

        Command::Chat { query, files } => {
            let txns = load(&files, cli.rules.as_deref()).await?;
            let analysis = analyze(&txns);
            let accounts = extract_accounts(&txns);
            let today = chrono::Local::now().date_naive();
            let engine = Engine::train(txns, analysis, accounts, today);
            println!("{}", engine.respond(&query).text);
        }
    }

    Ok(())
}

/// Import every file, then run the categorizer over the combined set.
async fn load(files: &[PathBuf], rules: Option<&Path>) -> Result<Vec<Transaction>> {
    let mut txns = Vec::new();
    for file in files {
        let parsed = parse_file(file)
            .await
            .with_context(|| format!("importing {}", file.display()))?;
        tracing::info!(file = %file.display(), count = parsed.len(), "imported");
        txns.extend(parsed);
    }

    let config = match rules {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading rules file {}", path.display()))?;
            ClassifierConfig::from_toml(&text).map_err(anyhow::Error::msg)?
        }
        None => ClassifierConfig::default(),
    };
    Ok(Categorizer::new(config).categorize(txns))
}
