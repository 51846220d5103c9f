use crate::blocklist::{Blocklist, FileStore};
use crate::config::SuggestConfig;
use crate::error::Result;
use crate::natural_sort::{SortOptions, SortValue, sort_naturally};
use crate::provider::QuickSuggest;
use crate::result::ResultItem;
use crate::suggest::{QueryContext, SuggestionStore};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "quicksuggest")]
#[command(about = "Resolve address-bar quick suggestions against a feed", long_about = None)]
pub struct Cli {
    /// TOML file with suggestion flags; defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Blocklist file; defaults to the platform data directory
    #[arg(short, long, global = true)]
    pub blocklist: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one query and print the merged results as JSON
    Query {
        search: String,
        /// Feed document: a JSON array of `{ "type", "attachment" }` batches
        #[arg(short, long)]
        feed: PathBuf,
        /// General (history) result URLs to merge with
        #[arg(long = "visit")]
        visits: Vec<String>,
        /// Query from a private browsing context
        #[arg(long)]
        private: bool,
    },
    /// Block a suggestion by its URL
    Block { url: String },
    /// Check whether a suggestion URL is blocked
    IsBlocked { url: String },
    /// Unblock every suggestion
    ClearBlocks,
    /// Sort values naturally and print one per line
    Sort {
        values: Vec<String>,
        #[arg(short = 'i', long)]
        insensitive: bool,
        /// Sentinel that sorts before every date
        #[arg(long)]
        session: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => SuggestConfig::load(path).await?,
            None => SuggestConfig::default(),
        };

        match self.command {
            Commands::Query {
                ref search,
                ref feed,
                ref visits,
                private,
            } => {
                let engine = QuickSuggest::new(self.open_blocklist().await?);
                load_feed_file(engine.store(), feed, config.data_type()).await?;

                let mut general = vec![ResultItem::heuristic_search("cli", search.as_str())];
                general.extend(
                    visits
                        .iter()
                        .map(|url| ResultItem::visit(url.as_str(), url.as_str())),
                );

                let ctx = QueryContext::new(search, &config).private(private);
                let output = engine.query(&ctx, general, &CancellationToken::new())?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).context("Failed to render results")?
                );
            }
            Commands::Block { ref url } => {
                self.open_blocklist().await?.add(url).await?;
                println!("blocked {}", url);
            }
            Commands::IsBlocked { ref url } => {
                let blocked = self.open_blocklist().await?.has(url);
                println!("{}", blocked);
            }
            Commands::ClearBlocks => {
                self.open_blocklist().await?.clear().await?;
                println!("cleared");
            }
            Commands::Sort {
                values,
                insensitive,
                session,
            } => {
                let mut values: Vec<SortValue> =
                    values.into_iter().map(SortValue::from).collect();
                let mut options = SortOptions::new().case_insensitive(insensitive);
                options.session = session;
                sort_naturally(&mut values, &options);
                for value in values {
                    println!("{}", value);
                }
            }
        }
        Ok(())
    }

    fn blocklist_path(&self) -> Result<PathBuf> {
        match &self.blocklist {
            Some(path) => Ok(path.clone()),
            None => match FileStore::default_path() {
                Some(path) => Ok(path),
                None => bail!("No data directory on this platform; pass --blocklist"),
            },
        }
    }

    async fn open_blocklist(&self) -> Result<Blocklist<FileStore>> {
        let path = self.blocklist_path()?;
        Blocklist::open(FileStore::new(&path))
            .await
            .with_context(|| format!("Failed to open blocklist at {}", path.display()))
    }
}

async fn load_feed_file(store: &SuggestionStore, path: &Path, data_type: &str) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read feed at {}", path.display()))?;
    let batches = SuggestionStore::parse_feed(&content)
        .with_context(|| format!("Invalid feed at {}", path.display()))?;
    let count = store.load_batches(&batches, data_type);
    tracing::info!("Loaded {} suggestions from {}", count, path.display());
    Ok(())
}
