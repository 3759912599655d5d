mod config;
mod crr;
mod error;
mod fetch;
mod index;
mod parser;
mod text;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use config::Settings;
use crr::Crr;
use fetch::HttpFetcher;

#[derive(Parser)]
#[command(name = "crr_parser", about = "Cached article lookup for the EBA Capital Requirements Regulation")]
struct Cli {
    /// Directory holding the index snapshot and extracted media
    #[arg(long, env = "CRR_CACHE_DIR", global = true)]
    cache_dir: Option<PathBuf>,

    /// Listing page with one link per article
    #[arg(long, env = "CRR_HOMEPAGE", global = true)]
    homepage: Option<String>,

    /// Ignore any cached snapshot and rebuild the index
    #[arg(long, global = true)]
    fresh: bool,

    /// Save the index once at the end instead of after every change
    #[arg(long, global = true)]
    defer_save: bool,

    /// Keep the footnotes block in article bodies
    #[arg(long, global = true)]
    footnotes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every known article and whether it has been loaded
    List,
    /// Print the body lines of one article
    Article {
        /// Article number, e.g. 4 or 92a
        number: String,
    },
    /// Print the parsed point structure of one article as JSON
    Structure { number: String },
    /// Rebuild the article index from the homepage
    Rebuild,
    /// Fetch and parse articles that are not loaded yet
    Load {
        /// Max articles to load (default: all unloaded)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

impl Cli {
    fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            cache_dir: self.cache_dir.clone().unwrap_or(defaults.cache_dir),
            homepage_url: self.homepage.clone().unwrap_or(defaults.homepage_url),
            base_url: defaults.base_url,
            load_cached: !self.fresh,
            always_save: !self.defer_save,
            include_footnotes: self.footnotes,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = cli.settings();
    let index_path = settings.index_path();

    let mut crr = Crr::open(settings, HttpFetcher::new())
        .await
        .with_context(|| format!("Failed to open CRR index at {}", index_path.display()))?;

    match cli.command {
        Commands::List => {
            for a in crr.list_articles() {
                let flag = if a.loaded { " Loaded " } else { "Unloaded" };
                println!("{:<8} ({}): {}", a.number, flag, a.title);
            }
        }
        Commands::Article { number } => {
            for line in crr.article_body(&number).await? {
                println!("{}", line);
            }
        }
        Commands::Structure { number } => {
            let structure = crr.article_structure(&number).await?;
            println!("{}", serde_json::to_string_pretty(structure)?);
        }
        Commands::Rebuild => {
            crr.rebuild().await?;
            println!("Indexed {} articles.", crr.index().len());
        }
        Commands::Load { limit } => {
            let pending = crr.list_articles().filter(|a| !a.loaded).count();
            let total = limit.map_or(pending, |n| n.min(pending));

            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
                    .progress_chars("=> "),
            );
            let loaded = crr
                .load_unloaded(limit, |number| {
                    pb.set_message(format!("Article {}", number));
                    pb.inc(1);
                })
                .await;
            pb.finish_and_clear();
            println!("Loaded {} articles.", loaded?);
        }
    }

    crr.persist()?;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}
