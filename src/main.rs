//! Wiki-Ripple main entry point
//!
//! This is the command-line interface for the Wiki-Ripple crawler.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wiki_ripple::config::{load_config_or_default, validate, Config};
use wiki_ripple::crawler::Coordinator;
use wiki_ripple::output::print_report;
use wiki_ripple::tokenizer::spawn_tokenizer;

/// What to write to stdout while crawling
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Only the final report
    None,
    /// One plain-text line per extracted page
    Lines,
    /// One word per line
    Words,
}

/// Wiki-Ripple: a bounded breadth-first wiki crawler
///
/// Starting from one page, Wiki-Ripple fetches pages, strips them to body
/// text, follows in-wiki links breadth-first and stops after a fixed number
/// of fetch attempts.
#[derive(Parser, Debug)]
#[command(name = "wiki-ripple")]
#[command(version)]
#[command(about = "A bounded breadth-first wiki crawler", long_about = None)]
struct Cli {
    /// Page to start crawling at (wiki path or absolute URL)
    #[arg(short = 's', long, value_name = "PAGE")]
    start_page: Option<String>,

    /// Language subdomain of the wiki
    #[arg(short = 'l', long)]
    language: Option<String>,

    /// Number of fetch attempts to make
    #[arg(short = 'n', long, value_name = "N")]
    fetch_budget: Option<usize>,

    /// Number of concurrent fetch loops sharing the budget
    #[arg(short = 'w', long, value_name = "N")]
    fetch_workers: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Stream extracted text to stdout
    #[arg(long, value_enum, default_value_t = Emit::None)]
    emit: Emit,

    /// Validate the configuration and show the crawl parameters without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(start_page) = &self.start_page {
            config.crawl.start_page = start_page.clone();
        }
        if let Some(language) = &self.language {
            config.crawl.language = language.clone();
        }
        if let Some(budget) = self.fetch_budget {
            config.crawl.fetch_budget = budget;
        }
        if let Some(workers) = self.fetch_workers {
            config.crawl.fetch_workers = workers;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to build default configuration".to_string(),
        }
    })?;
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid crawl parameters")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.emit, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_ripple=info,warn"),
            1 => EnvFilter::new("wiki_ripple=debug,info"),
            2 => EnvFilter::new("wiki_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so emitted text stays clean on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Wiki-Ripple Dry Run ===\n");

    println!("Crawl:");
    println!("  Start page: {}", config.seed_url());
    println!("  Fetch budget: {}", config.crawl.fetch_budget);
    println!("  Fetch workers: {}", config.crawl.fetch_workers);

    println!("\nSite:");
    println!("  Base URL: {}", config.base_url());
    println!("  Content prefix: {}", config.site.content_prefix);
    println!(
        "  Excluded namespaces: {}",
        config.site.excluded_namespaces.join(", ")
    );
    println!(
        "  Body markers: {} ... {}",
        config.site.body_start_marker, config.site.body_end_marker
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, emit: Emit, quiet: bool) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config).context("Failed to initialize crawler")?;
    let (mut lines, completion) = coordinator.start().into_parts();

    let emitted = match emit {
        Emit::None => {
            let mut count = 0usize;
            while lines.recv().await.is_some() {
                count += 1;
            }
            count
        }
        Emit::Lines => {
            let mut count = 0usize;
            while let Some(line) = lines.recv().await {
                println!("{}", line);
                count += 1;
            }
            count
        }
        Emit::Words => {
            let mut words = spawn_tokenizer(lines);
            let mut count = 0usize;
            while let Some(word) = words.recv().await {
                println!("{}", word);
                count += 1;
            }
            count
        }
    };
    tracing::debug!("Text stream closed after {} item(s)", emitted);

    let report = completion.wait().await.context("Crawl failed")?;

    if !quiet {
        print_report(&report);
    }

    Ok(())
}
