//! ra-transcripts main entry point
//!
//! Command-line interface for searching and browsing transcribed material
//! held by Riksarkivet.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ra_transcripts::browse::{browse, BrowseRequest};
use ra_transcripts::clients::{Clients, SearchMode, SearchQuery, Sort};
use ra_transcripts::config::{load_config_or_default, Config, LOG_ENV};
use ra_transcripts::output::{
    format_http_stats, render_browse, render_search, truncate_to_token_budget,
};
use ra_transcripts::search::{enrich_hits, expand_with_padding, search};
use ra_transcripts::session::Session;
use ra_transcripts::{BrowseResult, RaError, SearchResult};

/// ra-transcripts: search and read Riksarkivet transcriptions
///
/// Searches the transcribed text of digitised archival material and fetches
/// full page transcriptions with links to page images and the online viewer.
#[derive(Parser, Debug)]
#[command(name = "ra-transcripts")]
#[command(version)]
#[command(about = "Search and browse Riksarkivet transcriptions", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Print HTTP request statistics to stderr when done
    #[arg(long, global = true)]
    stats: bool,

    /// Cut text output to about this many tokens
    #[arg(long, value_name = "TOKENS", global = true)]
    max_tokens: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search transcribed text (or catalogue metadata)
    Search(SearchArgs),
    /// Read full page transcriptions of one document
    Browse(BrowseArgs),
    /// Read commands from stdin, hiding pages already shown
    Shell,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Search keyword
    keyword: Option<String>,

    /// Match catalogue metadata instead of transcribed text
    #[arg(long)]
    metadata: bool,

    /// Include material that is not digitised (metadata search only)
    #[arg(long, requires = "metadata")]
    all_materials: bool,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    place: Option<String>,

    #[arg(long)]
    year_min: Option<i32>,

    #[arg(long)]
    year_max: Option<i32>,

    /// relevance, timeAsc, timeDesc, alphaAsc or alphaDesc
    #[arg(long, default_value = "relevance")]
    sort: Sort,

    /// Documents per page
    #[arg(long)]
    max: Option<u32>,

    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Page hits kept per document
    #[arg(long)]
    snippets: Option<u32>,

    /// Fetch full page text for up to this many hits
    #[arg(long, value_name = "PAGES")]
    enrich: Option<usize>,

    /// Add this many neighbouring pages around each hit
    #[arg(long, default_value_t = 0, requires = "enrich")]
    padding: u32,
}

#[derive(Args, Debug)]
struct BrowseArgs {
    /// Reference code, e.g. "SE/RA/420422/01"
    reference_code: String,

    /// Pages to read, e.g. "1-3,7"
    #[arg(short, long)]
    pages: Option<String>,

    /// Term to highlight in page text and viewer links
    #[arg(long)]
    highlight: Option<String>,

    /// Upper bound on pages fetched
    #[arg(long)]
    max_pages: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Invalid configuration".to_string(),
    })?;
    tracing::debug!("Configuration: {:?}", config);

    let clients = Clients::from_config(&config).context("Failed to build HTTP client")?;

    let outcome = match &cli.command {
        Command::Search(args) => handle_search(&cli, &config, &clients, args, &mut Session::new()).await,
        Command::Browse(args) => handle_browse(&cli, &config, &clients, args, &mut Session::new()).await,
        Command::Shell => handle_shell(&cli, &config, &clients).await,
    };

    if cli.stats {
        eprint!("{}", format_http_stats(&clients.http.stats()));
    }

    outcome
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RA_TRANSCRIPTS_LOG` takes precedence over the command-line flags.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("ra_transcripts=warn,warn"),
                1 => EnvFilter::new("ra_transcripts=info,warn"),
                2 => EnvFilter::new("ra_transcripts=debug,info"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn emit(cli: &Cli, text: String) {
    match cli.max_tokens {
        Some(budget) => print!("{}", truncate_to_token_budget(&text, budget)),
        None => print!("{}", text),
    }
}

fn build_query(config: &Config, args: &SearchArgs) -> SearchQuery {
    SearchQuery {
        keyword: args.keyword.clone(),
        mode: if args.metadata {
            SearchMode::Metadata
        } else {
            SearchMode::Transcribed
        },
        only_digitised: !args.all_materials,
        name: args.name.clone(),
        place: args.place.clone(),
        year_min: args.year_min,
        year_max: args.year_max,
        sort: args.sort,
        max: args.max.unwrap_or(config.search.max_results),
        offset: args.offset,
        max_snippets_per_document: Some(
            args.snippets
                .unwrap_or(config.search.max_snippets_per_document),
        ),
    }
}

/// Handles the search command
async fn handle_search(
    cli: &Cli,
    config: &Config,
    clients: &Clients,
    args: &SearchArgs,
    session: &mut Session,
) -> Result<()> {
    let query = build_query(config, args);
    let mut result = search(clients, &query).await?;

    if let Some(pages) = args.enrich {
        let padded = expand_with_padding(&result.hits, args.padding);
        result.hits = enrich_hits(clients, &padded, pages, query.keyword.as_deref()).await;
    }

    print_search(cli, config, &result, session)
}

fn print_search(cli: &Cli, config: &Config, result: &SearchResult, session: &mut Session) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let pagination = result.pagination();
    let plan = session.plan_search(result, config.search.max_display);
    emit(cli, render_search(&plan, &pagination));
    Ok(())
}

fn browse_request(config: &Config, args: &BrowseArgs) -> BrowseRequest {
    let mut request = BrowseRequest::new(args.reference_code.clone()).with_config(&config.browse);
    if let Some(pages) = &args.pages {
        request = request.with_pages(pages.clone());
    }
    if let Some(term) = &args.highlight {
        request = request.with_highlight(term.clone());
    }
    if let Some(max_pages) = args.max_pages {
        request.max_pages = max_pages;
    }
    request
}

/// Handles the browse command
async fn handle_browse(
    cli: &Cli,
    config: &Config,
    clients: &Clients,
    args: &BrowseArgs,
    session: &mut Session,
) -> Result<()> {
    let result = browse(clients, &browse_request(config, args)).await?;
    print_browse(cli, clients, &result, args.highlight.as_deref(), session)
}

fn print_browse(
    cli: &Cli,
    clients: &Clients,
    result: &BrowseResult,
    highlight: Option<&str>,
    session: &mut Session,
) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let plan = session.plan_browse(result);
    emit(cli, render_browse(&plan, highlight, &clients.endpoints));
    Ok(())
}

enum ShellLine {
    Blank,
    Quit,
    Command(std::result::Result<Command, clap::Error>),
}

/// Parses one shell line with the same argument rules as the subcommands
fn parse_shell_line(line: &str) -> ShellLine {
    let words = line.split_whitespace().collect::<Vec<_>>();
    let Some(command) = words.first() else {
        return ShellLine::Blank;
    };
    if matches!(*command, "quit" | "exit") {
        return ShellLine::Quit;
    }

    let argv = std::iter::once("ra-transcripts").chain(words.iter().copied());
    ShellLine::Command(Cli::try_parse_from(argv).map(|cli| cli.command))
}

/// Handles the shell command: one `search ...` or `browse ...` per line
///
/// A single session spans all lines, so repeated pages are shown as stubs.
/// Lines run one after another through the same handlers as the
/// subcommands. Errors are reported and the shell keeps reading.
async fn handle_shell(cli: &Cli, config: &Config, clients: &Clients) -> Result<()> {
    let mut session = Session::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let parsed = match parse_shell_line(&line) {
            ShellLine::Blank => continue,
            ShellLine::Quit => break,
            ShellLine::Command(parsed) => parsed,
        };

        let outcome = match parsed {
            Ok(Command::Search(args)) => handle_search(cli, config, clients, &args, &mut session).await,
            Ok(Command::Browse(args)) => handle_browse(cli, config, clients, &args, &mut session).await,
            Ok(Command::Shell) => Err(anyhow::anyhow!("Only search and browse are available in the shell")),
            Err(error) => Err(error.into()),
        };

        if let Err(error) = outcome {
            match error.downcast_ref::<RaError>() {
                Some(RaError::DocumentNotFound { reference_code }) => {
                    eprintln!("No document found for '{}'", reference_code)
                }
                _ => eprintln!("Error: {:#}", error),
            }
        }
    }

    tracing::info!(
        "Shell closed after showing {} pages from {} documents",
        session.browse.page_count() + session.search.page_count(),
        session.browse.document_count() + session.search.document_count()
    );
    Ok(())
}
