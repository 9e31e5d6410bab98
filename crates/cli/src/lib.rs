use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use typeahead_protocol::{snapshot_json_schema, Phase, SessionSnapshot};
use typeahead_search::{QueryCache, SuggestConfig, TypeaheadHandle};

mod backend;
mod interactive;

pub use backend::BackendArgs;

#[derive(Parser)]
#[command(name = "typeahead")]
#[command(about = "Company search suggestions as you type", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML file with suggestion settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Quiet interval before a lookup, in milliseconds
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Maximum number of candidates shown
    #[arg(long, global = true)]
    max_results: Option<usize>,

    /// Cache TTL in seconds (0 disables reuse)
    #[arg(long, global = true)]
    cache_ttl_seconds: Option<u64>,

    #[command(flatten)]
    backend: BackendArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up suggestions for one piece of text and print the settled session
    Query(QueryArgs),

    /// Read one line per keystroke from stdin and stream session snapshots
    Interactive,

    /// Print the JSON schema of session snapshots
    Schema,
}

#[derive(Args)]
struct QueryArgs {
    /// Text as typed into the search box
    text: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest/hyper internals are only interesting when debugging transport
    if !cli.verbose {
        builder.filter_module("hyper_util", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = resolve_config(&cli)?;
    log::debug!("Suggestion settings: {config:?}");

    match cli.command {
        Commands::Query(args) => run_query(args, &cli.backend, &config).await?,
        Commands::Interactive => {
            let session = spawn_session(&cli.backend, &config)?;
            interactive::run(session).await?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&snapshot_json_schema())?);
        }
    }

    Ok(())
}

/// Defaults, then the config file, then flag overrides.
fn resolve_config(cli: &Cli) -> Result<SuggestConfig> {
    let mut config = match &cli.config {
        Some(path) => SuggestConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SuggestConfig::default(),
    };
    if let Some(debounce_ms) = cli.debounce_ms {
        config.debounce_ms = debounce_ms;
    }
    if let Some(max_results) = cli.max_results {
        config.max_results = max_results;
    }
    if let Some(ttl) = cli.cache_ttl_seconds {
        config.cache_ttl_secs = ttl;
    }
    config.validate().context("Invalid suggestion settings")?;
    Ok(config)
}

fn spawn_session(backend: &BackendArgs, config: &SuggestConfig) -> Result<TypeaheadHandle> {
    let provider = backend.build()?;
    let session = TypeaheadHandle::spawn(provider, QueryCache::from_config(config), config)?;
    Ok(session)
}

/// Phases in which nothing more will happen without new input.
pub(crate) const fn is_settled(phase: &Phase) -> bool {
    !matches!(phase, Phase::Typing | Phase::Loading)
}

async fn run_query(args: QueryArgs, backend: &BackendArgs, config: &SuggestConfig) -> Result<()> {
    let session = spawn_session(backend, config)?;
    session.text_changed(args.text.as_str()).await?;
    session.flush().await?;
    let snapshot = session.wait_for(|s| is_settled(&s.phase)).await?;
    session.shutdown().await?;

    print_snapshot(&snapshot, args.pretty)?;
    if let Phase::Error { query } = &snapshot.phase {
        bail!("Lookup for '{query}' failed");
    }
    Ok(())
}

pub(crate) fn print_snapshot(snapshot: &SessionSnapshot, pretty: bool) -> Result<()> {
    let line = if pretty {
        serde_json::to_string_pretty(snapshot)?
    } else {
        serde_json::to_string(snapshot)?
    };
    println!("{line}");
    Ok(())
}
