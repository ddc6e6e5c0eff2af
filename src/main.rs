use clap::Parser;
use geoquiz::app::App;
use geoquiz::config::QuizConfig;
use geoquiz::errors::QuizError;
use geoquiz::utils::paths::expand_home_path;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "geoquiz")]
#[command(about = "Name every country of a letter, with typo tolerance and hints")]
#[command(version)]
struct Cli {
    /// Candidate catalog (JSON)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// State file for progress and session snapshots
    #[arg(long)]
    state: Option<PathBuf>,

    /// Minimum similarity for an answer to count (0.5 to 1.0)
    #[arg(long)]
    threshold: Option<f64>,

    /// Keep state in memory only
    #[arg(long)]
    memory: bool,

    /// Start with this region filter
    #[arg(long)]
    filter: Option<String>,
}

async fn run(cli: Cli) -> Result<(), QuizError> {
    let mut config = QuizConfig::from_env()?;
    if let Some(path) = cli.catalog {
        config.catalog_path = expand_home_path(path);
    }
    if let Some(path) = cli.state {
        config.state_path = expand_home_path(path);
    }
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold)?;
    }
    config.in_memory |= cli.memory;

    let mut app = App::initialize(config)?;
    if let Some(tag) = cli.filter.as_deref() {
        app.engine.change_filter(tag)?;
    }
    if !app.restore.dropped.is_empty() {
        eprintln!(
            "geoquiz: ignored {} saved names unknown to this catalog",
            app.restore.dropped.len()
        );
    }
    geoquiz::repl::run_stdio(&mut app.engine).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("geoquiz: {}", err);
        std::process::exit(1);
    }
}
