use super::args::{Cli, Commands};
use super::handlers;
use crate::logging;
use anyhow::{Result, bail};
use convoscope_runtime::{Config, IngestOutcome, IngestStats, SessionStore, load_session};
use std::path::Path;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    logging::init(cli.log_level, &config.log.level);

    match cli.command {
        Commands::Summary { file } => {
            let (store, stats) = load(&file, &config)?;
            handlers::summary::handle(&store, &stats, cli.format)
        }

        Commands::Turns { file, facets } => {
            let (store, _) = load(&file, &config)?;
            handlers::turns::handle(store.snapshot(), &facets.resolve(), cli.format)
        }

        Commands::Search {
            file,
            query,
            facets,
        } => {
            let (store, _) = load(&file, &config)?;
            handlers::search::handle(store.snapshot(), &query, &facets.resolve(), cli.format)
        }

        Commands::Tree { file } => {
            let (store, _) = load(&file, &config)?;
            handlers::tree::handle(store.snapshot(), cli.format)
        }

        Commands::Tools { file, parent } => {
            let (store, _) = load(&file, &config)?;
            handlers::tools::handle(store.snapshot(), parent.as_deref(), cli.format)
        }
    }
}

fn load(file: &Path, config: &Config) -> Result<(SessionStore, IngestStats)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (store, outcome) = runtime.block_on(load_session(file, config))?;

    match outcome {
        IngestOutcome::Completed { stats, .. } => Ok((store, stats)),
        IngestOutcome::Failed { failure, .. } => bail!("{}: {}", file.display(), failure),
        IngestOutcome::Aborted { .. } => bail!("{}: ingestion aborted", file.display()),
    }
}
