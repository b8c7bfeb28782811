use crate::types::{LogLevel, OutputFormat, RoleArg, StatusArg};
use clap::{Args, Parser, Subcommand};
use convoscope_engine::FilterFacets;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "convoscope")]
#[command(about = "Inspect, search and filter AI coding-agent session logs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: $CONVOSCOPE_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    /// Overrides RUST_LOG and the config file
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show session totals: turns, tool calls, sub-agents, tokens")]
    Summary { file: PathBuf },

    #[command(about = "List top-level turns, optionally narrowed by facets")]
    Turns {
        file: PathBuf,

        #[command(flatten)]
        facets: FacetArgs,
    },

    #[command(about = "Find turns whose content or nested sub-agents mention a query")]
    Search {
        file: PathBuf,

        query: String,

        #[command(flatten)]
        facets: FacetArgs,
    },

    #[command(about = "Show the sub-agent tree spawned by Task calls")]
    Tree { file: PathBuf },

    #[command(about = "List tool calls with their results")]
    Tools {
        file: PathBuf,

        /// Only calls issued inside the sub-agent spawned by this invocation id
        #[arg(long)]
        parent: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FacetArgs {
    #[arg(long, value_enum, default_value_t = RoleArg::All)]
    pub role: RoleArg,

    /// Tool name; repeat to match any of several
    #[arg(long = "tool")]
    pub tools: Vec<String>,

    #[arg(long, value_enum, default_value_t = StatusArg::All)]
    pub status: StatusArg,

    /// Exact model identifier
    #[arg(long)]
    pub model: Option<String>,
}

impl FacetArgs {
    pub fn resolve(&self) -> FilterFacets {
        FilterFacets {
            role: self.role.into(),
            tools: self.tools.iter().cloned().collect(),
            status: self.status.into(),
            model: self.model.clone(),
        }
    }
}
