use clap::ValueEnum;
use convoscope_engine::{RoleFacet, StatusFacet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum RoleArg {
    #[default]
    All,
    Assistant,
    User,
}

impl From<RoleArg> for RoleFacet {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::All => RoleFacet::All,
            RoleArg::Assistant => RoleFacet::Assistant,
            RoleArg::User => RoleFacet::User,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum StatusArg {
    #[default]
    All,
    Errors,
    Subagent,
    Text,
}

impl From<StatusArg> for StatusFacet {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::All => StatusFacet::All,
            StatusArg::Errors => StatusFacet::Errors,
            StatusArg::Subagent => StatusFacet::Subagent,
            StatusArg::Text => StatusFacet::Text,
        }
    }
}
