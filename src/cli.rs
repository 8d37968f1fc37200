//! Command-line interface

use std::path::PathBuf;

use clap::Parser;

/// Next Engine web console
#[derive(Parser, Debug)]
#[command(name = "ne-console")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "NE_CONSOLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "NE_CONSOLE_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "NE_CONSOLE_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "NE_CONSOLE_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "NE_CONSOLE_LOG_FORMAT")]
    pub log_format: Option<String>,
}
