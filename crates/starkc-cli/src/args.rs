use clap::{Parser, Subcommand};
use starkc_core::config::{CompilerConfig, CoreConfig, OutputConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "starkc", version, about = "Compile Cairo contracts through a remote compiler")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "warn")]
    pub log: String,

    /// Remote compiler base URL.
    #[arg(long, global = true, env = "STARKC_ENDPOINT", default_value = "http://127.0.0.1:8000")]
    pub endpoint: String,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, env = "STARKC_TIMEOUT_MS", default_value_t = 60_000)]
    pub timeout_ms: u64,

    /// Workspace root; sources are read from and outputs written under it.
    #[arg(long, global = true, env = "STARKC_ROOT", default_value = ".")]
    pub root: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn core_config(&self) -> CoreConfig {
        CoreConfig {
            compiler: CompilerConfig {
                base_url: self.endpoint.clone(),
                timeout_ms: self.timeout_ms,
                ..CompilerConfig::default()
            },
            output: OutputConfig::default(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compile Cairo files to Sierra and CASM and register them in this session.
    Compile {
        /// Source files, relative to --root.
        #[arg(required = true)]
        files: Vec<String>,

        /// Continue with the remaining files after a failure.
        #[arg(long)]
        keep_going: bool,
    },

    /// Compute the class hash of a local Sierra contract class file.
    ClassHash {
        file: String,
    },

    /// Check configuration and endpoint reachability.
    Doctor,
}
