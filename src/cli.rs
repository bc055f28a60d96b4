use clap::{Parser, Subcommand};

/// odata-endpoint: resolve demo OData service roots for test runs
#[derive(Parser)]
#[command(name = "odata-endpoint", version, about)]
pub struct Cli {
    /// Emit logs as JSON (also enabled by ODATA_LOG_JSON=1)
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Follow redirects for a canonical endpoint and print the live root
    Resolve {
        /// Canonical URI or catalogue name (e.g. odata-v2-rw)
        endpoint: String,
    },

    /// Print the root a fixture would use (read-only endpoints skip the network)
    Root {
        /// Canonical URI or catalogue name
        endpoint: String,
    },

    /// Apply the version-token normalization to an already resolved URI
    Rewrite { uri: String },

    /// List the known demo endpoints
    List {
        #[arg(long)]
        json: bool,
    },

    /// Resolve every known endpoint that needs it, concurrently
    ResolveAll,
}
