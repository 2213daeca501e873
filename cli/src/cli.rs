use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use digest_core::{HttpMethod, RequestOptions, RuntimeMode, StateKey};

/// Top-level CLI parser for the `digest` binary.
#[derive(Debug, Parser)]
#[command(name = "digest", version, about = "Command-line client for the digest API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides DIGEST_BASE_URL and digest.toml)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token (overrides DIGEST_TOKEN and digest.toml)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Runtime mode: development, test or production
    #[arg(long, global = true)]
    pub mode: Option<RuntimeMode>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a request and print the JSON result
    Fetch(RequestArgs),
    /// Print the equivalent curl command without sending anything
    Curl(RequestArgs),
    /// Read or change persisted client state
    State {
        /// State file location
        #[arg(long, default_value = ".digest/state.json")]
        file: PathBuf,

        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Endpoint path relative to the base URL, or an absolute URL
    pub endpoint: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: HttpMethod,

    /// Extra header as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(short, long)]
    pub data: Option<String>,
}

impl RequestArgs {
    pub fn options(&self) -> RequestOptions {
        let mut options = RequestOptions::new(self.method);
        options.headers = self.headers.clone();
        options.body = self.data.clone();
        options
    }
}

#[derive(Debug, Subcommand)]
pub enum StateAction {
    /// Print a value (nothing if unset)
    Get { key: StateKey },
    /// Store a value
    Set { key: StateKey, value: String },
    /// Forget a value
    Remove { key: StateKey },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("header '{raw}' must look like 'Name: value'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header '{raw}' has an empty name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
