//! Command-line arguments and environment handling.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;

use super::{DEFAULT_BASE_URL, FeatureFlags, SupabaseConfig};

/// KESNNUR admin toolkit: API client and credential-injecting proxies
#[derive(Parser, Debug, Clone)]
#[command(name = "kesnnur-admin")]
#[command(about = "Request/cache client and proxy functions for the KESNNUR admin site")]
pub struct Args {
    /// Base URL that relative API endpoints are resolved against
    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Disable canned fallback data for public endpoints
    #[arg(long, env = "NO_FALLBACK", default_value = "false", global = true)]
    pub no_fallback: bool,

    /// Unmount the source-hosting relay
    #[arg(long, env = "NO_SITE_EDITOR", default_value = "false", global = true)]
    pub no_site_editor: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Feature flags with the command-line switches applied.
    pub fn feature_flags(&self) -> FeatureFlags {
        FeatureFlags {
            fallback_data: !self.no_fallback,
            site_editor: !self.no_site_editor,
            ..FeatureFlags::default()
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the CORS relay and the source-hosting relay
    Serve(ServeArgs),

    /// Perform one request through the request/cache client
    Fetch {
        /// Endpoint path or absolute URL
        endpoint: String,

        /// Query parameter as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Maximum attempts before giving up
        #[arg(long, default_value = "3")]
        attempts: u32,
    },

    /// Store a bearer token
    Login {
        token: String,

        /// Keep the token across sessions
        #[arg(long)]
        remember: bool,
    },

    /// Remove any stored bearer token
    Logout,

    /// Show whether a bearer token is stored
    Status,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "127.0.0.1:8787")]
    pub listen: SocketAddr,

    /// Backend URL (informational, logged at startup)
    #[arg(long, env = "SUPABASE_URL", default_value = "")]
    pub supabase_url: String,

    /// Backend anonymous key injected by the CORS relay
    #[arg(long, env = "SUPABASE_ANON_KEY", default_value = "", hide_env_values = true)]
    pub supabase_anon_key: String,

    /// Token for the source-hosting API
    #[arg(long, env = "GITHUB_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, env = "GITHUB_OWNER", default_value = "kesnnur")]
    pub github_owner: String,

    #[arg(long, env = "GITHUB_REPO", default_value = "kesnnur")]
    pub github_repo: String,

    #[arg(long, env = "GITHUB_BRANCH", default_value = "main")]
    pub github_branch: String,

    #[arg(long, env = "GITHUB_API_BASE", default_value = "https://api.github.com")]
    pub github_api_base: String,
}

impl ServeArgs {
    pub fn supabase(&self) -> SupabaseConfig {
        SupabaseConfig {
            url: self.supabase_url.clone(),
            anon_key: self.supabase_anon_key.clone(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.supabase_anon_key.is_empty() {
            return Err("SUPABASE_ANON_KEY is required to run the CORS relay".to_string());
        }
        if self.github_owner.is_empty() || self.github_repo.is_empty() {
            return Err("GITHUB_OWNER and GITHUB_REPO must not be empty".to_string());
        }
        Ok(())
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}
