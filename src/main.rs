//! kesnnur-admin - API client and proxy functions for the KESNNUR admin site

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kesnnur_admin::{
    api::{ApiClient, ClientConfig, RequestOptions},
    auth::TokenScope,
    config::{APP_INFO, Args, Command, Endpoints, FeatureFlags},
    server::{self, CORS_PROXY_PATH, ProxyState, SOURCE_PROXY_PATH},
    util::Notification,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("kesnnur_admin={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let flags = args.feature_flags();

    match &args.command {
        Command::Serve(serve) => {
            if let Err(e) = serve.validate() {
                error!("Configuration error: {}", e);
                std::process::exit(1);
            }

            info!("{} proxy", APP_INFO.app_name);
            info!("Listen: {}", serve.listen);
            info!("Backend: {}", serve.supabase().url);
            info!(
                "Repository: {}/{}@{}",
                serve.github_owner, serve.github_repo, serve.github_branch
            );
            info!("Routes: {} {}", CORS_PROXY_PATH, SOURCE_PROXY_PATH);

            let state = Arc::new(ProxyState::from_args(serve, flags)?);
            server::run(state, serve.listen).await?;
        }
        Command::Fetch {
            endpoint,
            params,
            attempts,
        } => {
            let client = build_client(&args, flags)?;
            let mut options = RequestOptions::get().max_attempts(*attempts);
            for (key, value) in params {
                options = options.param(key.clone(), value);
            }
            if let Some(token) = client.auth_token() {
                options = options.bearer(&token);
            }

            match client.request(endpoint, options).await {
                Ok(payload) => println!("{}", payload),
                Err(e) => {
                    Notification::error(format!("Request failed: {}", e)).emit();
                    std::process::exit(1);
                }
            }
        }
        Command::Login { token, remember } => {
            let client = build_client(&args, flags)?;
            match client.set_auth_token(token, *remember)? {
                TokenScope::Durable => Notification::success("Token saved").emit(),
                TokenScope::Session => warn!(
                    "Session tokens end with this process; pass --remember to keep the token"
                ),
            }
        }
        Command::Logout => {
            let client = build_client(&args, flags)?;
            client.clear_auth_token()?;
            Notification::info("Signed out").emit();
        }
        Command::Status => {
            let client = build_client(&args, flags)?;
            if client.is_authenticated() {
                Notification::info("Authenticated").emit();
            } else {
                Notification::warning("Not authenticated").emit();
            }
        }
    }

    Ok(())
}

fn build_client(args: &Args, flags: FeatureFlags) -> anyhow::Result<ApiClient> {
    let config = ClientConfig::with_flags(Endpoints::new(&args.base_url), flags);
    Ok(ApiClient::new(config)?)
}
