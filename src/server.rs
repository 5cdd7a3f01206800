//! HTTP server for the proxy functions
//!
//! Uses hyper http1 with TokioIo; each connection is served on its own task.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::FeatureFlags;
use crate::config::args::ServeArgs;
use crate::error::Result;
use crate::github::RepoRef;
use crate::proxy::{CorsRelay, SourceRelay, error_body, respond};

/// Path of the generic CORS relay.
pub const CORS_PROXY_PATH: &str = "/cors-proxy";
/// Path of the source-hosting relay.
pub const SOURCE_PROXY_PATH: &str = "/github-api";

/// Largest request body the source relay accepts.
pub const MAX_SOURCE_BODY_BYTES: usize = 2 * 1024 * 1024;

// Serverless function paths that deployed pages still call.
const LEGACY_CORS_PROXY_PATH: &str = "/.netlify/functions/cors-proxy";
const LEGACY_SOURCE_PROXY_PATH: &str = "/functions/v1/github-api";

/// Shared proxy state
pub struct ProxyState {
    pub relay: CorsRelay,
    /// Absent when the site editor feature is off.
    pub source: Option<SourceRelay>,
}

impl ProxyState {
    pub fn from_args(args: &ServeArgs, flags: FeatureFlags) -> Result<Self> {
        let relay = CorsRelay::new(args.supabase().anon_key)?;
        let source = if flags.site_editor {
            let repo = RepoRef::new(&args.github_owner, &args.github_repo, &args.github_branch);
            Some(SourceRelay::new(
                args.github_token.as_deref(),
                repo,
                &args.github_api_base,
            )?)
        } else {
            None
        };
        Ok(Self { relay, source })
    }
}

/// Bind `listen` and serve until the process exits.
pub async fn run(state: Arc<ProxyState>, listen: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(listen).await?;
    info!("Proxy listening on {}", listener.local_addr()?);
    serve(listener, state).await
}

/// Accept loop over an already bound listener.
pub async fn serve(listener: TcpListener, state: Arc<ProxyState>) -> Result<()> {
    match &state.source {
        Some(source) if source.is_configured() => {
            info!("Source relay enabled at {}", SOURCE_PROXY_PATH)
        }
        Some(_) => warn!("Source relay mounted without a token"),
        None => info!("Source relay disabled"),
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<ProxyState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    debug!(%addr, %method, %path, "Request");

    let response = match path.as_str() {
        CORS_PROXY_PATH | LEGACY_CORS_PROXY_PATH => {
            state.relay.handle(&method, query.as_deref()).await
        }
        SOURCE_PROXY_PATH | LEGACY_SOURCE_PROXY_PATH => match &state.source {
            Some(source) => match read_body(req.into_body(), MAX_SOURCE_BODY_BYTES).await {
                Ok(body) => source.handle(&method, &body).await,
                Err(rejection) => {
                    warn!(%addr, status = %rejection.status(), "Rejected source relay body");
                    rejection
                }
            },
            None => not_found_response(&path),
        },
        _ => not_found_response(&path),
    };

    Ok(response)
}

/// Collect at most `limit` bytes of a request body.
async fn read_body<B>(body: B, limit: usize) -> std::result::Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(respond(
            StatusCode::PAYLOAD_TOO_LARGE,
            &[(CONTENT_TYPE, "application/json")],
            error_body("Request body too large"),
        )),
        Err(e) => {
            debug!(error = %e, "Failed to read request body");
            Err(respond(
                StatusCode::BAD_REQUEST,
                &[(CONTENT_TYPE, "application/json")],
                error_body("Failed to read request body"),
            ))
        }
    }
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });
    respond(
        StatusCode::NOT_FOUND,
        &[(CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}
