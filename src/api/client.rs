// Request/cache client.
// Caches GET responses, coalesces identical in-flight GETs, retries with backoff
// and falls back to canned data for known public endpoints.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Url;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use crate::auth::{TokenScope, TokenStore};
use crate::cache::{ResponseCache, cache_key};
use crate::config::{CacheTtl, Endpoints, FeatureFlags};
use crate::error::{self, ApiError};

use super::fallback::FallbackTable;
use super::options::RequestOptions;
use super::payload::Payload;
use super::transport::{HttpTransport, OutboundRequest, Transport};

/// Default backoff base; attempt `n` waits `base * 2^n`.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Injected configuration for an `ApiClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub fallbacks: FallbackTable,
    pub cache_ttl: CacheTtl,
    pub backoff_base: Duration,
    pub flags: FeatureFlags,
}

impl ClientConfig {
    /// Configuration with the standard fallback table.
    pub fn new(endpoints: Endpoints) -> Self {
        let fallbacks = FallbackTable::standard(&endpoints);
        Self {
            endpoints,
            fallbacks,
            cache_ttl: CacheTtl::default(),
            backoff_base: DEFAULT_BACKOFF_BASE,
            flags: FeatureFlags::default(),
        }
    }

    /// Configuration honouring the feature flags.
    pub fn with_flags(endpoints: Endpoints, flags: FeatureFlags) -> Self {
        let config = Self {
            flags,
            ..Self::new(endpoints)
        };
        if flags.fallback_data {
            config
        } else {
            config.without_fallbacks()
        }
    }

    pub fn without_fallbacks(mut self) -> Self {
        self.fallbacks = FallbackTable::empty();
        self
    }

    /// Delay before the retry that follows failed attempt `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

type SharedResult = Shared<BoxFuture<'static, Result<Payload, ApiError>>>;

/// In-flight GET that later callers with the same key join.
struct PendingRequest {
    generation: u64,
    result: SharedResult,
}

struct Inner<T> {
    config: ClientConfig,
    transport: T,
    cache: Mutex<ResponseCache>,
    pending: Mutex<HashMap<String, PendingRequest>>,
    next_generation: AtomicU64,
    tokens: TokenStore,
}

/// Client for the admin site API. Clones share cache, ledger and tokens.
pub struct ApiClient<T: Transport = HttpTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ApiClient<HttpTransport> {
    /// Client over reqwest with tokens in the user's data directory.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::with_transport(
            config,
            HttpTransport::new()?,
            TokenStore::from_default_location(),
        ))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T, tokens: TokenStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                cache: Mutex::new(ResponseCache::new()),
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                tokens,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Perform a request.
    ///
    /// Cached GETs are served without touching the network while younger than
    /// `cache_ttl`. A GET whose cache key is already in flight joins that
    /// request instead of issuing another. Failures are retried up to
    /// `max_attempts`; once exhausted, a known public endpoint resolves to its
    /// fallback payload and anything else returns the last failure.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Payload, ApiError> {
        let key = cache_key(endpoint, &options.params);

        if options.use_cache && options.is_get() {
            let hit = self.inner.cache().read_if_valid(&key, options.cache_ttl);
            if let Some(payload) = hit {
                debug!(endpoint, "Cache hit");
                return Ok(payload);
            }
        }

        if !options.is_get() {
            return Arc::clone(&self.inner)
                .execute(endpoint.to_string(), key, options, None)
                .await;
        }

        self.join_or_start(endpoint, key, options).await
    }

    /// Return the in-flight result for `key`, or start one on a spawned task.
    fn join_or_start(&self, endpoint: &str, key: String, options: RequestOptions) -> SharedResult {
        let mut pending = self.inner.pending();
        if let Some(existing) = pending.get(&key) {
            debug!(endpoint, "Joining in-flight request");
            return existing.result.clone();
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let task = tokio::spawn(Arc::clone(&self.inner).execute(
            endpoint.to_string(),
            key.clone(),
            options,
            Some(generation),
        ));
        let result = async move {
            task.await.unwrap_or_else(|e| {
                Err(ApiError::Transport(format!("request task failed: {}", e)))
            })
        }
        .boxed()
        .shared();

        pending.insert(
            key,
            PendingRequest {
                generation,
                result: result.clone(),
            },
        );
        result
    }

    /// Drop every cached response and forget in-flight requests.
    pub fn clear_cache(&self) {
        self.inner.cache().clear();
        self.inner.pending().clear();
    }

    /// Drop cached responses whose key starts with `endpoint`.
    pub fn clear_cache_for(&self, endpoint: &str) -> usize {
        let removed = self.inner.cache().invalidate_prefix(endpoint);
        debug!(endpoint, removed, "Invalidated cached responses");
        removed
    }

    pub fn cached_entries(&self) -> usize {
        self.inner.cache().len()
    }

    pub fn pending_requests(&self) -> usize {
        self.inner.pending().len()
    }

    pub fn auth_token(&self) -> Option<String> {
        self.inner.tokens.get()
    }

    pub fn set_auth_token(&self, token: &str, remember: bool) -> error::Result<TokenScope> {
        self.inner.tokens.set(token, remember)
    }

    pub fn clear_auth_token(&self) -> error::Result<()> {
        self.inner.tokens.clear()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.tokens.is_authenticated()
    }
}

impl<T: Transport> Inner<T> {
    fn cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, PendingRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn execute(
        self: Arc<Self>,
        endpoint: String,
        key: String,
        options: RequestOptions,
        generation: Option<u64>,
    ) -> Result<Payload, ApiError> {
        let outcome = match self.build_request(&endpoint, &options) {
            Ok(request) => {
                self.send_with_retry(&endpoint, request, options.attempt_budget())
                    .await
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(payload) => {
                if options.use_cache && options.is_get() {
                    self.cache().write(key.clone(), payload.clone());
                }
                self.settle(&key, generation);
                Ok(payload)
            }
            Err(err) => {
                self.settle(&key, generation);
                error!(endpoint = %endpoint, error = %err, "API request failed");
                self.fallback_or(&endpoint, err)
            }
        }
    }

    fn fallback_or(&self, endpoint: &str, err: ApiError) -> Result<Payload, ApiError> {
        let Some(fallback) = self.config.fallbacks.lookup(endpoint) else {
            return Err(err);
        };
        match fallback.into_payload() {
            Ok(payload) => {
                warn!(endpoint, "Using fallback data");
                Ok(payload)
            }
            Err(e) => {
                warn!(endpoint, error = %e, "Fallback data could not be rendered");
                Err(err)
            }
        }
    }

    /// Remove the ledger entry if it still belongs to this request.
    fn settle(&self, key: &str, generation: Option<u64>) {
        let Some(generation) = generation else {
            return;
        };
        let mut pending = self.pending();
        if pending.get(key).map(|p| p.generation) == Some(generation) {
            pending.remove(key);
        }
    }

    fn build_request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<OutboundRequest, ApiError> {
        let target = if has_scheme(endpoint) {
            endpoint.to_string()
        } else {
            format!("{}{}", self.config.endpoints.base_url, endpoint)
        };
        let mut url = Url::parse(&target)
            .map_err(|e| ApiError::InvalidRequest(format!("bad URL '{}': {}", target, e)))?;

        if options.is_get() && !options.params.is_empty() {
            url.query_pairs_mut().extend_pairs(options.params.iter());
        }

        let body = match &options.data {
            Some(data) if !options.is_get() => Some(serde_json::to_vec(data)?),
            _ => None,
        };

        Ok(OutboundRequest {
            method: options.method.clone(),
            url,
            headers: build_headers(&options.headers)?,
            body,
        })
    }

    async fn send_with_retry(
        &self,
        endpoint: &str,
        request: OutboundRequest,
        attempts: u32,
    ) -> Result<Payload, ApiError> {
        let mut last_error = ApiError::Transport("no attempt made".to_string());

        for attempt in 1..=attempts {
            match self.attempt(request.clone()).await {
                Ok(payload) => return Ok(payload),
                Err(err) => {
                    warn!(endpoint, attempt, attempts, error = %err, "Request attempt failed");
                    last_error = err;
                    if attempt < attempts {
                        tokio::time::sleep(self.config.backoff_delay(attempt)).await;
                    }
                }
            }
        }

        Err(last_error)
    }

    async fn attempt(&self, request: OutboundRequest) -> Result<Payload, ApiError> {
        let response = self.transport.send(request).await?;

        if !response.status.is_success() {
            let text = String::from_utf8_lossy(&response.body).into_owned();
            let detail = if text.is_empty() {
                response
                    .status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string()
            } else {
                text
            };
            return Err(ApiError::Status {
                status: response.status.as_u16(),
                detail,
            });
        }

        Payload::parse(response.content_type.as_deref(), &response.body)
    }
}

/// Default headers with caller headers layered on top.
fn build_headers(extra: &[(String, String)]) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    for (name, value) in extra {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidRequest(format!("header name '{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidRequest(format!("header '{}': {}", name, e)))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Whether the endpoint is an absolute URL (`scheme://...`).
fn has_scheme(endpoint: &str) -> bool {
    match endpoint.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
