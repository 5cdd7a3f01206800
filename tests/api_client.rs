// Request/cache client behavior against a scripted transport.
// Time is paused so TTLs and backoff delays are observed without waiting.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use kesnnur_admin::api::{
    ApiClient, ClientConfig, EventCategory, EventInput, EventStatus, OutboundRequest, Payload,
    RequestOptions, Transport, TransportResponse,
};
use kesnnur_admin::auth::TokenStore;
use kesnnur_admin::config::{CacheTtl, Endpoints, FeatureFlags};
use kesnnur_admin::error::ApiError;
use reqwest::{Method, StatusCode};
use serde_json::json;
use tokio::time::Instant;

enum Reply {
    Respond(TransportResponse),
    Drop(&'static str),
}

fn ok_json(value: serde_json::Value) -> Reply {
    Reply::Respond(TransportResponse::json(StatusCode::OK, &value))
}

fn status(code: u16, body: &'static str) -> Reply {
    Reply::Respond(TransportResponse::new(
        StatusCode::from_u16(code).unwrap(),
        Some("text/plain"),
        body,
    ))
}

#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(Instant, OutboundRequest)>>,
    latency: Duration,
}

impl ScriptedTransport {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> OutboundRequest {
        self.calls.lock().unwrap()[index].1.clone()
    }

    fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1].0 - w[0].0).collect()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, ApiError> {
        self.calls.lock().unwrap().push((Instant::now(), request));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Drop(message)) => Err(ApiError::Transport(message.to_string())),
            None => Err(ApiError::Transport("no scripted reply".to_string())),
        }
    }
}

fn client(transport: ScriptedTransport) -> ApiClient<ScriptedTransport> {
    ApiClient::with_transport(
        ClientConfig::new(Endpoints::new("https://api.test")),
        transport,
        TokenStore::in_memory(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_cached_get_skips_network_until_ttl() {
    let api = client(ScriptedTransport::new(vec![
        ok_json(json!({"n": 1})),
        ok_json(json!({"n": 2})),
    ]));
    let options = || RequestOptions::get().cached(Duration::from_secs(60));

    let first = api.request("/api/partners", options()).await.unwrap();
    tokio::time::advance(Duration::from_secs(59)).await;
    let second = api.request("/api/partners", options()).await.unwrap();

    assert_eq!(first, Payload::Json(json!({"n": 1})));
    assert_eq!(second, first);
    assert_eq!(api.transport().call_count(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    let third = api.request("/api/partners", options()).await.unwrap();
    assert_eq!(third, Payload::Json(json!({"n": 2})));
    assert_eq!(api.transport().call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_uncached_get_always_hits_network() {
    let api = client(ScriptedTransport::new(vec![
        ok_json(json!(1)),
        ok_json(json!(2)),
    ]));

    api.request("/api/partners", RequestOptions::get()).await.unwrap();
    api.request("/api/partners", RequestOptions::get()).await.unwrap();

    assert_eq!(api.transport().call_count(), 2);
    assert_eq!(api.cached_entries(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_parameter_order_shares_cache_entry() {
    let api = client(ScriptedTransport::new(vec![ok_json(json!(["x"]))]));

    let forward = RequestOptions::get()
        .param("a", 1)
        .param("b", 2)
        .cached(Duration::from_secs(60));
    let backward = RequestOptions::get()
        .param("b", 2)
        .param("a", 1)
        .cached(Duration::from_secs(60));

    let first = api.request("/api/events/public", forward).await.unwrap();
    let second = api.request("/api/events/public", backward).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(api.transport().call_count(), 1);
    assert_eq!(api.cached_entries(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_identical_gets_share_one_request() {
    let api = client(
        ScriptedTransport::new(vec![ok_json(json!({"shared": true}))])
            .with_latency(Duration::from_millis(100)),
    );

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let api = api.clone();
            tokio::spawn(async move { api.request("/api/partners", RequestOptions::get()).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result, Ok(Payload::Json(json!({"shared": true}))));
    }
    assert_eq!(api.transport().call_count(), 1);
    assert_eq!(api.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_failure() {
    let api = client(
        ScriptedTransport::new(vec![status(502, "bad gateway")])
            .with_latency(Duration::from_millis(50)),
    );

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let api = api.clone();
            tokio::spawn(async move {
                api.request("/api/partners", RequestOptions::get().max_attempts(1))
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.await.unwrap(),
            Err(ApiError::Status {
                status: 502,
                detail: "bad gateway".to_string()
            })
        );
    }
    assert_eq!(api.transport().call_count(), 1);
    assert_eq!(api.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_retry_succeeds_on_third_attempt_with_backoff() {
    let api = client(ScriptedTransport::new(vec![
        Reply::Drop("connection reset"),
        status(503, "unavailable"),
        ok_json(json!({"attempt": 3})),
    ]));

    let started = Instant::now();
    let result = api.request("/api/partners", RequestOptions::get()).await;

    assert_eq!(result, Ok(Payload::Json(json!({"attempt": 3}))));
    assert_eq!(api.transport().call_count(), 3);

    let gaps = api.transport().gaps();
    assert_eq!(gaps.len(), 2);
    assert_eq!(gaps[0].as_secs(), 2);
    assert_eq!(gaps[1].as_secs(), 4);
    assert_eq!(started.elapsed().as_secs(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_known_endpoint_returns_fallback() {
    let api = client(ScriptedTransport::new(vec![
        status(500, "one"),
        status(500, "two"),
        status(500, "three"),
    ]));

    let stats = api.get_stats().await.unwrap();

    assert_eq!(stats.members, 1500);
    assert_eq!(stats.events, 50);
    assert_eq!(api.transport().call_count(), 3);
    // Fallback data is not cached; the next call goes back to the network.
    assert_eq!(api.cached_entries(), 0);
    assert_eq!(api.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_unknown_endpoint_returns_last_failure() {
    let api = client(ScriptedTransport::new(vec![
        status(500, "one"),
        Reply::Drop("timed out"),
        status(404, ""),
    ]));

    let err = api
        .request("/api/partners", RequestOptions::get())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Status {
            status: 404,
            detail: "Not Found".to_string()
        }
    );
    assert_eq!(err.to_string(), "HTTP 404: Not Found");
    assert_eq!(api.pending_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fallbacks_can_be_disabled() {
    let api = ApiClient::with_transport(
        ClientConfig::new(Endpoints::new("https://api.test")).without_fallbacks(),
        ScriptedTransport::new(vec![Reply::Drop("down")]),
        TokenStore::in_memory(),
    );

    let result = api
        .request("/api/stats/public", RequestOptions::get().max_attempts(1))
        .await;
    assert_eq!(result, Err(ApiError::Transport("down".to_string())));
}

#[tokio::test(start_paused = true)]
async fn test_get_url_and_default_headers() {
    let api = client(ScriptedTransport::new(vec![ok_json(json!([]))]));

    api.request(
        "/api/events/public",
        RequestOptions::get()
            .param("status", "up coming")
            .param("limit", 3)
            .data(json!({"ignored": true}))
            .header("X-Requested-With", "custom"),
    )
    .await
    .unwrap();

    let sent = api.transport().request(0);
    assert_eq!(sent.method, Method::GET);
    assert_eq!(
        sent.url.as_str(),
        "https://api.test/api/events/public?limit=3&status=up+coming"
    );
    assert!(sent.body.is_none());
    assert_eq!(sent.headers["content-type"], "application/json");
    assert_eq!(sent.headers["x-requested-with"], "custom");
    assert_eq!(sent.headers["cache-control"], "no-cache");
}

#[tokio::test(start_paused = true)]
async fn test_absolute_url_and_json_body() {
    let api = client(ScriptedTransport::new(vec![Reply::Respond(
        TransportResponse::new(StatusCode::CREATED, Some("text/plain"), "subscribed"),
    )]));

    let result = api
        .request(
            "https://hooks.example.org/newsletter",
            RequestOptions::post(json!({"email": "a@b.co"}))
                .param("source", "footer")
                .cached(Duration::from_secs(60)),
        )
        .await;

    assert_eq!(result, Ok(Payload::Text("subscribed".to_string())));
    let sent = api.transport().request(0);
    assert_eq!(sent.method, Method::POST);
    // Parameters are only appended to GET requests.
    assert_eq!(sent.url.as_str(), "https://hooks.example.org/newsletter");
    let body: serde_json::Value = serde_json::from_slice(&sent.body.unwrap()).unwrap();
    assert_eq!(body, json!({"email": "a@b.co"}));
    // Writes are never cached.
    assert_eq!(api.cached_entries(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_base_url_fails_without_network() {
    let api = ApiClient::with_transport(
        ClientConfig::new(Endpoints::new("not a url")),
        ScriptedTransport::new(vec![]),
        TokenStore::in_memory(),
    );

    let err = api
        .request("/api/partners", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert_eq!(api.transport().call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_clear_cache_for_prefix_only() {
    let api = client(ScriptedTransport::new(vec![
        ok_json(json!(["event"])),
        ok_json(json!(["event", "filtered"])),
        ok_json(json!(["post"])),
    ]));
    let ttl = Duration::from_secs(600);

    api.request("/api/events/public", RequestOptions::get().cached(ttl))
        .await
        .unwrap();
    api.request(
        "/api/events/public",
        RequestOptions::get().param("limit", 3).cached(ttl),
    )
    .await
    .unwrap();
    api.request("/api/blog/public", RequestOptions::get().cached(ttl))
        .await
        .unwrap();
    assert_eq!(api.cached_entries(), 3);

    assert_eq!(api.clear_cache_for("/api/events"), 2);
    assert_eq!(api.cached_entries(), 1);

    // The blog entry is still served from cache.
    api.request("/api/blog/public", RequestOptions::get().cached(ttl))
        .await
        .unwrap();
    assert_eq!(api.transport().call_count(), 3);

    api.clear_cache();
    assert_eq!(api.cached_entries(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_clear_cache_during_flight_keeps_new_request_registered() {
    let api = client(
        ScriptedTransport::new(vec![ok_json(json!("old")), ok_json(json!("new"))])
            .with_latency(Duration::from_millis(100)),
    );

    let first = {
        let api = api.clone();
        tokio::spawn(async move { api.request("/api/partners", RequestOptions::get()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(api.pending_requests(), 1);

    api.clear_cache();
    assert_eq!(api.pending_requests(), 0);

    let second = {
        let api = api.clone();
        tokio::spawn(async move { api.request("/api/partners", RequestOptions::get()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(api.pending_requests(), 1);

    assert_eq!(first.await.unwrap(), Ok(Payload::Json(json!("old"))));
    // The older request settling must not remove the newer ledger entry.
    assert_eq!(api.pending_requests(), 1);
    assert_eq!(second.await.unwrap(), Ok(Payload::Json(json!("new"))));
    assert_eq!(api.pending_requests(), 0);
    assert_eq!(api.transport().call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_admin_write_sends_bearer_and_invalidates_events() {
    let api = client(ScriptedTransport::new(vec![ok_json(json!([]))]));
    api.get_events(3).await.unwrap();
    assert_eq!(api.cached_entries(), 1);

    api.set_auth_token("secret-token", false).unwrap();
    assert!(api.is_authenticated());
    api.transport().push(ok_json(json!({"id": "e1"})));

    let event = EventInput {
        title: "Clinical Skills Workshop".to_string(),
        description: "Hands-on training".to_string(),
        date: Utc::now(),
        location: "Nairobi".to_string(),
        category: EventCategory::Workshop,
        status: EventStatus::Upcoming,
    };
    let result = api.update_event("e1", &event).await.unwrap();

    assert_eq!(result, Payload::Json(json!({"id": "e1"})));
    let sent = api.transport().request(1);
    assert_eq!(sent.method, Method::PUT);
    assert_eq!(sent.url.as_str(), "https://api.test/api/admin/events/e1");
    assert_eq!(sent.headers["authorization"], "Bearer secret-token");
    assert_eq!(api.cached_entries(), 0);

    api.clear_auth_token().unwrap();
    assert!(!api.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_typed_events_request_parameters() {
    let api = client(ScriptedTransport::new(vec![ok_json(json!([{
        "id": "e9",
        "title": "Outreach",
        "date": "2025-06-01T08:00:00Z",
        "category": "outreach",
        "status": "upcoming"
    }]))]));

    let events = api.get_events(5).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].category, EventCategory::Outreach);

    let sent = api.transport().request(0);
    assert_eq!(
        sent.url.as_str(),
        "https://api.test/api/events/public?limit=5&status=upcoming"
    );
}

#[tokio::test(start_paused = true)]
async fn test_newsletter_flag_blocks_signup() {
    let flags = FeatureFlags {
        newsletter: false,
        ..FeatureFlags::default()
    };
    let api = ApiClient::with_transport(
        ClientConfig::with_flags(Endpoints::new("https://api.test"), flags),
        ScriptedTransport::new(vec![ok_json(json!({"ok": true}))]),
        TokenStore::in_memory(),
    );

    let err = api.subscribe_newsletter("a@b.co").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert_eq!(api.transport().call_count(), 0);

    let api = client(ScriptedTransport::new(vec![ok_json(json!({"ok": true}))]));
    api.subscribe_newsletter("a@b.co").await.unwrap();
    let sent = api.transport().request(0);
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.url.as_str(), "https://api.test/api/newsletter/subscribe");
}

#[test]
fn test_request_ttl_matches_config_default() {
    assert_eq!(RequestOptions::default().cache_ttl, CacheTtl::default().default);
}
