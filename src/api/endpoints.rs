// Admin site endpoint functions.
// Typed wrappers over `ApiClient::request` for the public reads and admin writes.

use serde_json::json;

use crate::error::ApiError;

use super::client::ApiClient;
use super::options::RequestOptions;
use super::payload::Payload;
use super::transport::Transport;
use super::types::{BlogPost, ContactForm, EventInput, EventSummary, Partner, Stats};

impl<T: Transport> ApiClient<T> {
    /// Get the public headline numbers.
    pub async fn get_stats(&self) -> Result<Stats, ApiError> {
        let config = self.config();
        self.request(
            &config.endpoints.stats_public,
            RequestOptions::get().cached(config.cache_ttl.stats),
        )
        .await?
        .into_typed()
    }

    /// Get upcoming events.
    pub async fn get_events(&self, limit: u32) -> Result<Vec<EventSummary>, ApiError> {
        let config = self.config();
        let options = RequestOptions::get()
            .param("limit", limit)
            .param("status", "upcoming")
            .cached(config.cache_ttl.events);
        self.request(&config.endpoints.events_public, options)
            .await?
            .into_typed()
    }

    /// Get published blog posts.
    pub async fn get_blog_posts(&self, limit: u32) -> Result<Vec<BlogPost>, ApiError> {
        let config = self.config();
        let options = RequestOptions::get()
            .param("limit", limit)
            .param("published", true)
            .cached(config.cache_ttl.blog);
        self.request(&config.endpoints.blog_public, options)
            .await?
            .into_typed()
    }

    pub async fn get_partners(&self) -> Result<Vec<Partner>, ApiError> {
        let config = self.config();
        self.request(
            &config.endpoints.partners,
            RequestOptions::get().cached(config.cache_ttl.partners),
        )
        .await?
        .into_typed()
    }

    /// Subscribe `email` to the newsletter. Fails without a request when signups are disabled.
    pub async fn subscribe_newsletter(&self, email: &str) -> Result<Payload, ApiError> {
        if !self.config().flags.newsletter {
            return Err(ApiError::InvalidRequest(
                "Newsletter signup is disabled".to_string(),
            ));
        }
        self.request(
            &self.config().endpoints.newsletter,
            RequestOptions::post(json!({ "email": email })),
        )
        .await
    }

    pub async fn submit_contact(&self, form: &ContactForm) -> Result<Payload, ApiError> {
        let data = serde_json::to_value(form)?;
        self.request(&self.config().endpoints.contact, RequestOptions::post(data))
            .await
    }

    /// Create an event (requires an admin token).
    pub async fn create_event(&self, event: &EventInput) -> Result<Payload, ApiError> {
        let data = serde_json::to_value(event)?;
        let endpoint = self.config().endpoints.events_admin.clone();
        self.admin_write(&endpoint, RequestOptions::post(data)).await
    }

    /// Update an event (requires an admin token).
    pub async fn update_event(&self, id: &str, event: &EventInput) -> Result<Payload, ApiError> {
        let data = serde_json::to_value(event)?;
        let endpoint = format!("{}/{}", self.config().endpoints.events_admin, id);
        self.admin_write(&endpoint, RequestOptions::put(data)).await
    }

    /// Delete an event (requires an admin token).
    pub async fn delete_event(&self, id: &str) -> Result<Payload, ApiError> {
        let endpoint = format!("{}/{}", self.config().endpoints.events_admin, id);
        self.admin_write(&endpoint, RequestOptions::delete()).await
    }

    /// Send an authenticated write and drop cached event listings on success.
    ///
    /// A missing token is not checked here; the server rejects the request.
    async fn admin_write(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Payload, ApiError> {
        let options = match self.auth_token() {
            Some(token) => options.bearer(&token),
            None => options,
        };
        let payload = self.request(endpoint, options).await?;
        self.clear_cache_for(&self.config().endpoints.events_public);
        Ok(payload)
    }
}
