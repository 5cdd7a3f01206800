// Canned data for public read endpoints.
// Served only after every attempt against the live endpoint has failed.

use std::collections::HashMap;

use chrono::{Duration, Utc};

use crate::config::{APP_INFO, Endpoints};

use super::payload::Payload;
use super::types::{BlogPost, EventCategory, EventStatus, EventSummary, Stats};

/// Endpoints that have a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackEndpoint {
    PublicStats,
    PublicEvents,
    PublicBlog,
}

/// Typed substitute payload, one variant per response shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackPayload {
    Stats(Stats),
    Events(Vec<EventSummary>),
    Blog(Vec<BlogPost>),
}

impl FallbackEndpoint {
    /// Build the substitute payload. Dates are relative to now.
    pub fn payload(&self) -> FallbackPayload {
        let now = Utc::now();
        match self {
            FallbackEndpoint::PublicStats => FallbackPayload::Stats(Stats {
                members: 1500,
                events: 50,
                chapters: 24,
                registered: 100,
            }),
            FallbackEndpoint::PublicEvents => FallbackPayload::Events(vec![
                EventSummary {
                    id: "fallback-1".to_string(),
                    title: "Clinical Skills Workshop".to_string(),
                    description: Some(
                        "Hands-on training on advanced clinical procedures".to_string(),
                    ),
                    date: now + Duration::days(7),
                    location: Some("KNH Training Center, Nairobi".to_string()),
                    category: EventCategory::Workshop,
                    status: EventStatus::Upcoming,
                    color: Some("from-blue-600 to-blue-400".to_string()),
                },
                EventSummary {
                    id: "fallback-2".to_string(),
                    title: "Annual Nursing Conference".to_string(),
                    description: Some("Networking with industry leaders".to_string()),
                    date: now + Duration::days(14),
                    location: Some("Virtual & On-site".to_string()),
                    category: EventCategory::Conference,
                    status: EventStatus::Upcoming,
                    color: Some("from-teal-600 to-teal-400".to_string()),
                },
            ]),
            FallbackEndpoint::PublicBlog => FallbackPayload::Blog(vec![BlogPost {
                id: "fallback-1".to_string(),
                title: "Balancing Studies and Clinical Rotations".to_string(),
                excerpt: Some("Practical tips for nursing students".to_string()),
                content: Some("Full article content here...".to_string()),
                author: Some("Jane Mwangi".to_string()),
                category: Some("student-life".to_string()),
                created_at: now,
                image: Some(APP_INFO.default_blog_image.to_string()),
            }]),
        }
    }
}

impl FallbackPayload {
    /// Render as the JSON payload a live response would have produced.
    pub fn into_payload(self) -> Result<Payload, serde_json::Error> {
        let value = match self {
            FallbackPayload::Stats(stats) => serde_json::to_value(stats)?,
            FallbackPayload::Events(events) => serde_json::to_value(events)?,
            FallbackPayload::Blog(posts) => serde_json::to_value(posts)?,
        };
        Ok(Payload::Json(value))
    }
}

/// Resolves endpoint paths to fallback endpoints.
#[derive(Debug, Clone, Default)]
pub struct FallbackTable {
    routes: HashMap<String, FallbackEndpoint>,
}

impl FallbackTable {
    /// No fallbacks; every exhausted request fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fallbacks for the public stats, events and blog endpoints.
    pub fn standard(endpoints: &Endpoints) -> Self {
        let routes = [
            (&endpoints.stats_public, FallbackEndpoint::PublicStats),
            (&endpoints.events_public, FallbackEndpoint::PublicEvents),
            (&endpoints.blog_public, FallbackEndpoint::PublicBlog),
        ]
        .into_iter()
        .map(|(path, endpoint)| (path.clone(), endpoint))
        .collect();
        Self { routes }
    }

    /// Fallback endpoint for an exact endpoint path.
    pub fn resolve(&self, endpoint: &str) -> Option<FallbackEndpoint> {
        self.routes.get(endpoint).copied()
    }

    pub fn lookup(&self, endpoint: &str) -> Option<FallbackPayload> {
        self.resolve(endpoint).map(|e| e.payload())
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
