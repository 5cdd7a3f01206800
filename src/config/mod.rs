// Static configuration tables.
// Endpoint paths, cache TTLs, roles, feature flags and organization constants.

pub mod args;

use std::time::Duration;

use crate::cache::DEFAULT_TTL;

pub use args::{Args, Command};

/// Default API base URL when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8888";

/// Named API endpoint paths plus the base URL they are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: String,
    pub stats_public: String,
    pub events_public: String,
    pub blog_public: String,
    pub partners: String,
    pub newsletter: String,
    pub contact: String,
    pub events_admin: String,
}

impl Endpoints {
    /// Standard endpoint table rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            stats_public: "/api/stats/public".to_string(),
            events_public: "/api/events/public".to_string(),
            blog_public: "/api/blog/public".to_string(),
            partners: "/api/partners".to_string(),
            newsletter: "/api/newsletter/subscribe".to_string(),
            contact: "/api/contact".to_string(),
            events_admin: "/api/admin/events".to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Per-resource cache lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    pub default: Duration,
    pub stats: Duration,
    pub events: Duration,
    pub blog: Duration,
    pub partners: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            default: DEFAULT_TTL,
            stats: Duration::from_secs(5 * 60),
            events: Duration::from_secs(10 * 60),
            blog: Duration::from_secs(15 * 60),
            partners: Duration::from_secs(60 * 60),
        }
    }
}

/// Administrative role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    ChapterAdmin,
    NationalAdmin,
    SuperAdmin,
}

/// Roles allowed into the admin site.
pub const ADMIN_ROLES: [Role; 3] = [Role::ChapterAdmin, Role::NationalAdmin, Role::SuperAdmin];

/// Action an admin role may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewDashboard,
    ManageEvents,
    ManageMembers,
    ManageBlog,
    ManageChapters,
    EditSite,
    ManageAdmins,
}

impl Role {
    /// Identifier used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ChapterAdmin => "chapter_admin",
            Role::NationalAdmin => "national_admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        ADMIN_ROLES.into_iter().find(|role| role.as_str() == value)
    }

    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::ChapterAdmin => &[ViewDashboard, ManageEvents, ManageMembers],
            Role::NationalAdmin => &[
                ViewDashboard,
                ManageEvents,
                ManageMembers,
                ManageBlog,
                ManageChapters,
            ],
            Role::SuperAdmin => &[
                ViewDashboard,
                ManageEvents,
                ManageMembers,
                ManageBlog,
                ManageChapters,
                EditSite,
                ManageAdmins,
            ],
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

/// Feature switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Serve canned data when public reads fail.
    pub fallback_data: bool,
    pub newsletter: bool,
    /// Repository file editing through the source-hosting relay.
    pub site_editor: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            fallback_data: true,
            newsletter: true,
            site_editor: true,
        }
    }
}

/// Organization constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppInfo {
    pub app_name: &'static str,
    pub organization_name: &'static str,
    pub support_email: &'static str,
    pub support_phone: &'static str,
    pub default_blog_image: &'static str,
}

pub const APP_INFO: AppInfo = AppInfo {
    app_name: "KESNNUR Admin",
    organization_name: "KESNNUR",
    support_email: "kesnnur@gmail.com",
    support_phone: "+254791296924",
    default_blog_image: "/images/blog/default.jpg",
};

/// Backend-as-a-service connection settings, supplied at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}
