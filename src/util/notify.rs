// User-facing notifications.
// A banner model with its styling, rendered as an HTML fragment or logged.

use tracing::{error, info, warn};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl NotificationKind {
    /// Background class for the banner.
    pub fn css_class(&self) -> &'static str {
        match self {
            NotificationKind::Success => "bg-green-500",
            NotificationKind::Error => "bg-red-500",
            NotificationKind::Warning => "bg-yellow-500",
            NotificationKind::Info => "bg-blue-500",
        }
    }

    /// Font Awesome icon name.
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "check-circle",
            NotificationKind::Error => "exclamation-circle",
            NotificationKind::Warning => "exclamation-triangle",
            NotificationKind::Info => "info-circle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    /// Banner markup with the message escaped.
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                r#"<div class="fixed top-4 right-4 {} text-white px-6 py-3 rounded-lg shadow-lg z-50">"#,
                r#"<div class="flex items-center"><i class="fas fa-{} mr-3"></i><span>{}</span></div>"#,
                "</div>"
            ),
            self.kind.css_class(),
            self.kind.icon(),
            escape_html(&self.message)
        )
    }

    /// Log the notification at a level matching its kind.
    pub fn emit(&self) {
        match self.kind {
            NotificationKind::Error => error!("{}", self.message),
            NotificationKind::Warning => warn!("{}", self.message),
            NotificationKind::Success | NotificationKind::Info => info!("{}", self.message),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
