//! Publisher session state
//!
//! The note.com session lives in an explicit object owned by the publisher
//! client rather than in process-wide state. Transitions:
//!
//! - `Unauthenticated | Expired` --login ok--> `Authenticated`
//! - `Authenticated` --publish ok--> `Authenticated`
//! - `Authenticated` --publish failure--> `Expired`

use chrono::{DateTime, Utc};

/// Where the publisher session currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No login attempted yet
    #[default]
    Unauthenticated,

    /// Logged in with a session cookie
    Authenticated {
        /// `name=value` cookie pair sent with every request
        token: String,
        /// When the login succeeded
        since: DateTime<Utc>,
    },

    /// A request failed; the next publish logs in again
    Expired,
}

/// Login state for the publisher backend
#[derive(Debug, Clone, Default)]
pub struct PublisherSession {
    status: SessionStatus,
}

impl PublisherSession {
    /// Create an unauthenticated session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// The session cookie, only while authenticated
    pub fn token(&self) -> Option<&str> {
        match &self.status {
            SessionStatus::Authenticated { token, .. } => Some(token.as_str()),
            _ => None,
        }
    }

    /// Whether a login is required before publishing
    pub fn needs_login(&self) -> bool {
        self.token().is_none()
    }

    /// Record a successful login
    pub fn authenticate(&mut self, token: impl Into<String>) {
        self.status = SessionStatus::Authenticated {
            token: token.into(),
            since: Utc::now(),
        };
    }

    /// Record a failed request; the session must log in again
    pub fn expire(&mut self) {
        if !matches!(self.status, SessionStatus::Expired) {
            log::debug!("Publisher session expired (was {})", self.describe());
        }
        self.status = SessionStatus::Expired;
    }

    /// Human-readable summary for logs, never including the token
    pub fn describe(&self) -> String {
        match self.status() {
            SessionStatus::Unauthenticated => "unauthenticated".to_string(),
            SessionStatus::Expired => "expired".to_string(),
            SessionStatus::Authenticated { since, .. } => {
                format!("authenticated {}", relative_time(*since))
            }
        }
    }
}

fn relative_time(since: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(since);

    if duration.num_days() > 0 {
        format!("{} days ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{} hours ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{} minutes ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}
