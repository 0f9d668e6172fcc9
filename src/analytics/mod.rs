pub mod recorder;
pub mod user_agent;

pub use recorder::{ClickContext, ClickRecorder};
pub use user_agent::UserAgentInfo;

use chrono::{DateTime, Utc};

/// One click record, derived per successful redirect
#[derive(Debug, Clone)]
pub struct ClickEvent {
    /// Internal id of the resolved link
    pub url_id: String,
    pub timestamp: DateTime<Utc>,
    /// Truncated one-way digest of the client address or request
    /// fingerprint, never a raw address
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    /// ISO 3166-1 alpha-2, from edge geo headers
    pub country: Option<String>,
    pub city: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
}

/// Destination for click events.
///
/// Implementations own persistence of both the counter increment and the
/// event row; callers treat every failure as non-fatal.
#[async_trait::async_trait]
pub trait ClickSink: Send + Sync {
    async fn record_click(&self, event: ClickEvent) -> anyhow::Result<()>;
}
