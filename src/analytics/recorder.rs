//! Detached click recording
//!
//! The redirect response must never wait on, or fail because of, analytics.
//! `ClickRecorder::record` captures raw request signals synchronously and
//! does everything else (classification, hashing, datastore writes) in a
//! spawned task with its own timeout and logging.

use std::sync::Arc;
use std::time::Duration;

use actix_web::HttpRequest;
use chrono::Utc;
use tracing::warn;

use super::{ClickEvent, ClickSink, UserAgentInfo};
use crate::config::get_config;
use crate::utils::ip::{extract_client_ip, hash_fingerprint, hash_ip};

/// Raw request signals, captured before the response is finished.
///
/// Only cheap string extraction happens here; derivation is deferred to the
/// background task.
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub accept_language: Option<String>,
    pub client_ip: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl ClickContext {
    pub fn from_request(req: &HttpRequest) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        };

        Self {
            user_agent: header("user-agent"),
            referrer: header("referer"),
            accept_language: header("accept-language"),
            client_ip: extract_client_ip(req),
            country: header("cf-ipcountry"),
            city: header("cf-ipcity"),
        }
    }
}

pub struct ClickRecorder {
    sink: Arc<dyn ClickSink>,
    record_timeout: Duration,
}

impl ClickRecorder {
    pub fn new(sink: Arc<dyn ClickSink>) -> Self {
        Self {
            sink,
            record_timeout: Duration::from_millis(get_config().analytics.record_timeout_ms),
        }
    }

    /// Record one click for a resolved link. Returns immediately; the write
    /// happens in a detached task and failures are logged, never surfaced.
    pub fn record(&self, url_id: String, ctx: ClickContext) {
        let sink = Arc::clone(&self.sink);
        let record_timeout = self.record_timeout;
        let log_ip = get_config().analytics.log_ip;

        tokio::spawn(async move {
            let event = build_event(url_id, ctx, log_ip);
            let id = event.url_id.clone();

            match tokio::time::timeout(record_timeout, sink.record_click(event)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Click recording failed for url {}: {}", id, e),
                Err(_) => warn!(
                    "Click recording timed out for url {} after {:?}",
                    id, record_timeout
                ),
            }
        });
    }
}

fn build_event(url_id: String, ctx: ClickContext, log_ip: bool) -> ClickEvent {
    let ua_info = ctx.user_agent.as_deref().map(UserAgentInfo::classify);

    // Prefer a real address digest; fall back to a request fingerprint when
    // the address is unavailable. The two are intentionally not comparable.
    let ip_hash = if log_ip {
        ctx.client_ip.as_deref().map(hash_ip).or_else(|| {
            hash_fingerprint(ctx.user_agent.as_deref(), ctx.accept_language.as_deref())
        })
    } else {
        None
    };

    ClickEvent {
        url_id,
        timestamp: Utc::now(),
        ip_hash,
        user_agent: ctx.user_agent,
        referrer: ctx.referrer,
        country: ctx.country,
        city: ctx.city,
        device: ua_info.as_ref().map(|i| i.device.to_string()),
        browser: ua_info.as_ref().map(|i| i.browser.to_string()),
        os: ua_info.as_ref().map(|i| i.os.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_event_full_context() {
        let ctx = ClickContext {
            user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0".to_string()),
            referrer: Some("https://news.example.com/".to_string()),
            accept_language: Some("en-US".to_string()),
            client_ip: Some("203.0.113.7".to_string()),
            country: Some("DE".to_string()),
            city: Some("Berlin".to_string()),
        };

        let event = build_event("url-1".to_string(), ctx, true);
        assert_eq!(event.url_id, "url-1");
        assert_eq!(event.ip_hash.as_deref(), Some(hash_ip("203.0.113.7")).as_deref());
        assert_eq!(event.device.as_deref(), Some("Desktop"));
        assert_eq!(event.browser.as_deref(), Some("Chrome"));
        assert_eq!(event.os.as_deref(), Some("Linux"));
        assert_eq!(event.country.as_deref(), Some("DE"));
    }

    #[test]
    fn test_build_event_falls_back_to_fingerprint() {
        let ctx = ClickContext {
            user_agent: Some("curl/8.4.0".to_string()),
            accept_language: Some("en".to_string()),
            client_ip: None,
            ..Default::default()
        };

        let event = build_event("url-2".to_string(), ctx, true);
        let expected = hash_fingerprint(Some("curl/8.4.0"), Some("en"));
        assert_eq!(event.ip_hash, expected);
    }

    #[test]
    fn test_build_event_empty_context() {
        let event = build_event("url-3".to_string(), ClickContext::default(), true);
        assert!(event.ip_hash.is_none());
        assert!(event.user_agent.is_none());
        assert!(event.device.is_none());
        assert!(event.browser.is_none());
        assert!(event.os.is_none());
    }

    #[test]
    fn test_build_event_ip_logging_disabled() {
        let ctx = ClickContext {
            client_ip: Some("203.0.113.7".to_string()),
            ..Default::default()
        };

        let event = build_event("url-4".to_string(), ctx, false);
        assert!(event.ip_hash.is_none());
    }
}
