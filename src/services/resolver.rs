//! Slug resolution
//!
//! The resolution state machine: LOOKUP → {NOT_FOUND | EXPIRED |
//! PASSWORD_REQUIRED | READY}. Lookup is the only suspension point and is
//! bounded by a short timeout; a slow or failing datastore produces the
//! distinct `LookupFailed` error, never a silent NOT_FOUND.
//!
//! Resolution itself has no side effects. Click recording happens in the
//! HTTP layer, only once an outcome of `Ready` has been reached.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::get_config;
use crate::storage::UrlStore;
use crate::utils::password::verify_password;

/// Terminal outcome of resolving a slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No live link for this slug; soft-deleted links land here too
    NotFound,
    /// The link exists but its expiry is in the past
    Expired,
    /// The link is gated; a password must be verified first
    PasswordRequired,
    /// Verification ran and the candidate did not match
    PasswordIncorrect,
    /// Redirect may proceed
    Ready(ResolvedTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Internal link id, handed to the click recorder
    pub id: String,
    pub target_url: String,
}

/// Transient datastore failure during resolution; maps to a 5xx
#[derive(Debug, Clone)]
pub struct LookupFailed {
    pub slug: String,
    pub reason: String,
}

impl std::fmt::Display for LookupFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lookup failed for slug '{}': {}", self.slug, self.reason)
    }
}

impl std::error::Error for LookupFailed {}

pub struct Resolver {
    store: Arc<UrlStore>,
    lookup_timeout: Duration,
}

impl Resolver {
    pub fn new(store: Arc<UrlStore>) -> Self {
        Self {
            store,
            lookup_timeout: Duration::from_millis(get_config().resolver.lookup_timeout_ms),
        }
    }

    /// Resolve a slug without a password candidate.
    ///
    /// The slug is matched verbatim (case-sensitive, no normalization).
    pub async fn resolve(&self, slug: &str) -> Result<Resolution, LookupFailed> {
        self.resolve_inner(slug, None).await
    }

    /// Resolve a slug with a password candidate (the POST verification
    /// step). For ungated links the candidate is ignored.
    pub async fn resolve_with_password(
        &self,
        slug: &str,
        candidate: &str,
    ) -> Result<Resolution, LookupFailed> {
        self.resolve_inner(slug, Some(candidate)).await
    }

    async fn resolve_inner(
        &self,
        slug: &str,
        candidate: Option<&str>,
    ) -> Result<Resolution, LookupFailed> {
        let lookup = self.store.find_active_by_slug(slug);

        let url = match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Err(_) => {
                return Err(LookupFailed {
                    slug: slug.to_string(),
                    reason: format!("lookup timed out after {:?}", self.lookup_timeout),
                });
            }
            Ok(Err(e)) => {
                return Err(LookupFailed {
                    slug: slug.to_string(),
                    reason: e.to_string(),
                });
            }
            Ok(Ok(None)) => {
                debug!("No live link for slug: {}", slug);
                return Ok(Resolution::NotFound);
            }
            Ok(Ok(Some(url))) => url,
        };

        // Expiry is evaluated here, at resolution time, so links go dark on
        // schedule without any background sweep.
        if url.is_expired(Utc::now()) {
            debug!("Link expired: {}", slug);
            return Ok(Resolution::Expired);
        }

        if let Some(ref hash) = url.password {
            let Some(candidate) = candidate else {
                return Ok(Resolution::PasswordRequired);
            };

            let matched = match verify_password(candidate, hash) {
                Ok(matched) => matched,
                Err(e) => {
                    // A malformed stored hash must not open the gate
                    warn!("Password verification error for slug {}: {}", slug, e);
                    false
                }
            };

            if !matched {
                return Ok(Resolution::PasswordIncorrect);
            }
        }

        Ok(Resolution::Ready(ResolvedTarget {
            id: url.id,
            target_url: url.target_url,
        }))
    }
}
