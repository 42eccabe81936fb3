//! Per-resource record of whether the last fetch succeeded.
//!
//! Route-entry guards consult it to skip re-fetching a resource an earlier
//! navigation already loaded. Entries never expire; a new session starts empty.

/// Status code recorded when a fetch fails without a response.
pub const STATUS_FAILED: u16 = 0;
/// Status code recorded for a successful fetch.
pub const STATUS_OK: u16 = 200;

/// Last fetch outcome for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResourceFetchStatus {
    api_code: String,
    status_code: u16,
}

#[derive(Debug, Default)]
pub struct FreshnessCache {
    statuses: Vec<ResourceFetchStatus>,
}

impl FreshnessCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True unless the last recorded status for `api_code` is non-zero.
    pub fn needs_reload(&self, api_code: &str) -> bool {
        !self
            .statuses
            .iter()
            .any(|s| s.api_code == api_code && s.status_code != STATUS_FAILED)
    }

    /// Replace the entry for `api_code`, or append one.
    pub fn record_status(&mut self, api_code: &str, status_code: u16) {
        match self.statuses.iter_mut().find(|s| s.api_code == api_code) {
            Some(existing) => existing.status_code = status_code,
            None => self.statuses.push(ResourceFetchStatus {
                api_code: api_code.to_string(),
                status_code,
            }),
        }
        tracing::trace!(api_code, status_code, "Recorded fetch status");
    }

    /// Drop every entry for `api_code` so the next check forces a reload.
    pub fn forget(&mut self, api_code: &str) {
        self.statuses.retain(|s| s.api_code != api_code);
    }
}
