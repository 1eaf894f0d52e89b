// ── Connectivity snapshot ──

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reachability of the catalog service as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectivityState {
    pub is_online: bool,
    pub is_checking: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Default for ConnectivityState {
    /// Online until a probe says otherwise.
    fn default() -> Self {
        Self {
            is_online: true,
            is_checking: false,
            last_checked_at: None,
        }
    }
}
