// Application state module
// Read-only state shared by every connection task

use super::types::Config;
use crate::http::ResponsePolicy;

/// Application state
pub struct AppState {
    pub config: Config,
    pub policy: ResponsePolicy,
}

impl AppState {
    /// State with the cross-origin isolation policy
    pub fn new(config: Config) -> Self {
        Self::with_policy(config, ResponsePolicy::cross_origin_isolated())
    }

    pub const fn with_policy(config: Config, policy: ResponsePolicy) -> Self {
        Self { config, policy }
    }
}
