//! Path provider boundary.
//!
//! An external service turns (start, goal, membership) into an ordered tile
//! list. It is rate-limited and occasionally returns garbage; the walker
//! retries both conditions within a budget and treats anything beyond that
//! as fatal to the walk.

use ochre_core::Tile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The service's rate-limit sentinel. Retry after a short randomized
    /// backoff.
    #[error("path provider rate limit exceeded")]
    RateLimited,

    /// The response arrived but did not deserialize into a path.
    #[error("path response malformed: {0}")]
    Malformed(String),

    /// Transport-level failure reaching the service.
    #[error("path provider unreachable: {0}")]
    Unreachable(String),

    /// The retry budget ran out without a usable response.
    #[error("path provider retries exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Remote pathfinding service.
#[allow(async_fn_in_trait)]
pub trait PathProvider: Send + Sync {
    /// Requests an ordered tile path from `start` to `goal`. The first tile
    /// is the current position; `members` selects the walkable map set.
    async fn request_path(
        &self,
        start: Tile,
        goal: Tile,
        members: bool,
    ) -> Result<Vec<Tile>, ProviderError>;
}

/// Wire shape of a provider response body, for implementations that
/// deserialize JSON transports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResponse {
    pub path: Vec<Tile>,
}
