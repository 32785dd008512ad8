mod animeindo;
mod oploverz;
mod zoro;

pub use animeindo::AnimeIndoProvider;
pub use oploverz::OploverzProvider;
pub use zoro::ZoroProvider;

use async_trait::async_trait;

use crate::upstream::{Result, types::QualitySet};

/// A secondary episode-stream mirror.
///
/// Each implementation owns its slug convention: given the canonical episode
/// slug and the episode title from the primary provider, it walks its own
/// candidate list in order and stops at the first non-empty result. Mirrors
/// are independent; one failing never affects the others.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Stable identifier used in server ids, e.g. "oploverz"
    fn id(&self) -> &'static str;

    /// Human-readable name shown in server labels
    fn name(&self) -> &'static str;

    async fn fetch_streams(&self, episode_slug: &str, episode_title: &str) -> Result<QualitySet>;
}
