mod cache;
mod comic;
mod http;
mod mirror;
mod normalize;
mod otakudesu;
mod ratelimit;
mod resolver;
mod slug;
mod types;

#[cfg(test)]
mod tests;

pub use cache::ResponseCache;
pub use comic::ComicProvider;
pub use http::{BROWSER_USER_AGENT, HttpClient};
pub use mirror::{AnimeIndoProvider, OploverzProvider, StreamProvider, ZoroProvider};
pub use normalize::{clean_image_url, dedup_entries, is_blacklisted, retain_listed};
pub use otakudesu::{HomeData, OtakudesuProvider};
pub use ratelimit::RateLimiter;
pub use resolver::StreamResolver;
pub use types::{
    ChapterImages, ChapterRef, ContentDetail, ContentItem, EpisodeRef, EpisodeStream,
    LatestEpisode, MangaDetail, MediaKind, QualityOption, QualitySet, ServerData, StreamServer,
};

/// Upstream result type
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Errors from upstream provider calls
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded, please wait")]
    RateLimited,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No stream available for {episode}: {source}")]
    NoStream { episode: String, source: String },
}
