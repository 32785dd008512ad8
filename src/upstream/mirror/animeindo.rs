use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::upstream::{
    HttpClient, Result, UpstreamError,
    slug::{self, SlugStyle},
    types::QualitySet,
};

/// The server this mirror is most reliable on; it takes the default slot
/// whenever present.
const PREFERRED_SERVER: &str = "B-TUBE";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EpisodeEnvelope {
    data: EpisodeData,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EpisodeData {
    #[serde(rename = "title")]
    _title: String,
    stream_links: Vec<NamedLink>,
    #[serde(rename = "download_links")]
    _download_links: Vec<NamedLink>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct NamedLink {
    server: String,
    url: String,
}

/// Anime Indo mirror: one entry per named server, slug convention
/// `{series}-episode-{n}` with an optional `-sub-indo` suffix
pub struct AnimeIndoProvider {
    http: HttpClient,
}

impl AnimeIndoProvider {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl super::StreamProvider for AnimeIndoProvider {
    fn id(&self) -> &'static str {
        "animeindo"
    }

    fn name(&self) -> &'static str {
        "Anime Indo"
    }

    async fn fetch_streams(&self, episode_slug: &str, episode_title: &str) -> Result<QualitySet> {
        let candidates = slug::candidates(episode_slug, episode_title, SlugStyle::AnimeIndo);
        let mut last_error = None;

        for candidate in candidates {
            debug!("Trying anime indo slug '{candidate}'");

            let envelope: EpisodeEnvelope = match self
                .http
                .get(&format!("/anime/stream/episode/{candidate}"))
                .await
            {
                Ok(envelope) => envelope,
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            };

            if envelope.data.stream_links.is_empty() {
                continue;
            }

            debug!("Anime Indo matched slug '{candidate}'");

            let mut set = QualitySet::default();
            for link in &envelope.data.stream_links {
                set.push(link.server.as_str(), link.url.trim());
            }

            set.default_url = envelope
                .data
                .stream_links
                .iter()
                .find(|link| link.server == PREFERRED_SERVER && !link.url.trim().is_empty())
                .or_else(|| envelope.data.stream_links.first())
                .map(|link| link.url.trim().to_string());

            return Ok(set);
        }

        Err(last_error.unwrap_or_else(|| {
            UpstreamError::NotFound(format!("No anime indo stream for {episode_slug}"))
        }))
    }
}
