use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::upstream::{HttpClient, Result, UpstreamError, slug, types::QualitySet};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SearchPage {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SearchHit {
    id: String,
    #[serde(rename = "title")]
    _title: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AnimeInfo {
    episodes: Vec<EpisodeHit>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EpisodeHit {
    id: String,
    number: i64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct WatchData {
    sources: Vec<StreamSource>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StreamSource {
    quality: String,
    url: String,
}

/// Zoro mirror via the Consumet API. Unlike the slug-based mirrors it
/// resolves by series name and episode number, in three steps:
/// search -> info -> watch.
pub struct ZoroProvider {
    http: HttpClient,
}

impl ZoroProvider {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl super::StreamProvider for ZoroProvider {
    fn id(&self) -> &'static str {
        "zoro"
    }

    fn name(&self) -> &'static str {
        "Zoro"
    }

    async fn fetch_streams(&self, episode_slug: &str, episode_title: &str) -> Result<QualitySet> {
        let parsed = slug::parse(episode_slug).ok_or_else(|| {
            UpstreamError::Parse(format!("Cannot extract episode number from {episode_slug}"))
        })?;

        let number: i64 = parsed
            .number
            .parse()
            .map_err(|_| UpstreamError::Parse(format!("Invalid episode number in {episode_slug}")))?;

        let series = match slug::alias_for(&parsed.series) {
            Some(alias) => alias.to_string(),
            None if !episode_title.is_empty() => {
                let derived = slug::slug_from_title(episode_title);
                if derived.is_empty() {
                    parsed.series.clone()
                } else {
                    derived
                }
            }
            None => parsed.series.clone(),
        };

        debug!("Searching zoro for '{series}' episode {number}");

        let page: SearchPage = self.http.get(&format!("/anime/zoro/{series}?page=1")).await?;

        let hit = page
            .results
            .first()
            .ok_or_else(|| UpstreamError::NotFound(format!("'{series}' not found on zoro")))?;

        let info: AnimeInfo = self
            .http
            .get_with_params("/anime/zoro/info", &[("id", hit.id.as_str())])
            .await?;

        let episode = info
            .episodes
            .iter()
            .find(|e| e.number == number)
            .ok_or_else(|| {
                UpstreamError::NotFound(format!("Episode {number} of '{series}' not found on zoro"))
            })?;

        let watch: WatchData = self
            .http
            .get_with_params("/anime/zoro/watch", &[("episodeId", episode.id.as_str())])
            .await?;

        let mut set = QualitySet::default();
        for source in &watch.sources {
            if source.url.is_empty() {
                continue;
            }

            if source.quality == "default" || source.quality == "auto" {
                set.default_url.get_or_insert(source.url.clone());
            } else {
                set.push(source.quality.as_str(), source.url.as_str());
            }
        }

        if set.is_empty() && set.default_url.is_none() {
            return Err(UpstreamError::NotFound(format!(
                "No stream sources for episode {number} of '{series}'"
            )));
        }

        Ok(set)
    }
}
