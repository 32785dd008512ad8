use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::upstream::{
    HttpClient, Result, UpstreamError,
    slug::{self, SlugStyle},
    types::QualitySet,
};

/// Download hosts that also serve as streamable embeds
const STREAMABLE_HOSTS: &[&str] = &["acefile", "filedon", "akirabox"];

/// Fields are at the root of the payload, not nested under `data`, and the
/// status field has shipped both as a string and as a number.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OploverzEpisode {
    status: Option<StatusField>,
    #[serde(rename = "episode_title")]
    _episode_title: String,
    streams: Vec<OploverzStream>,
    downloads: Vec<OploverzDownload>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusField {
    Text(String),
    Code(i64),
}

impl OploverzEpisode {
    fn is_error(&self) -> bool {
        matches!(&self.status, Some(StatusField::Text(s)) if s.eq_ignore_ascii_case("error"))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OploverzStream {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OploverzDownload {
    name: String,
    resolution: String,
    url: String,
}

/// Oploverz mirror: one quality per resolution, slug convention
/// `{series}-episode-{n}-subtitle-indonesia`
pub struct OploverzProvider {
    http: HttpClient,
}

impl OploverzProvider {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl super::StreamProvider for OploverzProvider {
    fn id(&self) -> &'static str {
        "oploverz"
    }

    fn name(&self) -> &'static str {
        "Oploverz"
    }

    async fn fetch_streams(&self, episode_slug: &str, episode_title: &str) -> Result<QualitySet> {
        let candidates = slug::candidates(episode_slug, episode_title, SlugStyle::Oploverz);
        let mut last_error = None;

        for candidate in candidates {
            debug!("Trying oploverz slug '{candidate}'");

            let episode: OploverzEpisode = match self
                .http
                .get(&format!("/anime/oploverz/episode/{candidate}"))
                .await
            {
                Ok(episode) => episode,
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            };

            if episode.is_error() {
                continue;
            }

            let set = build_quality_set(&episode);
            if !set.is_empty() || set.default_url.is_some() {
                debug!("Oploverz matched slug '{candidate}'");
                return Ok(set);
            }
        }

        Err(last_error.unwrap_or_else(|| {
            UpstreamError::NotFound(format!("No oploverz stream for {episode_slug}"))
        }))
    }
}

fn build_quality_set(episode: &OploverzEpisode) -> QualitySet {
    let mut set = QualitySet::default();

    for download in &episode.downloads {
        let host = download.name.to_lowercase();
        if STREAMABLE_HOSTS.iter().any(|h| host.contains(h)) {
            set.push(download.resolution.as_str(), embed_url(&download.url));
        }
    }

    set.default_url = episode
        .streams
        .first()
        .map(|s| s.url.clone())
        .filter(|url| !url.is_empty())
        .or_else(|| {
            episode
                .downloads
                .first()
                .map(|d| embed_url(&d.url))
                .filter(|url| !url.is_empty())
        });

    set
}

/// Rewrite known download URLs to their player embed form
fn embed_url(url: &str) -> String {
    if url.contains("acefile.co/f/") {
        return url.replacen("/f/", "/player/", 1);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_acefile_download_to_player() {
        assert_eq!(
            embed_url("https://acefile.co/f/110881619"),
            "https://acefile.co/player/110881619"
        );
    }

    #[test]
    fn leaves_other_hosts_untouched() {
        assert_eq!(
            embed_url("https://filedon.co/f/abc"),
            "https://filedon.co/f/abc"
        );
    }

    #[test]
    fn filters_downloads_to_streamable_hosts() {
        let episode = OploverzEpisode {
            status: Some(StatusField::Text("success".to_string())),
            downloads: vec![
                OploverzDownload {
                    name: "Acefile".to_string(),
                    resolution: "720p".to_string(),
                    url: "https://acefile.co/f/1".to_string(),
                },
                OploverzDownload {
                    name: "GD".to_string(),
                    resolution: "1080p".to_string(),
                    url: "https://drive.example/2".to_string(),
                },
            ],
            ..Default::default()
        };

        let set = build_quality_set(&episode);

        assert_eq!(set.entries.len(), 1);
        assert_eq!(set.entries[0].label, "720p");
        assert_eq!(set.entries[0].url, "https://acefile.co/player/1");
        // first download still backs the default slot
        assert_eq!(set.default_url.as_deref(), Some("https://acefile.co/player/1"));
    }

    #[test]
    fn numeric_status_is_not_an_error() {
        let episode: OploverzEpisode =
            serde_json::from_str(r#"{"status": 200, "streams": [], "downloads": []}"#).unwrap();

        assert!(!episode.is_error());
    }

    #[test]
    fn string_error_status_is_detected() {
        let episode: OploverzEpisode =
            serde_json::from_str(r#"{"status": "error", "streams": [], "downloads": []}"#).unwrap();

        assert!(episode.is_error());
    }
}
