use serde::{Deserialize, Serialize};

/// A single mirror server behind a quality tier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamServer {
    pub title: String,
    #[serde(rename = "serverId")]
    pub server_id: String,
    pub href: String,
}

/// One rung of the quality ladder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityOption {
    pub title: String,
    #[serde(rename = "serverList")]
    pub server_list: Vec<StreamServer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerData {
    pub qualities: Vec<QualityOption>,
}

/// Normalized playback response returned to callers regardless of which
/// upstream combination produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeStream {
    pub title: String,
    #[serde(rename = "defaultStreamingUrl")]
    pub default_streaming_url: String,
    /// Legacy field kept for older frontend builds; string or map
    #[serde(rename = "stream_link")]
    pub stream_link: serde_json::Value,
    pub url: String,
    #[serde(rename = "animeId")]
    pub anime_id: String,
    pub server: ServerData,
    /// Array, string or null depending on the upstream
    #[serde(rename = "downloadUrl")]
    pub download_url: serde_json::Value,
}

/// One labeled playback URL from a mirror, in provider response order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityEntry {
    pub label: String,
    pub url: String,
}

/// What a single mirror yielded for an episode.
///
/// Entry order is the provider's own response order; the merge step relies
/// on it for tie-breaking among labels it cannot rank.
#[derive(Debug, Clone, Default)]
pub struct QualitySet {
    pub entries: Vec<QualityEntry>,
    pub default_url: Option<String>,
}

impl QualitySet {
    /// Add a labeled URL, replacing the URL in place if the label repeats
    pub fn push(&mut self, label: impl Into<String>, url: impl Into<String>) {
        let label = label.into();
        let url = url.into();

        if url.is_empty() {
            return;
        }

        if let Some(existing) = self.entries.iter_mut().find(|e| e.label == label) {
            existing.url = url;
        } else {
            self.entries.push(QualityEntry { label, url });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The URL that should take the default slot for this mirror
    pub fn default_or_first(&self) -> Option<&str> {
        self.default_url
            .as_deref()
            .or_else(|| self.entries.first().map(|e| e.url.as_str()))
    }
}
