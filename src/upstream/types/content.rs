use serde::{Deserialize, Serialize};

/// Media kind, the second half of the enrichment identity (title, kind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Anime,
    Manga,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anime => write!(f, "anime"),
            Self::Manga => write!(f, "manga"),
        }
    }
}

/// One entry of any provider list or detail response, after normalization.
///
/// Upstream endpoints disagree on which image field they populate; `cover`
/// is the resolved one, the raw fields are kept for the fallback chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentItem {
    pub title: String,
    pub slug: String,
    #[serde(rename = "animeId")]
    pub content_id: String,
    /// Link field some endpoints use instead of a slug, e.g. "/manga/slug-name/"
    pub link: String,
    pub cover: String,
    pub poster: String,
    pub thumbnail: String,
    pub image: String,
    /// String or object depending on the endpoint
    pub synopsis: serde_json::Value,
    pub genre: String,
    pub status: String,
    pub rating: String,
    pub author: String,
    #[serde(rename = "type")]
    pub media_format: String,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    #[serde(rename = "totalEpisodes")]
    pub total_episodes: String,
    /// Latest chapter shown in manga lists
    pub chapter: String,
    pub time_ago: String,
}

/// Episode reference inside an anime detail response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeRef {
    pub title: String,
    #[serde(rename = "episodeId")]
    pub episode_id: String,
    pub slug: String,
    pub episode: String,
    /// String or number depending on the endpoint
    pub eps: serde_json::Value,
}

/// Full anime detail: the list item fields plus its episode list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentDetail {
    #[serde(flatten)]
    pub item: ContentItem,
    #[serde(rename = "episodeList")]
    pub episode_list: Vec<EpisodeRef>,
}

/// Chapter reference inside a manga detail response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterRef {
    pub title: String,
    pub chapter: String,
    #[serde(rename = "chapterId")]
    pub chapter_id: String,
    pub slug: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaMetadata {
    pub author: String,
    pub status: String,
    #[serde(rename = "type")]
    pub media_format: String,
}

/// Full manga detail response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaDetail {
    pub title: String,
    pub image: String,
    pub synopsis: serde_json::Value,
    pub metadata: MangaMetadata,
    pub chapters: Vec<ChapterRef>,
}

/// Images of one manga chapter plus reader navigation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterImages {
    pub title: String,
    #[serde(rename = "chapterId")]
    pub chapter_id: String,
    #[serde(rename = "mangaId")]
    pub manga_id: String,
    pub images: Vec<String>,
    #[serde(rename = "nextSlug", skip_serializing_if = "String::is_empty")]
    pub next_slug: String,
    #[serde(rename = "prevSlug", skip_serializing_if = "String::is_empty")]
    pub prev_slug: String,
}

/// Recent episode release from the latest feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LatestEpisode {
    pub title: String,
    #[serde(rename = "episodeId")]
    pub episode_id: String,
    pub slug: String,
    pub poster: String,
    #[serde(rename = "animeId")]
    pub anime_id: String,
    /// Which site the release was scraped from
    pub source: String,
}
