use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    enrichment::{EnrichmentService, fill_missing},
    upstream::{
        HttpClient, ResponseCache, Result, normalize,
        types::{ContentDetail, ContentItem, EpisodeStream, LatestEpisode, MediaKind},
    },
};

const HOME_TTL: Duration = Duration::from_secs(5 * 60);
const SEARCH_TTL: Duration = Duration::from_secs(10 * 60);
const GENRE_TTL: Duration = Duration::from_secs(30 * 60);
const ONGOING_TTL: Duration = Duration::from_secs(15 * 60);
const COMPLETED_TTL: Duration = Duration::from_secs(60 * 60);
const DETAIL_TTL: Duration = Duration::from_secs(30 * 60);
const EPISODE_TTL: Duration = Duration::from_secs(15 * 60);
const SERVER_TTL: Duration = Duration::from_secs(20 * 60);
const LATEST_TTL: Duration = Duration::from_secs(3 * 60);

/// Homepage content: ongoing and completed lists, enriched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HomeData {
    pub ongoing: Vec<ContentItem>,
    pub completed: Vec<ContentItem>,
}

// ========== Upstream payload schemas ==========

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct HomeEnvelope {
    data: HomeSections,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct HomeSections {
    ongoing: ListSection,
    completed: ListSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ListSection {
    #[serde(rename = "animeList")]
    anime_list: Vec<ContentItem>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ListEnvelope {
    data: ListPayload,
}

/// List endpoints have shipped two shapes over time; the wrapped form is
/// detected by its `animeList` key, otherwise the data field is a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListPayload {
    Keyed {
        #[serde(rename = "animeList")]
        anime_list: Vec<ContentItem>,
    },
    Flat(Vec<ContentItem>),
}

impl Default for ListPayload {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl ListPayload {
    fn into_items(self) -> Vec<ContentItem> {
        match self {
            Self::Keyed { anime_list } => anime_list,
            Self::Flat(items) => items,
        }
    }
}

/// Detail endpoint: historically either `{"data": {...}}` or the bare object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetailPayload {
    Wrapped { data: ContentDetail },
    Root(ContentDetail),
}

impl DetailPayload {
    fn into_detail(self) -> ContentDetail {
        match self {
            Self::Wrapped { data } => data,
            Self::Root(detail) => detail,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EpisodeEnvelope {
    data: EpisodeStream,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ServerEnvelope {
    data: ServerUrl,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ServerUrl {
    url: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LatestEnvelope {
    data: LatestSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LatestSection {
    episodes: Vec<LatestEpisode>,
}

// ========== Provider ==========

/// Primary content provider: anime catalog, details and episode streams
pub struct OtakudesuProvider {
    http: HttpClient,
    cache: ResponseCache,
    enrichment: Arc<EnrichmentService>,
}

impl OtakudesuProvider {
    pub fn new(http: HttpClient, cache: ResponseCache, enrichment: Arc<EnrichmentService>) -> Self {
        Self {
            http,
            cache,
            enrichment,
        }
    }

    /// Ongoing and completed lists from the homepage. The enriched result is
    /// what gets cached, not the raw payload.
    pub async fn home(&self) -> Result<HomeData> {
        let cache_key = "anime:home_enriched";
        if let Some(cached) = self.cache.get::<HomeData>(cache_key) {
            debug!("Cache hit for {cache_key}");
            return Ok(cached);
        }

        let envelope: HomeEnvelope = self.http.get("/anime/home").await?;

        let mut home = HomeData {
            ongoing: envelope.data.ongoing.anime_list,
            completed: envelope.data.completed.anime_list,
        };

        normalize_list(&mut home.ongoing);
        normalize_list(&mut home.completed);

        self.enrichment
            .enrich_all(&mut home.ongoing, MediaKind::Anime)
            .await;
        self.enrichment
            .enrich_all(&mut home.completed, MediaKind::Anime)
            .await;

        self.cache.insert(cache_key, &home, HOME_TTL);

        Ok(home)
    }

    /// Search by keyword. Not enriched, to keep search responsive.
    pub async fn search(&self, keyword: &str) -> Result<Vec<ContentItem>> {
        let key = format!("anime:search:{keyword}");
        let endpoint = format!("/anime/search/{}", urlencoding::encode(keyword));

        let mut items = self.cached_list(&key, &endpoint, SEARCH_TTL).await?;
        normalize_list(&mut items);

        Ok(items)
    }

    pub async fn genre(&self, slug: &str) -> Result<Vec<ContentItem>> {
        let key = format!("anime:genre:{slug}");
        let endpoint = format!("/anime/genre/{slug}");

        let mut items = self.cached_list(&key, &endpoint, GENRE_TTL).await?;
        normalize_list(&mut items);
        self.enrichment.enrich_all(&mut items, MediaKind::Anime).await;

        Ok(items)
    }

    pub async fn ongoing(&self, page: u32) -> Result<Vec<ContentItem>> {
        let key = format!("anime:ongoing:{page}");
        let endpoint = if page <= 1 {
            "/anime/ongoing-anime".to_string()
        } else {
            format!("/anime/ongoing-anime/page/{page}")
        };

        let mut items = self.cached_list(&key, &endpoint, ONGOING_TTL).await?;
        normalize_list(&mut items);
        self.enrichment.enrich_all(&mut items, MediaKind::Anime).await;

        Ok(items)
    }

    pub async fn completed(&self, page: u32) -> Result<Vec<ContentItem>> {
        let key = format!("anime:completed:{page}");
        let endpoint = if page <= 1 {
            "/anime/complete-anime".to_string()
        } else {
            format!("/anime/complete-anime/page/{page}")
        };

        let mut items = self.cached_list(&key, &endpoint, COMPLETED_TTL).await?;
        normalize_list(&mut items);
        self.enrichment.enrich_all(&mut items, MediaKind::Anime).await;

        Ok(items)
    }

    /// Full detail with episode list. Enrichment only runs when the upstream
    /// left the descriptive fields empty.
    pub async fn detail(&self, slug: &str) -> Result<ContentDetail> {
        let key = format!("anime:detail:{slug}");

        let mut detail = match self.cache.get::<ContentDetail>(&key) {
            Some(cached) => {
                debug!("Cache hit for {key}");
                cached
            }
            None => {
                let payload: DetailPayload =
                    self.http.get(&format!("/anime/anime/{slug}")).await?;
                let detail = payload.into_detail();
                self.cache.insert(&key, &detail, DETAIL_TTL);
                detail
            }
        };

        normalize::resolve_cover(&mut detail.item);
        normalize::backfill_slug(&mut detail.item);
        detail.episode_list = normalize::dedup_entries(detail.episode_list, |episode| {
            (episode.slug.as_str(), episode.title.as_str())
        });

        if detail.item.author.is_empty() || detail.item.genre.is_empty() {
            let fields = self
                .enrichment
                .enrich(&detail.item.title, MediaKind::Anime)
                .await;
            fill_missing(&mut detail.item, &fields);
        }

        Ok(detail)
    }

    /// Raw episode stream from the primary provider, no mirror aggregation
    pub async fn episode(&self, episode_id: &str) -> Result<EpisodeStream> {
        let key = format!("anime:episode:{episode_id}");
        if let Some(cached) = self.cache.get::<EpisodeStream>(&key) {
            debug!("Cache hit for {key}");
            return Ok(cached);
        }

        let envelope: EpisodeEnvelope =
            self.http.get(&format!("/anime/episode/{episode_id}")).await?;

        self.cache.insert(&key, &envelope.data, EPISODE_TTL);

        Ok(envelope.data)
    }

    /// Embed URL for a specific mirror server
    pub async fn server_url(&self, server_id: &str) -> Result<String> {
        let key = format!("anime:server:{server_id}");
        if let Some(cached) = self.cache.get::<String>(&key) {
            return Ok(cached);
        }

        let envelope: ServerEnvelope =
            self.http.get(&format!("/anime/server/{server_id}")).await?;

        self.cache.insert(&key, &envelope.data.url, SERVER_TTL);

        Ok(envelope.data.url)
    }

    /// Recently released episodes across scraped sites
    pub async fn latest(&self) -> Result<Vec<LatestEpisode>> {
        let key = "anime:latest";
        if let Some(cached) = self.cache.get::<Vec<LatestEpisode>>(key) {
            return Ok(cached);
        }

        let envelope: LatestEnvelope = self.http.get("/anime/stream/latest").await?;

        self.cache.insert(key, &envelope.data.episodes, LATEST_TTL);

        Ok(envelope.data.episodes)
    }

    /// Fetch a list endpoint through the response cache
    async fn cached_list(
        &self,
        key: &str,
        endpoint: &str,
        ttl: Duration,
    ) -> Result<Vec<ContentItem>> {
        if let Some(cached) = self.cache.get::<Vec<ContentItem>>(key) {
            debug!("Cache hit for {key}");
            return Ok(cached);
        }

        let envelope: ListEnvelope = self.http.get(endpoint).await?;
        let items = envelope.data.into_items();

        self.cache.insert(key, &items, ttl);

        Ok(items)
    }
}

fn normalize_list(items: &mut [ContentItem]) {
    for item in items {
        normalize::resolve_cover(item);
        normalize::backfill_slug(item);
    }
}
