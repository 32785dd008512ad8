use std::time::Duration;

use futures::{StreamExt, stream};
use serde::Deserialize;
use tracing::debug;

use crate::upstream::{
    HttpClient, ResponseCache, Result, normalize,
    types::{ChapterImages, ContentItem, MangaDetail},
};

const TRENDING_TTL: Duration = Duration::from_secs(30 * 60);
const SEARCH_TTL: Duration = Duration::from_secs(10 * 60);
const GENRE_TTL: Duration = Duration::from_secs(30 * 60);
const RECENT_TTL: Duration = Duration::from_secs(15 * 60);
const POPULAR_TTL: Duration = Duration::from_secs(60 * 60);
const DETAIL_TTL: Duration = Duration::from_secs(30 * 60);
const CHAPTER_TTL: Duration = Duration::from_secs(30 * 60);

/// Ceiling on simultaneous detail fetches during cover hydration
const COVER_HYDRATION_CONCURRENCY: usize = 10;

// ========== Upstream payload schemas ==========

/// Comic list endpoints key their array differently per endpoint generation;
/// the distinguishing key picks the schema.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MangaListPayload {
    Trending { trending: Vec<ContentItem> },
    Comics { comics: Vec<ContentItem> },
    Wrapped { data: Vec<ContentItem> },
}

impl MangaListPayload {
    fn into_items(self) -> Vec<ContentItem> {
        match self {
            Self::Trending { trending } => trending,
            Self::Comics { comics } => comics,
            Self::Wrapped { data } => data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MangaDetailPayload {
    Wrapped { data: MangaDetail },
    Root(MangaDetail),
}

impl MangaDetailPayload {
    fn into_detail(self) -> MangaDetail {
        match self {
            Self::Wrapped { data } => data,
            Self::Root(detail) => detail,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChapterPayload {
    Wrapped { data: ChapterImages },
    Root(ChapterImages),
}

impl ChapterPayload {
    fn into_chapter(self) -> ChapterImages {
        match self {
            Self::Wrapped { data } => data,
            Self::Root(chapter) => chapter,
        }
    }
}

// ========== Provider ==========

/// Comic/manga content provider on the same scrape API
pub struct ComicProvider {
    http: HttpClient,
    cache: ResponseCache,
}

impl ComicProvider {
    pub fn new(http: HttpClient, cache: ResponseCache) -> Self {
        Self { http, cache }
    }

    /// Trending manga for the homepage
    pub async fn trending(&self) -> Result<Vec<ContentItem>> {
        let items = self
            .cached_list("comic:trending", "/comic/trending", TRENDING_TTL)
            .await?;

        let items = normalize::retain_listed(items);

        Ok(self.hydrate_covers(items).await)
    }

    /// Search by keyword. Images are cleaned rather than hydrated to keep
    /// search responsive.
    pub async fn search(&self, keyword: &str) -> Result<Vec<ContentItem>> {
        let key = format!("comic:search:{keyword}");
        let endpoint = format!("/comic/search?q={}", urlencoding::encode(keyword));

        let items = self.cached_list(&key, &endpoint, SEARCH_TTL).await?;
        let mut items = normalize::retain_listed(items);

        for item in &mut items {
            normalize::backfill_slug(item);
            normalize::clean_item_images(item);
            normalize::resolve_cover(item);
        }

        Ok(items)
    }

    pub async fn genre(&self, slug: &str) -> Result<Vec<ContentItem>> {
        let key = format!("comic:genre:{slug}");
        let endpoint = format!("/comic/genre/{slug}");

        let items = self.cached_list(&key, &endpoint, GENRE_TTL).await?;
        let items = normalize::retain_listed(items);

        Ok(self.hydrate_covers(items).await)
    }

    /// Recently updated manga ("terbaru" upstream)
    pub async fn recent(&self, page: u32) -> Result<Vec<ContentItem>> {
        let key = format!("comic:recent:{page}");
        let endpoint = if page <= 1 {
            "/comic/terbaru".to_string()
        } else {
            format!("/comic/terbaru?page={page}")
        };

        let items = self.cached_list(&key, &endpoint, RECENT_TTL).await?;
        let items = normalize::retain_listed(items);

        Ok(self.hydrate_covers(items).await)
    }

    /// Popular manga ("populer" upstream)
    pub async fn popular(&self, page: u32) -> Result<Vec<ContentItem>> {
        let key = format!("comic:popular:{page}");
        let endpoint = if page <= 1 {
            "/comic/populer".to_string()
        } else {
            format!("/comic/populer?page={page}")
        };

        let items = self.cached_list(&key, &endpoint, POPULAR_TTL).await?;
        let items = normalize::retain_listed(items);

        Ok(self.hydrate_covers(items).await)
    }

    pub async fn detail(&self, slug: &str) -> Result<MangaDetail> {
        let key = format!("comic:detail:{slug}");
        if let Some(cached) = self.cache.get::<MangaDetail>(&key) {
            debug!("Cache hit for {key}");
            return Ok(cached);
        }

        let payload: MangaDetailPayload =
            self.http.get(&format!("/comic/comic/{slug}")).await?;

        let mut detail = payload.into_detail();
        detail.image = normalize::clean_image_url(&detail.image);
        detail.chapters = normalize::dedup_entries(detail.chapters, |chapter| {
            (chapter.slug.as_str(), chapter.title.as_str())
        });

        self.cache.insert(&key, &detail, DETAIL_TTL);

        Ok(detail)
    }

    pub async fn chapter(&self, chapter_id: &str) -> Result<ChapterImages> {
        let key = format!("comic:chapter:{chapter_id}");
        if let Some(cached) = self.cache.get::<ChapterImages>(&key) {
            return Ok(cached);
        }

        let payload: ChapterPayload = self
            .http
            .get(&format!("/comic/chapter/{chapter_id}"))
            .await?;

        let chapter = payload.into_chapter();
        self.cache.insert(&key, &chapter, CHAPTER_TTL);

        Ok(chapter)
    }

    /// Replace low-res list covers with the portrait from each item's detail
    /// page, fetched with bounded concurrency. Items whose detail fetch fails
    /// fall back to cleaned list URLs.
    async fn hydrate_covers(&self, mut items: Vec<ContentItem>) -> Vec<ContentItem> {
        for item in &mut items {
            normalize::backfill_slug(item);
        }

        let jobs: Vec<(usize, String)> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.slug.is_empty())
            .map(|(i, item)| (i, item.slug.clone()))
            .collect();

        let results: Vec<(usize, Option<String>)> = stream::iter(jobs)
            .map(|(i, slug)| async move {
                let image = self
                    .detail(&slug)
                    .await
                    .ok()
                    .map(|detail| detail.image)
                    .filter(|image| !image.is_empty());
                (i, image)
            })
            .buffer_unordered(COVER_HYDRATION_CONCURRENCY)
            .collect()
            .await;

        for (i, image) in results {
            let item = &mut items[i];
            match image {
                Some(image) => {
                    item.image = image.clone();
                    item.cover = image.clone();
                    item.poster = image.clone();
                    item.thumbnail = image;
                }
                None => normalize::clean_item_images(item),
            }
        }

        for item in &mut items {
            normalize::resolve_cover(item);
        }

        items
    }

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

        let payload: MangaListPayload = self.http.get(endpoint).await?;
        let items = payload.into_items();

        self.cache.insert(key, &items, ttl);

        Ok(items)
    }
}
