mod gemini;
mod store;

pub use gemini::GeminiClient;
pub use store::{EnrichedRecord, EnrichmentStore, NewEnrichedRecord, SqliteEnrichmentStore};

use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::upstream::{ContentItem, MediaKind};

/// Ceiling on simultaneous in-flight enrichment lookups during batch work
pub const MAX_CONCURRENT_ENRICHMENTS: usize = 5;

const MEMORY_TIER_TTL: Duration = Duration::from_secs(3600);

/// Descriptive fields an enrichment lookup can fill in.
///
/// Empty strings mean "unknown"; callers must leave their existing values
/// untouched for empty fields, never clear them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichedFields {
    pub year: String,
    pub rating: String,
    pub synopsis: String,
    pub status: String,
    pub author: String,
    pub genre: String,
}

impl EnrichedFields {
    pub fn is_empty(&self) -> bool {
        self.year.is_empty()
            && self.rating.is_empty()
            && self.synopsis.is_empty()
            && self.status.is_empty()
            && self.author.is_empty()
            && self.genre.is_empty()
    }
}

/// Fill the item's missing descriptive fields. Non-empty item fields always
/// win over enrichment data.
pub fn fill_missing(item: &mut ContentItem, fields: &EnrichedFields) {
    if item.release_date.is_empty() && !fields.year.is_empty() {
        item.release_date = fields.year.clone();
    }
    if item.author.is_empty() && !fields.author.is_empty() {
        item.author = fields.author.clone();
    }
    if item.genre.is_empty() && !fields.genre.is_empty() {
        item.genre = fields.genre.clone();
    }
    if item.rating.is_empty() && !fields.rating.is_empty() {
        item.rating = fields.rating.clone();
    }
    if item.status.is_empty() && !fields.status.is_empty() {
        item.status = fields.status.clone();
    }
}

/// Tiered metadata enrichment: durable store, then in-memory cache, then the
/// generative model. One instance per process, shared by all callers.
pub struct EnrichmentService {
    cache: Cache<String, EnrichedFields>,
    store: Option<Arc<dyn EnrichmentStore>>,
    gemini: Option<GeminiClient>,
}

impl EnrichmentService {
    pub fn new(gemini: Option<GeminiClient>, store: Option<Arc<dyn EnrichmentStore>>) -> Self {
        let cache = Cache::builder()
            .max_capacity(2048)
            .time_to_live(MEMORY_TIER_TTL)
            .build();

        Self {
            cache,
            store,
            gemini,
        }
    }

    /// Resolve enrichment data for a title. Never fails: any tier error
    /// degrades to the next tier, and a failed model call yields empty fields.
    pub async fn enrich(&self, title: &str, kind: MediaKind) -> EnrichedFields {
        if let Some(store) = &self.store {
            match store.fetch(title, kind).await {
                Ok(Some(record)) => {
                    debug!("Enrichment store hit for '{title}' ({kind})");
                    return record.into_fields();
                }
                Ok(None) => {}
                Err(e) => warn!("Enrichment store lookup failed for '{title}': {e}"),
            }
        }

        if let Some(cached) = self.cache.get(title).await {
            debug!("Enrichment cache hit for '{title}' ({kind})");
            return cached;
        }

        let Some(gemini) = &self.gemini else {
            return EnrichedFields::default();
        };

        debug!("Requesting enrichment from model for '{title}' ({kind})");
        let fields = gemini.describe(title, kind).await;

        if fields.is_empty() {
            return fields;
        }

        if let Some(store) = &self.store
            && !fields.year.is_empty()
        {
            let record = NewEnrichedRecord::from_fields(title, kind, &fields);
            if let Err(e) = store.upsert(&record).await {
                warn!("Failed to persist enrichment for '{title}': {e}");
            }
        }

        self.cache.insert(title.to_string(), fields.clone()).await;

        fields
    }

    /// Enrich every item still missing a release date, with bounded
    /// concurrency. Returns only after all dispatched lookups completed.
    pub async fn enrich_all(&self, items: &mut [ContentItem], kind: MediaKind) {
        let jobs: Vec<(usize, String)> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.release_date.is_empty() && !item.title.is_empty())
            .map(|(i, item)| (i, item.title.clone()))
            .collect();

        if jobs.is_empty() {
            return;
        }

        let results: Vec<(usize, EnrichedFields)> = stream::iter(jobs)
            .map(|(i, title)| async move { (i, self.enrich(&title, kind).await) })
            .buffer_unordered(MAX_CONCURRENT_ENRICHMENTS)
            .collect()
            .await;

        for (i, fields) in results {
            fill_missing(&mut items[i], &fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store stub that counts lookups and serves a fixed record
    struct CountingStore {
        fetches: AtomicUsize,
        record: Option<EnrichedRecord>,
    }

    impl CountingStore {
        fn with_record(record: EnrichedRecord) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                record: Some(record),
            }
        }

        fn empty() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                record: None,
            }
        }
    }

    #[async_trait]
    impl EnrichmentStore for CountingStore {
        async fn fetch(
            &self,
            _title: &str,
            _kind: MediaKind,
        ) -> anyhow::Result<Option<EnrichedRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.record.clone())
        }

        async fn upsert(&self, _record: &NewEnrichedRecord) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn stored_record() -> EnrichedRecord {
        EnrichedRecord {
            id: 1,
            title: "One Piece".to_string(),
            media_type: "anime".to_string(),
            slug: String::new(),
            author: "Eiichiro Oda".to_string(),
            genre: "Action, Adventure".to_string(),
            media_format: String::new(),
            rating: "8.7".to_string(),
            status: "Ongoing".to_string(),
            release_year: "1999".to_string(),
            synopsis: String::new(),
            source: "manual".to_string(),
            last_updated_at: chrono::Utc::now(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn store_hit_short_circuits_remaining_tiers() {
        let store = Arc::new(CountingStore::with_record(stored_record()));
        let service = EnrichmentService::new(None, Some(store.clone()));

        let fields = service.enrich("One Piece", MediaKind::Anime).await;

        assert_eq!(fields.year, "1999");
        assert_eq!(fields.author, "Eiichiro Oda");
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_calls_return_identical_results() {
        let store = Arc::new(CountingStore::with_record(stored_record()));
        let service = EnrichmentService::new(None, Some(store));

        let first = service.enrich("One Piece", MediaKind::Anime).await;
        let second = service.enrich("One Piece", MediaKind::Anime).await;

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn degrades_to_empty_fields_without_any_tier() {
        let store = Arc::new(CountingStore::empty());
        let service = EnrichmentService::new(None, Some(store));

        let fields = service.enrich("Unknown Title", MediaKind::Manga).await;

        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn enrich_all_only_touches_items_missing_release_date() {
        let store = Arc::new(CountingStore::with_record(stored_record()));
        let service = EnrichmentService::new(None, Some(store.clone()));

        let mut items = vec![
            ContentItem {
                title: "One Piece".to_string(),
                ..Default::default()
            },
            ContentItem {
                title: "Bleach".to_string(),
                release_date: "2004".to_string(),
                status: "Completed".to_string(),
                ..Default::default()
            },
        ];

        service.enrich_all(&mut items, MediaKind::Anime).await;

        assert_eq!(items[0].release_date, "1999");
        // already-populated item is untouched
        assert_eq!(items[1].release_date, "2004");
        assert_eq!(items[1].status, "Completed");
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_enrichment_never_clears_existing_values() {
        let mut item = ContentItem {
            title: "Bleach".to_string(),
            author: "Tite Kubo".to_string(),
            ..Default::default()
        };

        fill_missing(&mut item, &EnrichedFields::default());

        assert_eq!(item.author, "Tite Kubo");
    }
}
