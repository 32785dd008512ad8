//! Upstream core integration tests

#[cfg(test)]
mod slug_tests {
    use crate::upstream::slug::{self, SlugStyle};

    #[test]
    fn test_raw_slug_is_always_first_candidate() {
        let candidates =
            slug::candidates("wpoiec-episode-1155-sub-indo", "", SlugStyle::AnimeIndo);

        assert_eq!(candidates[0], "wpoiec-episode-1155-sub-indo");
    }

    #[test]
    fn test_alias_rewrites_opaque_token() {
        let candidates =
            slug::candidates("wpoiec-episode-1155-sub-indo", "", SlugStyle::AnimeIndo);

        let position = candidates
            .iter()
            .position(|c| c == "one-piece-episode-1155");

        // the aliased slug must appear, but never ahead of the raw input
        assert!(position.is_some());
        assert!(position.unwrap() > 0);
    }

    #[test]
    fn test_unparseable_slug_passes_through_unchanged() {
        let candidates = slug::candidates("not-an-episode-slug", "", SlugStyle::Oploverz);

        assert_eq!(candidates, vec!["not-an-episode-slug".to_string()]);
    }

    #[test]
    fn test_oploverz_candidates_carry_locale_suffix() {
        let candidates = slug::candidates("wpoiec-episode-12", "", SlugStyle::Oploverz);

        assert!(
            candidates
                .iter()
                .any(|c| c == "one-piece-episode-12-subtitle-indonesia")
        );
    }

    #[test]
    fn test_animeindo_candidates_in_documented_order() {
        let candidates = slug::candidates("wpoiec-episode-12", "", SlugStyle::AnimeIndo);

        assert_eq!(
            candidates,
            vec![
                "wpoiec-episode-12".to_string(),
                "one-piece-episode-12".to_string(),
                "one-piece-episode-12-sub-indo".to_string(),
                "wpoiec-episode-12-sub-indo".to_string(),
            ]
        );
    }

    #[test]
    fn test_title_derived_slug_strips_boilerplate() {
        let derived = slug::slug_from_title("Frieren: Beyond Journey's End Episode 28 Subtitle Indonesia");

        assert_eq!(derived, "frieren-beyond-journey-s-end");
    }

    #[test]
    fn test_title_fallback_used_when_no_alias_exists() {
        let candidates = slug::candidates(
            "frbynd-episode-28",
            "Frieren Episode 28 Sub Indo",
            SlugStyle::AnimeIndo,
        );

        assert!(candidates.iter().any(|c| c == "frieren-episode-28"));
    }

    #[test]
    fn test_parse_extracts_series_and_number() {
        let parsed = slug::parse("wpoiec-episode-1155-sub-indo").unwrap();

        assert_eq!(parsed.series, "wpoiec");
        assert_eq!(parsed.number, "1155");
    }
}

#[cfg(test)]
mod normalize_tests {
    use crate::upstream::normalize::{
        backfill_slug, clean_image_url, dedup_entries, is_blacklisted, resolve_cover,
        retain_listed, slug_from_link,
    };
    use crate::upstream::types::{ChapterRef, ContentItem};

    fn item(title: &str) -> ContentItem {
        ContentItem {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_cover_falls_back_in_priority_order() {
        let mut poster_only = ContentItem {
            poster: "poster.jpg".to_string(),
            thumbnail: "thumb.jpg".to_string(),
            image: "image.jpg".to_string(),
            ..Default::default()
        };
        resolve_cover(&mut poster_only);
        assert_eq!(poster_only.cover, "poster.jpg");

        let mut thumb_only = ContentItem {
            thumbnail: "thumb.jpg".to_string(),
            image: "image.jpg".to_string(),
            ..Default::default()
        };
        resolve_cover(&mut thumb_only);
        assert_eq!(thumb_only.cover, "thumb.jpg");

        let mut image_only = ContentItem {
            image: "image.jpg".to_string(),
            ..Default::default()
        };
        resolve_cover(&mut image_only);
        assert_eq!(image_only.cover, "image.jpg");
    }

    #[test]
    fn test_cover_stays_empty_when_all_fields_empty() {
        let mut bare = ContentItem::default();
        resolve_cover(&mut bare);

        assert!(bare.cover.is_empty());
    }

    #[test]
    fn test_existing_cover_is_never_overwritten() {
        let mut existing = ContentItem {
            cover: "cover.jpg".to_string(),
            poster: "poster.jpg".to_string(),
            ..Default::default()
        };
        resolve_cover(&mut existing);

        assert_eq!(existing.cover, "cover.jpg");
    }

    #[test]
    fn test_slug_backfilled_from_id_before_link() {
        let mut with_id = ContentItem {
            content_id: "one-piece".to_string(),
            link: "/manga/other/".to_string(),
            ..Default::default()
        };
        backfill_slug(&mut with_id);
        assert_eq!(with_id.slug, "one-piece");

        let mut with_link = ContentItem {
            link: "/manga/slug-name/".to_string(),
            ..Default::default()
        };
        backfill_slug(&mut with_link);
        assert_eq!(with_link.slug, "slug-name");
    }

    #[test]
    fn test_slug_from_link_takes_last_segment() {
        assert_eq!(slug_from_link("/manga/slug-name/"), "slug-name");
        assert_eq!(slug_from_link("slug-name"), "slug-name");
        assert_eq!(slug_from_link("/a/b/c"), "c");
    }

    #[test]
    fn test_blacklist_drops_spam_titles() {
        let items = vec![
            item("One Piece"),
            item("MyApp APK Download"),
            item("Komiku Plus Reader"),
        ];

        let kept = retain_listed(items);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "One Piece");
    }

    #[test]
    fn test_blacklist_matches_as_substring() {
        // literal substring semantics: a title merely containing the letter
        // sequence is dropped too
        assert!(is_blacklisted("APKalypse: The Manga"));
        assert!(!is_blacklisted("Attack on Titan"));
    }

    #[test]
    fn test_chapter_dedup_by_slug_or_title() {
        let chapters = vec![
            ChapterRef {
                slug: "ch-1".to_string(),
                title: "Chapter 1".to_string(),
                ..Default::default()
            },
            ChapterRef {
                slug: "ch-1-alt".to_string(),
                title: "chapter 1".to_string(),
                ..Default::default()
            },
            ChapterRef {
                slug: "ch-2".to_string(),
                title: "Chapter 2".to_string(),
                ..Default::default()
            },
        ];

        let deduped = dedup_entries(chapters, |c| (c.slug.as_str(), c.title.as_str()));

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].slug, "ch-1");
        assert_eq!(deduped[1].slug, "ch-2");
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_and_order() {
        let chapters = vec![
            ChapterRef {
                slug: "ch-2".to_string(),
                title: "Chapter 2".to_string(),
                ..Default::default()
            },
            ChapterRef {
                slug: "ch-1".to_string(),
                title: "Chapter 1".to_string(),
                ..Default::default()
            },
            ChapterRef {
                slug: "CH-1 ".to_string(),
                title: "other".to_string(),
                ..Default::default()
            },
        ];

        let deduped = dedup_entries(chapters, |c| (c.slug.as_str(), c.title.as_str()));

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].slug, "ch-2");
        assert_eq!(deduped[1].slug, "ch-1");
    }

    #[test]
    fn test_clean_image_url_strips_transform_params() {
        let cleaned = clean_image_url("https://cdn.example/img.jpg?resize=165,225");

        assert_eq!(cleaned, "https://cdn.example/img.jpg");
    }

    #[test]
    fn test_clean_image_url_strips_quality_param() {
        let cleaned = clean_image_url("https://cdn.example/img.jpg?quality=60&v=2");

        assert!(!cleaned.contains("quality=60"));
        assert!(cleaned.contains("v=2"));
    }

    #[test]
    fn test_clean_image_url_handles_empty() {
        assert_eq!(clean_image_url(""), "");
    }
}

#[cfg(test)]
mod cache_tests {
    use crate::upstream::ResponseCache;
    use std::time::Duration;

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = ResponseCache::new();

        cache.insert("key", &"value".to_string(), Duration::from_secs(60));

        assert_eq!(cache.get::<String>("key"), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let cache = ResponseCache::new();

        cache.insert("key", &"value".to_string(), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get::<String>("key"), None);
    }

    #[tokio::test]
    async fn test_missing_key_is_a_miss() {
        let cache = ResponseCache::new();

        assert_eq!(cache.get::<String>("absent"), None);
    }

    #[tokio::test]
    async fn test_purge_reclaims_expired_entries() {
        let cache = ResponseCache::new();

        cache.insert("old", &1u32, Duration::from_millis(10));
        cache.insert("new", &2u32, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(30)).await;

        cache.purge_expired();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<u32>("new"), Some(2));
    }

    #[tokio::test]
    async fn test_insert_overwrites_previous_value() {
        let cache = ResponseCache::new();

        cache.insert("key", &1u32, Duration::from_secs(60));
        cache.insert("key", &2u32, Duration::from_secs(60));

        assert_eq!(cache.get::<u32>("key"), Some(2));
    }
}

#[cfg(test)]
mod ratelimit_tests {
    use crate::upstream::RateLimiter;
    use std::time::Duration;

    #[test]
    fn test_second_call_within_interval_is_denied() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1));

        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_tokens_refill_after_interval() {
        let limiter = RateLimiter::new(1, Duration::from_millis(30));

        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        std::thread::sleep(Duration::from_millis(50));

        assert!(limiter.try_acquire());
    }

    #[test]
    fn test_refill_never_exceeds_capacity() {
        let limiter = RateLimiter::new(2, Duration::from_millis(5));

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());

        std::thread::sleep(Duration::from_millis(100));

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }
}

#[cfg(test)]
mod resolver_tests {
    use crate::upstream::UpstreamError;
    use crate::upstream::resolver::{MirrorOutcome, merge};
    use crate::upstream::types::{
        EpisodeStream, QualityOption, QualitySet, ServerData, StreamServer,
    };

    fn mirror_ok(id: &'static str, name: &'static str, set: QualitySet) -> MirrorOutcome {
        MirrorOutcome {
            id,
            name,
            result: Ok(set),
        }
    }

    fn mirror_err(id: &'static str, name: &'static str) -> MirrorOutcome {
        MirrorOutcome {
            id,
            name,
            result: Err(UpstreamError::NotFound("down".to_string())),
        }
    }

    fn primary_stream() -> EpisodeStream {
        EpisodeStream {
            title: "One Piece Episode 1155 Subtitle Indonesia".to_string(),
            default_streaming_url: "https://primary.example/embed".to_string(),
            server: ServerData {
                qualities: vec![QualityOption {
                    title: "Mirror".to_string(),
                    server_list: vec![StreamServer {
                        title: "ondesu".to_string(),
                        server_id: "srv1".to_string(),
                        href: "https://primary.example/embed".to_string(),
                    }],
                }],
            },
            ..Default::default()
        }
    }

    fn primary_failure() -> Result<EpisodeStream, UpstreamError> {
        Err(UpstreamError::Api {
            status: 503,
            message: "unavailable".to_string(),
        })
    }

    #[test]
    fn test_qualities_sorted_by_resolution_ascending() {
        let mut set = QualitySet::default();
        set.push("720p", "https://m.example/720");
        set.push("360p", "https://m.example/360");
        set.push("1080p", "https://m.example/1080");

        let merged = merge(
            "wpoiec-episode-1155-sub-indo",
            primary_failure(),
            vec![mirror_ok("oploverz", "Oploverz", set)],
        )
        .unwrap();

        let labels: Vec<&str> = merged
            .server
            .qualities
            .iter()
            .map(|q| q.title.as_str())
            .collect();

        assert_eq!(labels, vec!["360p", "720p", "1080p"]);
        assert!(!merged.default_streaming_url.is_empty());
    }

    #[test]
    fn test_unranked_labels_sort_after_ranked_in_provider_order() {
        let mut set = QualitySet::default();
        set.push("B-TUBE", "https://m.example/btube");
        set.push("720p", "https://m.example/720");
        set.push("AKIRA", "https://m.example/akira");

        let merged = merge(
            "wpoiec-episode-1155-sub-indo",
            primary_failure(),
            vec![mirror_ok("animeindo", "Anime Indo", set)],
        )
        .unwrap();

        let labels: Vec<&str> = merged
            .server
            .qualities
            .iter()
            .map(|q| q.title.as_str())
            .collect();

        assert_eq!(labels, vec!["720p", "B-TUBE", "AKIRA"]);
    }

    #[test]
    fn test_mirror_only_result_synthesizes_response() {
        let mut set = QualitySet::default();
        set.push("360p", "https://m.example/360");
        set.push("720p", "https://m.example/720");

        let merged = merge(
            "wpoiec-episode-1155-sub-indo",
            primary_failure(),
            vec![mirror_ok("oploverz", "Oploverz", set)],
        )
        .unwrap();

        assert_eq!(merged.anime_id, "wpoiec");
        assert_eq!(merged.server.qualities.len(), 2);
        assert_eq!(merged.server.qualities[0].title, "360p");
        assert!(!merged.default_streaming_url.is_empty());
        assert_eq!(merged.url, merged.default_streaming_url);
    }

    #[test]
    fn test_primary_demoted_to_attributed_entry_when_mirrors_win() {
        let mut set = QualitySet::default();
        set.push("480p", "https://m.example/480");

        let merged = merge(
            "wpoiec-episode-1155-sub-indo",
            Ok(primary_stream()),
            vec![mirror_ok("oploverz", "Oploverz", set)],
        )
        .unwrap();

        let last = merged.server.qualities.last().unwrap();
        assert!(last.title.contains("Otakudesu"));
        assert_eq!(merged.server.qualities[0].title, "480p");
    }

    #[test]
    fn test_mirror_default_takes_the_default_slot() {
        let mut set = QualitySet::default();
        set.push("480p", "https://m.example/480");
        set.default_url = Some("https://m.example/best".to_string());

        let merged = merge(
            "wpoiec-episode-1155-sub-indo",
            Ok(primary_stream()),
            vec![mirror_ok("animeindo", "Anime Indo", set)],
        )
        .unwrap();

        assert_eq!(merged.default_streaming_url, "https://m.example/best");
    }

    #[test]
    fn test_primary_kept_and_attributed_when_all_mirrors_fail() {
        let merged = merge(
            "wpoiec-episode-1155-sub-indo",
            Ok(primary_stream()),
            vec![
                mirror_err("oploverz", "Oploverz"),
                mirror_err("animeindo", "Anime Indo"),
            ],
        )
        .unwrap();

        assert_eq!(merged.server.qualities.len(), 1);
        assert!(merged.server.qualities[0].title.starts_with("Server 1 - Otakudesu"));
        assert_eq!(merged.default_streaming_url, "https://primary.example/embed");
    }

    #[test]
    fn test_entries_merge_across_mirrors_by_label() {
        let mut first = QualitySet::default();
        first.push("720p", "https://a.example/720");
        let mut second = QualitySet::default();
        second.push("720p", "https://b.example/720");
        second.push("480p", "https://b.example/480");

        let merged = merge(
            "wpoiec-episode-1155-sub-indo",
            primary_failure(),
            vec![
                mirror_ok("oploverz", "Oploverz", first),
                mirror_ok("animeindo", "Anime Indo", second),
            ],
        )
        .unwrap();

        let labels: Vec<&str> = merged
            .server
            .qualities
            .iter()
            .map(|q| q.title.as_str())
            .collect();
        assert_eq!(labels, vec!["480p", "720p"]);

        let tier_720 = merged
            .server
            .qualities
            .iter()
            .find(|q| q.title == "720p")
            .unwrap();
        assert_eq!(tier_720.server_list.len(), 2);
    }

    #[test]
    fn test_total_failure_reports_primary_error() {
        let result = merge(
            "wpoiec-episode-1155-sub-indo",
            primary_failure(),
            vec![mirror_err("oploverz", "Oploverz")],
        );

        match result {
            Err(UpstreamError::NoStream { episode, source }) => {
                assert_eq!(episode, "wpoiec-episode-1155-sub-indo");
                assert!(source.contains("503"));
            }
            other => panic!("expected NoStream, got {other:?}"),
        }
    }

    #[test]
    fn test_merge_is_deterministic() {
        let build = || {
            let mut set = QualitySet::default();
            set.push("720p", "https://m.example/720");
            set.push("360p", "https://m.example/360");
            merge(
                "wpoiec-episode-1155-sub-indo",
                primary_failure(),
                vec![mirror_ok("oploverz", "Oploverz", set)],
            )
            .unwrap()
        };

        let first = build();
        let second = build();

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}

#[cfg(test)]
mod quality_set_tests {
    use crate::upstream::types::QualitySet;

    #[test]
    fn test_push_skips_empty_urls() {
        let mut set = QualitySet::default();
        set.push("720p", "");

        assert!(set.is_empty());
    }

    #[test]
    fn test_repeated_label_replaces_url_in_place() {
        let mut set = QualitySet::default();
        set.push("720p", "https://a.example");
        set.push("480p", "https://b.example");
        set.push("720p", "https://c.example");

        assert_eq!(set.entries.len(), 2);
        assert_eq!(set.entries[0].label, "720p");
        assert_eq!(set.entries[0].url, "https://c.example");
    }

    #[test]
    fn test_default_or_first_prefers_explicit_default() {
        let mut set = QualitySet::default();
        set.push("720p", "https://a.example");
        set.default_url = Some("https://d.example".to_string());

        assert_eq!(set.default_or_first(), Some("https://d.example"));
    }
}
