use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::upstream::types::ContentItem;

static RESIZE_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]resize=[^&]+").expect("invalid resize pattern"));

static QUALITY_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]quality=[^&]+").expect("invalid quality pattern"));

/// Titles containing any of these substrings are scraper leakage, not
/// content, and are dropped before enrichment. Matching is a lowercased
/// substring test, so a title like "APKalypse" is dropped too.
const TITLE_BLACKLIST: &[&str] = &["apk", "komiku plus"];

/// Strip known resize/quality transform parameters from an image URL
pub fn clean_image_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let clean = RESIZE_PARAM_RE.replace_all(url, "");
    QUALITY_PARAM_RE.replace_all(&clean, "").to_string()
}

/// Extract the last non-empty path segment of a link field,
/// e.g. "/manga/slug-name/" -> "slug-name"
pub fn slug_from_link(link: &str) -> String {
    let trimmed = link.trim_matches('/');

    trimmed
        .rsplit('/')
        .next()
        .unwrap_or(trimmed)
        .to_string()
}

/// Collapse the image fields into `cover`, first non-empty wins
pub fn resolve_cover(item: &mut ContentItem) {
    if item.cover.is_empty() {
        if !item.poster.is_empty() {
            item.cover = item.poster.clone();
        } else if !item.thumbnail.is_empty() {
            item.cover = item.thumbnail.clone();
        } else if !item.image.is_empty() {
            item.cover = item.image.clone();
        }
    }
}

/// Fill a missing slug from the id field, else from the link field
pub fn backfill_slug(item: &mut ContentItem) {
    if item.slug.is_empty() {
        if !item.content_id.is_empty() {
            item.slug = item.content_id.clone();
        } else if !item.link.is_empty() {
            item.slug = slug_from_link(&item.link);
        }
    }
}

/// Strip transform parameters from every image field of an item
pub fn clean_item_images(item: &mut ContentItem) {
    item.cover = clean_image_url(&item.cover);
    item.poster = clean_image_url(&item.poster);
    item.thumbnail = clean_image_url(&item.thumbnail);
    item.image = clean_image_url(&item.image);
}

pub fn is_blacklisted(title: &str) -> bool {
    let title = title.to_lowercase();
    TITLE_BLACKLIST.iter().any(|term| title.contains(term))
}

/// Drop blacklisted items, preserving order
pub fn retain_listed(items: Vec<ContentItem>) -> Vec<ContentItem> {
    items
        .into_iter()
        .filter(|item| !is_blacklisted(&item.title))
        .collect()
}

/// Remove duplicate entries by normalized slug OR normalized title.
/// First occurrence wins; relative order among survivors is preserved.
pub fn dedup_entries<T>(items: Vec<T>, key: impl Fn(&T) -> (&str, &str)) -> Vec<T> {
    let mut seen_slugs: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();

    items
        .into_iter()
        .filter(|item| {
            let (slug, title) = key(item);
            let slug = slug.trim().to_lowercase();
            let title = title.trim().to_lowercase();

            let duplicate = (!slug.is_empty() && seen_slugs.contains(&slug))
                || (!title.is_empty() && seen_titles.contains(&title));

            if !duplicate {
                if !slug.is_empty() {
                    seen_slugs.insert(slug);
                }
                if !title.is_empty() {
                    seen_titles.insert(title);
                }
            }

            !duplicate
        })
        .collect()
}
