use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical episode slug: `<series-token>-episode-<number>[-suffix]`
static EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)-episode-(\d+)(?:-.*)?$").expect("invalid episode pattern"));

/// Episode phrase inside a human-readable title, e.g. "Episode 1155 ..."
static EPISODE_PHRASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(episode|ep|eps)\s*\d+.*").expect("invalid phrase pattern"));

static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("invalid charset pattern"));

/// Manual overrides for opaque series tokens the primary provider uses,
/// mapped to the full kebab-case titles the mirrors expect.
static SERIES_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("wpoiec", "one-piece"),
        ("bkunhro", "boku-no-hero-academia"),
        ("stvssn", "spy-x-family"),
        ("kslym", "kimetsu-no-yaiba"),
        ("jjksn", "jujutsu-kaisen"),
        ("atkslyr", "attack-on-titan"),
        ("nruto", "naruto"),
        ("nrtsppdn", "naruto-shippuden"),
        ("blach", "bleach"),
        ("dmnslyar", "demon-slayer"),
        ("tokyo-revengers", "tokyo-revengers"),
        ("blue-lock", "blue-lock"),
        ("windbreaker", "wind-breaker"),
        ("mushoku-tensei", "mushoku-tensei"),
        ("solo-leveling", "solo-leveling"),
        ("kaijuu-8-gou", "kaijuu-8-gou"),
        ("dandadan", "dandadan"),
        ("overlord", "overlord"),
        ("re-zero", "re-zero"),
        ("konosuba", "konosuba"),
        ("danmachi", "danmachi"),
        ("tensura", "tensei-shitara-slime-datta-ken"),
    ])
});

/// Parsed canonical episode slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeSlug {
    pub series: String,
    pub number: String,
}

/// Parse a canonical episode slug; None if it does not match the pattern
pub fn parse(slug: &str) -> Option<EpisodeSlug> {
    let captures = EPISODE_RE.captures(slug)?;

    Some(EpisodeSlug {
        series: captures[1].to_string(),
        number: captures[2].to_string(),
    })
}

/// Look up the manual alias for a series token
pub fn alias_for(token: &str) -> Option<&'static str> {
    SERIES_ALIASES.get(token).copied()
}

/// Derive a kebab-case series slug from a human-readable episode title,
/// stripping subtitle boilerplate and the episode phrase itself.
pub fn slug_from_title(title: &str) -> String {
    let mut clean = title.to_lowercase();
    clean = clean.replace("subtitle indonesia", "");
    clean = clean.replace("sub indo", "");
    clean = EPISODE_PHRASE_RE.replace(&clean, "").to_string();
    let clean = clean.trim();

    NON_ALNUM_RE
        .replace_all(clean, "-")
        .trim_matches('-')
        .to_string()
}

/// Which mirror's slug convention to target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugStyle {
    /// `{series}-episode-{n}-subtitle-indonesia`
    Oploverz,
    /// `{series}-episode-{n}` with an optional `-sub-indo` suffix
    AnimeIndo,
}

/// Ordered slug candidates for one mirror. The raw slug always comes first;
/// callers try candidates in order and stop at the first success.
pub fn candidates(slug: &str, title: &str, style: SlugStyle) -> Vec<String> {
    let Some(parsed) = parse(slug) else {
        return vec![slug.to_string()];
    };

    let series = match alias_for(&parsed.series) {
        Some(alias) => alias.to_string(),
        None if !title.is_empty() => {
            let derived = slug_from_title(title);
            if derived.is_empty() {
                parsed.series.clone()
            } else {
                derived
            }
        }
        None => parsed.series.clone(),
    };

    let rebuilt = format!("{}-episode-{}", series, parsed.number);

    let mut list = vec![slug.to_string(), rebuilt.clone()];

    match style {
        SlugStyle::Oploverz => {
            list.push(format!("{rebuilt}-subtitle-indonesia"));
        }
        SlugStyle::AnimeIndo => {
            if !rebuilt.ends_with("-sub-indo") {
                list.push(format!("{rebuilt}-sub-indo"));
            }
            if !slug.ends_with("-sub-indo") {
                list.push(format!("{slug}-sub-indo"));
            }
        }
    }

    let mut seen = Vec::new();
    list.retain(|c| {
        if seen.contains(c) {
            false
        } else {
            seen.push(c.clone());
            true
        }
    });

    list
}
