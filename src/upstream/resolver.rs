use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::upstream::{
    OtakudesuProvider, Result, StreamProvider, UpstreamError,
    types::{EpisodeStream, QualityOption, QualitySet, ServerData, StreamServer},
};

/// Label prefix attributing a quality entry to the primary provider
const PRIMARY_ATTRIBUTION: &str = "Server 1 - Otakudesu (Sub Indo)";

/// What one mirror produced for an episode, tagged with its identity
pub(crate) struct MirrorOutcome {
    pub(crate) id: &'static str,
    pub(crate) name: &'static str,
    pub(crate) result: Result<QualitySet>,
}

/// Resolves an episode across the primary provider and all configured
/// mirrors, merging whatever succeeds into one quality ladder.
pub struct StreamResolver {
    primary: Arc<OtakudesuProvider>,
    mirrors: Vec<Arc<dyn StreamProvider>>,
}

impl StreamResolver {
    pub fn new(primary: Arc<OtakudesuProvider>, mirrors: Vec<Arc<dyn StreamProvider>>) -> Self {
        Self { primary, mirrors }
    }

    /// Resolve playback options for a canonical episode id.
    ///
    /// The primary provider is queried with the id as given; every mirror
    /// then runs its own candidate walk concurrently. Fails only when the
    /// primary and every mirror came up empty.
    pub async fn resolve(&self, episode_id: &str) -> Result<EpisodeStream> {
        let primary = self.primary.episode(episode_id).await;

        if let Err(e) = &primary {
            warn!("Primary stream fetch failed for {episode_id}: {e}");
        }

        let title = primary
            .as_ref()
            .map(|stream| stream.title.clone())
            .unwrap_or_default();

        let fetches = self.mirrors.iter().map(|mirror| {
            let mirror = Arc::clone(mirror);
            let slug = episode_id.to_string();
            let title = title.clone();

            async move {
                let result = mirror.fetch_streams(&slug, &title).await;
                MirrorOutcome {
                    id: mirror.id(),
                    name: mirror.name(),
                    result,
                }
            }
        });

        let outcomes = join_all(fetches).await;

        merge(episode_id, primary, outcomes)
    }
}

/// Merge the primary result and mirror outcomes into one response.
///
/// Mirror qualities build the ladder, sorted by resolution ascending with
/// unranked labels after ranked ones; a surviving primary result is demoted
/// to a single attributed entry. The default slot goes to the first
/// successful mirror's preferred URL, else the primary's.
pub(crate) fn merge(
    episode_id: &str,
    primary: Result<EpisodeStream>,
    outcomes: Vec<MirrorOutcome>,
) -> Result<EpisodeStream> {
    let mut ladder: Vec<QualityOption> = Vec::new();
    let mut default_url: Option<String> = None;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(set) if !set.is_empty() || set.default_url.is_some() => {
                debug!(
                    "Mirror {} yielded {} qualities for {episode_id}",
                    outcome.id,
                    set.entries.len()
                );

                for entry in &set.entries {
                    let server = StreamServer {
                        title: outcome.name.to_string(),
                        server_id: format!("{}_{}", outcome.id, entry.label),
                        href: entry.url.clone(),
                    };

                    match ladder.iter_mut().find(|q| q.title == entry.label) {
                        Some(option) => option.server_list.push(server),
                        None => ladder.push(QualityOption {
                            title: entry.label.clone(),
                            server_list: vec![server],
                        }),
                    }
                }

                if default_url.is_none()
                    && let Some(url) = set.default_or_first()
                {
                    default_url = Some(url.to_string());
                }
            }
            Ok(_) => {}
            Err(e) => debug!("Mirror {} failed for {episode_id}: {e}", outcome.id),
        }
    }

    sort_by_resolution(&mut ladder);

    let mirrors_contributed = !ladder.is_empty() || default_url.is_some();

    match primary {
        Ok(mut stream) if mirrors_contributed => {
            if let Some(extra) = demoted_primary_entry(&stream) {
                ladder.push(extra);
            }
            stream.server.qualities = ladder;

            let default = default_url
                .or_else(|| non_empty(&stream.default_streaming_url))
                .or_else(|| first_href(&stream.server.qualities));
            if let Some(default) = default {
                stream.default_streaming_url = default.clone();
                stream.url = default;
            }

            Ok(stream)
        }
        Ok(mut stream) => {
            // Mirrors came up empty; the primary ladder stands, with its
            // first rung attributed so the frontend can tell servers apart.
            if let Some(first) = stream.server.qualities.first_mut() {
                first.title = format!("{PRIMARY_ATTRIBUTION} - {}", first.title);
            }

            if stream.default_streaming_url.is_empty()
                && let Some(url) = first_href(&stream.server.qualities)
            {
                stream.default_streaming_url = url.clone();
                stream.url = url;
            }

            Ok(stream)
        }
        Err(primary_err) if mirrors_contributed => {
            debug!("Serving {episode_id} from mirrors only: {primary_err}");

            let default = default_url
                .or_else(|| first_href(&ladder))
                .unwrap_or_default();
            let anime_id = episode_id
                .split("-episode-")
                .next()
                .unwrap_or(episode_id)
                .to_string();

            Ok(EpisodeStream {
                title: episode_id.to_string(),
                default_streaming_url: default.clone(),
                stream_link: Value::String(default.clone()),
                url: default,
                anime_id,
                server: ServerData { qualities: ladder },
                download_url: Value::Null,
            })
        }
        Err(primary_err) => Err(UpstreamError::NoStream {
            episode: episode_id.to_string(),
            source: primary_err.to_string(),
        }),
    }
}

/// Numeric resolution of a quality label, e.g. "720p" -> 720
fn resolution_rank(label: &str) -> Option<u32> {
    let digits: String = label.chars().take_while(char::is_ascii_digit).collect();

    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Ranked labels ascending, unranked after them in insertion order
fn sort_by_resolution(ladder: &mut [QualityOption]) {
    ladder.sort_by_key(|option| match resolution_rank(&option.title) {
        Some(rank) => (0u8, rank),
        None => (1, 0),
    });
}

/// The primary result reduced to one extra quality entry
fn demoted_primary_entry(stream: &EpisodeStream) -> Option<QualityOption> {
    if let Some(first) = stream.server.qualities.first() {
        return Some(QualityOption {
            title: format!("{PRIMARY_ATTRIBUTION} - {}", first.title),
            server_list: first.server_list.clone(),
        });
    }

    let url = non_empty(&stream.default_streaming_url)?;

    Some(QualityOption {
        title: PRIMARY_ATTRIBUTION.to_string(),
        server_list: vec![StreamServer {
            title: "Otakudesu".to_string(),
            server_id: "otakudesu_default".to_string(),
            href: url,
        }],
    })
}

fn first_href(ladder: &[QualityOption]) -> Option<String> {
    ladder
        .first()
        .and_then(|option| option.server_list.first())
        .map(|server| server.href.clone())
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
