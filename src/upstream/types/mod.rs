mod content;
mod stream;

pub use content::{
    ChapterImages, ChapterRef, ContentDetail, ContentItem, EpisodeRef, LatestEpisode, MangaDetail,
    MangaMetadata, MediaKind,
};
pub use stream::{
    EpisodeStream, QualityEntry, QualityOption, QualitySet, ServerData, StreamServer,
};
