use std::{net::SocketAddr, sync::Arc, time::Duration};

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use nonton::{
    AppConfig, Ctx, db,
    enrichment::{EnrichmentService, EnrichmentStore, GeminiClient, SqliteEnrichmentStore},
    routes,
    upstream::{
        AnimeIndoProvider, ComicProvider, HttpClient, OploverzProvider, OtakudesuProvider,
        RateLimiter, ResponseCache, StreamProvider, StreamResolver, ZoroProvider,
    },
};

/// Per-call timeout for mirror providers, shorter than the primary's
const MIRROR_TIMEOUT: Duration = Duration::from_secs(15);

const CACHE_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nonton=debug,info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    let config = Arc::new(AppConfig::load()?);

    let pool = db::connect(&config.database).await?;

    let store: Arc<dyn EnrichmentStore> = Arc::new(SqliteEnrichmentStore::new(pool.clone()));
    let gemini = GeminiClient::from_config(&config.gemini);
    if gemini.is_none() {
        warn!("No Gemini API key configured, enrichment will use store and cache only");
    }
    let enrichment = Arc::new(EnrichmentService::new(gemini, Some(store)));

    let cache = ResponseCache::new();
    cache.spawn_sweeper(CACHE_SWEEP_PERIOD);

    let limiter = RateLimiter::new(
        config.upstream.rate_capacity,
        config.upstream.rate_refill_interval(),
    );
    let primary_http = HttpClient::new(&config.upstream.base_url, config.upstream.request_timeout())
        .with_rate_limiter(limiter);
    let mirror_http = HttpClient::new(&config.upstream.base_url, MIRROR_TIMEOUT);
    let consumet_http = HttpClient::new(&config.upstream.consumet_base_url, MIRROR_TIMEOUT);

    let anime = Arc::new(OtakudesuProvider::new(
        primary_http.clone(),
        cache.clone(),
        enrichment.clone(),
    ));
    let comic = Arc::new(ComicProvider::new(primary_http, cache.clone()));

    let mirrors: Vec<Arc<dyn StreamProvider>> = vec![
        Arc::new(OploverzProvider::new(mirror_http.clone())),
        Arc::new(AnimeIndoProvider::new(mirror_http)),
        Arc::new(ZoroProvider::new(consumet_http)),
    ];
    let resolver = Arc::new(StreamResolver::new(anime.clone(), mirrors));

    let proxy_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let ctx = Ctx {
        config: config.clone(),
        db: pool,
        anime,
        comic,
        resolver,
        enrichment,
        proxy_client,
    };

    let app = routes::mount().with_state(ctx).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
