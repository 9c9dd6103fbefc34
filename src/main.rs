use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use frc_strategy_backend::api::{self, AppState};
use frc_strategy_backend::config::{Config, StrategyMode};
use frc_strategy_backend::llm::{LlmClient, DEFAULT_MODEL};
use frc_strategy_backend::metrics;
use frc_strategy_backend::stats::StatsClient;
use frc_strategy_backend::strategy::StrategyGenerator;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    metrics::register_metrics();

    // One HTTP client shared by both outbound collaborators.
    let http = reqwest::Client::new();
    let stats = StatsClient::new(http.clone(), config.statbotics_url.clone());

    let generator = match (config.strategy_mode, config.openai_api_key.as_deref()) {
        (StrategyMode::Generative, Some(key)) => StrategyGenerator::Generative(LlmClient::new(
            http,
            config.openai_api_url.clone(),
            key,
            DEFAULT_MODEL,
        )),
        _ => StrategyGenerator::Heuristic,
    };
    tracing::info!("Strategy generator: {}", generator.variant());

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    let app = api::router(AppState { stats, generator })
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true),
        )
        .layer(axum::middleware::from_fn(
            |req: axum::http::Request<axum::body::Body>, next: axum::middleware::Next| async move {
                let method = req.method().to_string();
                let path = req.uri().path().to_string();
                let start = std::time::Instant::now();
                let response = next.run(req).await;
                metrics::API_REQUESTS_TOTAL
                    .with_label_values(&[&method, &path, response.status().as_str()])
                    .inc();
                metrics::API_REQUEST_DURATION_SECONDS
                    .with_label_values(&[&path])
                    .observe(start.elapsed().as_secs_f64());
                response
            },
        ));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to port {}: {e}", config.port));

    tracing::info!("Strategy analysis server running on port {}", config.port);
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
