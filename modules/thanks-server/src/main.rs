use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use graph_client::GraphClient;
use thanks_server::{router, signature::SignatureVerifier, AppState, Config, MentionPipeline};
use thanks_store::ThanksStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("thanks=info".parse()?))
        .init();

    let config = Config::from_env()?;
    if !config.require_signature {
        info!("Unsigned webhook deliveries will be accepted (REQUIRE_SIGNATURE=false)");
    }

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(ThanksStore::new(pool));
    store.migrate().await?;

    let graph = Arc::new(GraphClient::with_base_url(
        &config.graph_api_url,
        config.access_token.clone(),
    ));

    let state = Arc::new(AppState {
        verify_token: config.verify_token.clone(),
        verifier: SignatureVerifier::new(config.app_secret.clone(), config.require_signature),
        store: store.clone(),
        pipeline: MentionPipeline::new(graph, store),
    });

    let app = router(state);

    let addr = config.listen_addr();
    info!("Thanks webhook receiver starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
