//! Dashboard server entry point.

use backend::api::session::DashboardSession;
use backend::db_utils::mondrian_utils::MondrianRestClient;
use backend::db_utils::state_store::ClickHouseStateStore;
use backend::server_extra::config_route;
use backend::settings::Settings;
use tracing::{info, warn};

/// Serves the dashboard configuration at `GET /config`.
///
/// Before serving, one session is initialised against the configured cube backend. This only
/// checks that the backend answers and seeds the stored UI state; the session is dropped and
/// no filter operation is reachable over HTTP.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env();
    let (config_json, config) = config_route::load_config_json(&settings.config_file).await?;

    let store = ClickHouseStateStore::new(&settings);
    store.create_table().await?;

    let executor = MondrianRestClient::new(settings.mondrian_rest_url_or(&config.mondrian_rest_url));
    match DashboardSession::init(executor, store, config).await {
        Ok(session) => {
            info!("Dashboard session ready with {} filter dimensions", session.model().len());
            session.flush().await;
        }
        Err(e) => warn!("Dashboard session warm-up failed: {:#?}", e),
    }

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr).await?;
    info!("Serving dashboard configuration on {}", settings.listen_addr);
    axum::serve(listener, config_route::router(config_json)).await?;
    Ok(())
}
