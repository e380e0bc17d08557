use server::{archive::ArchivalClient, config, db, health, openapi, telemetry};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evault=info,server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config::load_feature_flags();
    let flags = config::feature_flags();

    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if flags.telemetry {
        telemetry::init_telemetry();
    }
    health::record_start_time();

    let store = match db::open_store(&settings).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {e}");
            std::process::exit(1);
        }
    };

    let archive = ArchivalClient::from_settings(flags, &settings);
    tracing::info!(
        store = store.backend_name(),
        archive = archive.backend_name(),
        upload_dir = %settings.upload_dir.display(),
        "Backends selected"
    );

    let bind_addr = settings.bind_addr.clone();
    let max_body = settings.max_upload_bytes;
    let state = db::AppState::new(store, archive, settings);

    let app = openapi::api_router(state)
        .layer(axum::extract::DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {bind_addr}: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("eVault listening on {bind_addr}");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}
