use exam_dashboard::{
    config::{get_config, init_config, LogFormat},
    database::{pool::create_pool, seed::seed_demo_data},
    middleware::cors::cors_layer,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    if config.seed_demo_data {
        let report = seed_demo_data(&pool, &config.seed_default_password).await?;
        info!(?report, "seeding finished");
    }

    let app_state = AppState::new(pool);
    let app = routes::router(app_state)
        .layer(cors_layer(config.cors_allowed_origin.as_deref())?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
