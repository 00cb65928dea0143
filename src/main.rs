use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jamroom::{
    build_router, build_state,
    config::AppConfig,
    room::repository::{InMemoryRoomRepository, PostgresRoomRepository, RoomRepository},
    session::{
        repository::{InMemorySessionRepository, PostgresSessionRepository, SessionRepository},
        start_cleanup_task,
    },
};

type Repositories = (
    Arc<dyn SessionRepository + Send + Sync>,
    Arc<dyn RoomRepository + Send + Sync>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jamroom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jam room server");

    let config = AppConfig::from_env();

    let (session_repository, room_repository): Repositories = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Using PostgreSQL repositories");
            (
                Arc::new(PostgresSessionRepository::new(pool.clone())),
                Arc::new(PostgresRoomRepository::new(pool)),
            )
        }
        None => {
            info!("DATABASE_URL not set, using in-memory repositories");
            (
                Arc::new(InMemorySessionRepository::new()),
                Arc::new(InMemoryRoomRepository::new()),
            )
        }
    };

    let bind_addr = config.bind_addr;
    let cleanup_interval = config.session.cleanup_interval;
    let app_state = build_state(config, session_repository, room_repository);

    tokio::spawn(start_cleanup_task(
        app_state.session_service.clone(),
        cleanup_interval,
    ));

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
