use deposit_admin::{ Config, Result };
use axum::{ Router, routing::{ get, post, put } };
use migration::MigratorTrait;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "deposit_admin=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| deposit_admin::AppError::Config(e.to_string()))?;

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .map_err(|e| deposit_admin::AppError::Database(e))?;

    tracing::info!("Database connected successfully");

    // Run migrations
    migration::Migrator::up(&db, None).await.map_err(|e| deposit_admin::AppError::Database(e))?;

    tracing::info!("Migrations completed successfully");

    // Initialize repositories
    let user_repo = Arc::new(deposit_admin::db::UserRepository::new(db.clone()));
    let deposit_repo = Arc::new(deposit_admin::db::DepositRepository::new(db.clone()));
    let ledger_entry_repo = Arc::new(deposit_admin::db::LedgerEntryRepository::new(db.clone()));

    // Initialize services
    let ledger = Arc::new(deposit_admin::services::LedgerService::new());
    let notifier: Arc<dyn deposit_admin::services::Notifier> = Arc::new(
        deposit_admin::services::EmailNotifier::new(config.email.clone())
    );

    let user_service = Arc::new(
        deposit_admin::services::UserService::new(
            user_repo.clone(),
            deposit_repo.clone(),
            ledger_entry_repo.clone()
        )
    );

    let deposit_service = Arc::new(
        deposit_admin::services::DepositService::new(
            db.clone(),
            user_repo.clone(),
            deposit_repo.clone(),
            ledger.clone(),
            notifier.clone()
        )
    );

    let auth = Arc::new(deposit_admin::auth::AdminRegistry::new(&config.admin_api_keys));

    // Create app state
    let app_state = deposit_admin::api::AppState::new(user_service, deposit_service, auth);

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/admin/users", get(deposit_admin::api::users::list_users))
        .route("/api/admin/users/{user_id}", get(deposit_admin::api::users::get_user_detail))
        .route("/api/admin/users/{user_id}/ledger", get(deposit_admin::api::users::get_user_ledger))
        .route(
            "/api/admin/manual-deposit",
            post(deposit_admin::api::deposits::create_manual_deposit)
        )
        .route(
            "/api/admin/manual-deposits",
            get(deposit_admin::api::deposits::list_manual_deposits)
        )
        .route(
            "/api/admin/manual-deposits/stats",
            get(deposit_admin::api::deposits::get_manual_deposit_stats)
        )
        .route(
            "/api/admin/manual-deposits/{deposit_id}/cancel",
            put(deposit_admin::api::deposits::cancel_manual_deposit)
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| deposit_admin::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| deposit_admin::AppError::Internal(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
