use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use letushelp_api::{config::Config, db, middleware::auth::JwtSecret, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let state = AppState {
        db: pool,
        config: config.clone(),
    };

    let cors_origin = match &config.cors_origin {
        Some(origin) => AllowOrigin::exact(origin.parse::<HeaderValue>()?),
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/me", get(routes::auth::me))
        // Service catalog
        .route("/api/services", get(routes::services::list_services))
        // Provider profile
        .route(
            "/api/provider/profile",
            post(routes::provider::create_profile)
                .get(routes::provider::get_profile)
                .put(routes::provider::update_profile),
        )
        .route(
            "/api/provider/profile/availability",
            patch(routes::provider::toggle_availability),
        )
        // Service requests
        .route(
            "/api/requests",
            post(routes::requests::create_request).get(routes::requests::list_my_requests),
        )
        .route(
            "/api/requests/provider",
            get(routes::requests::list_available_requests),
        )
        .route("/api/requests/{id}", delete(routes::requests::delete_request))
        // Bookings
        .route(
            "/api/bookings",
            post(routes::bookings::create_booking).get(routes::bookings::list_user_bookings),
        )
        .route(
            "/api/bookings/provider",
            get(routes::bookings::list_provider_bookings),
        )
        .route(
            "/api/bookings/{id}/status",
            patch(routes::bookings::update_booking_status),
        )
        .route("/api/bookings/{id}", put(routes::bookings::update_booking))
        .route("/api/bookings/{id}/rate", post(routes::bookings::rate_booking))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("LetUsHelp API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
