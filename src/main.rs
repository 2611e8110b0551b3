use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use marketplace_api::{config, database::manager::DatabaseManager, handlers, middleware};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting marketplace API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("MARKETPLACE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Marketplace API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (token acquisition)
        .merge(auth_public_routes())
        // Protected API (JWT bearer required)
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/auth/login", post(auth::login_post))
}

fn api_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::protected::{applications, auth, projects};

    Router::new()
        // Current caller
        .route("/api/auth/whoami", get(auth::whoami_get))
        // Project lifecycle
        .route(
            "/api/projects",
            get(projects::projects_get).post(projects::project_post),
        )
        .route("/api/projects/client", get(projects::client_projects_get))
        .route("/api/projects/search/skill", get(projects::search_by_skill_get))
        .route("/api/projects/search/skills", get(projects::search_by_skills_get))
        .route(
            "/api/projects/:project_id",
            get(projects::project_get)
                .put(projects::project_put)
                .delete(projects::project_delete),
        )
        // Application lifecycle
        .route("/api/applications", post(applications::application_post))
        .route(
            "/api/applications/project/:project_id",
            get(applications::project_applications_get),
        )
        .route(
            "/api/applications/project/:project_id/status/:status",
            get(applications::project_applications_by_status_get),
        )
        .route(
            "/api/applications/freelancer",
            get(applications::freelancer_applications_get),
        )
        .route(
            "/api/applications/check/:project_id",
            get(applications::check_applied_get),
        )
        .route(
            "/api/applications/:application_id",
            get(applications::application_get),
        )
        .route(
            "/api/applications/:application_id/status",
            put(applications::application_status_put),
        )
        .route_layer(axum::middleware::from_fn(middleware::jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Marketplace API",
            "version": version,
            "description": "Freelance marketplace backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/api/auth/register, /api/auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (protected)",
                "projects": "/api/projects[/:project_id], /api/projects/client, /api/projects/search/* (protected)",
                "applications": "/api/applications[/:application_id], /api/applications/project/:project_id, /api/applications/freelancer, /api/applications/check/:project_id (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
