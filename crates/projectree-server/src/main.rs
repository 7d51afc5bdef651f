use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use projectree_api::auth::{self, AppState, AppStateInner};
use projectree_api::middleware::require_auth;
use projectree_api::{comments, conversations, events, follows, messages, profile, projects, search};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "projectree=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("PROJECTREE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("PROJECTREE_DB_PATH").unwrap_or_else(|_| "projectree.db".into());
    let host = std::env::var("PROJECTREE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PROJECTREE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = projectree_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner { db, jwt_secret });

    // Routes
    let public_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/search", get(search::search))
        .route("/api/users/{username}", get(profile::public_profile))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/api/conversations", get(conversations::get_conversations))
        .route(
            "/api/messages",
            get(messages::get_messages).post(messages::send_message),
        )
        .route("/api/messages/read", post(messages::mark_read))
        .route(
            "/api/follows",
            get(follows::follow_status)
                .post(follows::create_follow)
                .delete(follows::delete_follow),
        )
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/comments",
            get(comments::list_comments)
                .post(comments::create_comment)
                .delete(comments::delete_comment),
        )
        .route(
            "/api/projects",
            get(projects::list_projects)
                .post(projects::create_project)
                .delete(projects::delete_project),
        )
        .route(
            "/api/events",
            get(events::list_events)
                .post(events::create_event)
                .delete(events::delete_event),
        )
        .layer(middleware::from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("ProjecTree server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
