use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use parley_api::auth::{self, AppState, AppStateInner};
use parley_api::middleware::require_auth;
use parley_api::{files, messages, users};
use parley_chat::{KeywordClassifier, MessagePipeline, classifier::DEFAULT_KEYWORDS};
use parley_gateway::connection;
use parley_gateway::dispatcher::Dispatcher;

#[derive(Clone)]
struct ServerState {
    dispatcher: Dispatcher,
    jwt_secret: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("PARLEY_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("PARLEY_DB_PATH").unwrap_or_else(|_| "parley.db".into());
    let upload_dir = std::env::var("PARLEY_UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());
    let host = std::env::var("PARLEY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PARLEY_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database and pipeline
    let db = parley_db::Database::open(&PathBuf::from(&db_path))?;
    let classifier = classifier_from_env();
    info!("Toxicity denylist: {:?}", classifier.keywords());
    let pipeline = MessagePipeline::new(db, classifier);

    // Shared state
    let dispatcher = Dispatcher::new();
    let app_state: AppState = Arc::new(AppStateInner {
        pipeline,
        jwt_secret: jwt_secret.clone(),
        upload_dir: PathBuf::from(upload_dir),
    });

    let state = ServerState {
        dispatcher,
        jwt_secret,
    };

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/messages/send", post(messages::send_message))
        .route(
            "/messages/receiver/{id}",
            get(messages::get_messages_by_receiver),
        )
        .route("/messages/read/{id}", put(messages::mark_read))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_username))
        .route("/users/{id}/status", put(users::update_status))
        .route("/users/{id}/status", get(users::get_status))
        .route("/files/{filename}", post(files::upload))
        .layer(middleware::from_fn(require_auth))
        .with_state(app_state);

    let ws_route = Router::new()
        .route("/gateway", get(ws_upgrade))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(ws_route)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Parley server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Denylist override: PARLEY_TOXIC_KEYWORDS is a comma-separated list.
fn classifier_from_env() -> KeywordClassifier {
    match std::env::var("PARLEY_TOXIC_KEYWORDS") {
        Ok(raw) => {
            let words: Vec<String> = raw
                .split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect();
            if words.is_empty() {
                KeywordClassifier::new(DEFAULT_KEYWORDS)
            } else {
                KeywordClassifier::new(words)
            }
        }
        Err(_) => KeywordClassifier::default(),
    }
}

async fn ws_upgrade(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        connection::handle_connection(socket, state.dispatcher, state.jwt_secret)
    })
}
