//! HTTP surface for the armory backend.
//!
//! The handlers here are thin: they parse request shapes, run the
//! session/ownership gates, and call one store operation each. Everything
//! with an invariant lives behind [`crate::game::GameStore`].

pub mod auth;
pub mod characters;
pub mod economy;
pub mod error;
pub mod items;
pub mod users;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use log::info;

use crate::config::Config;
use crate::game::{GameStore, GameStoreBuilder};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<GameStore>,
}

/// Build the full application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/users/sign-up", post(users::sign_up))
        .route("/api/users/login", post(users::login))
        .route(
            "/api/characters",
            post(characters::create).get(characters::list),
        )
        .route(
            "/api/characters/{character_id}",
            get(characters::detail).delete(characters::remove),
        )
        .route("/api/items", post(items::create).get(items::list))
        .route(
            "/api/items/{code}",
            get(items::detail).patch(items::update),
        )
        .route("/api/characters/{character_id}/money", post(economy::grant))
        .route("/api/characters/{character_id}/buy", post(economy::buy))
        .route("/api/characters/{character_id}/sell", post(economy::sell))
        .route("/api/characters/{character_id}/equip", post(economy::equip))
        .route(
            "/api/characters/{character_id}/unequip",
            post(economy::unequip),
        )
        .route(
            "/api/characters/{character_id}/inventory",
            get(economy::inventory),
        )
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        "{} {} -> {} ({} ms)",
        method,
        uri,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// Open the store, bind the listener, and serve until the process exits.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store = GameStoreBuilder::new(&config.storage.data_dir)
        .with_game_config(config.game.clone())
        .with_security_config(config.security.clone())
        .open()?;
    let purged = store.purge_expired_sessions()?;
    if purged > 0 {
        info!("purged {} expired sessions", purged);
    }

    let state = AppState {
        store: Arc::new(store),
    };
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("armory listening on {}", config.server.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
