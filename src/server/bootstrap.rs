//! Server assembly: persistence (or degraded mode), recovery, serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::engine::{Game, GameRng};
use crate::room::{spawn_ai_worker, RoomRegistry, RoomService, RoomStatus};
use crate::store::{PersistedRoom, RoomStore, SeaOrmRoomStore, StoreError};
use crate::subscribe::SubscriberHub;

use super::routes::router;

const LOG_TARGET: &str = "server::bootstrap";

pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database_url: Option<String>,
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let registry = Arc::new(RoomRegistry::new());
    let subscribers = Arc::new(SubscriberHub::new());

    let (store, recovered) = init_persistence(config.database_url.as_deref()).await;
    let service = RoomService::new(Arc::clone(&registry), Arc::clone(&subscribers), store);
    recover_rooms(&service, recovered);

    let app = router(Arc::clone(&service));
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let local_addr = listener.local_addr()?;
    info!(target: LOG_TARGET, %local_addr, "yaniv server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")
}

/// Connect, migrate, clean up, and load persisted rooms. Any failure drops
/// the server into memory-only mode with a single warning; persistence is
/// best-effort throughout.
async fn init_persistence(
    database_url: Option<&str>,
) -> (Option<Arc<dyn RoomStore>>, Vec<PersistedRoom>) {
    let Some(url) = database_url else {
        info!(target: LOG_TARGET, "no DATABASE_URL, running without persistence");
        return (None, Vec::new());
    };

    match connect_and_load(url).await {
        Ok((store, rooms)) => {
            info!(
                target: LOG_TARGET,
                restored = rooms.len(),
                "persistence initialised"
            );
            (Some(store), rooms)
        }
        Err(err) => {
            warn!(
                target: LOG_TARGET,
                error = %err,
                "persistence init failed, running without persistence"
            );
            (None, Vec::new())
        }
    }
}

async fn connect_and_load(url: &str) -> Result<(Arc<dyn RoomStore>, Vec<PersistedRoom>), StoreError> {
    let db = crate::store::connect(url).await?;
    let store: Arc<dyn RoomStore> = Arc::new(SeaOrmRoomStore::new(db));
    store.migrate().await?;

    let stats = store.cleanup_stale(Utc::now()).await?;
    if stats.finished > 0 || stats.deleted > 0 {
        info!(
            target: LOG_TARGET,
            finished = stats.finished,
            deleted = stats.deleted,
            "stale room cleanup"
        );
    }

    let rooms = store.load_active_rooms().await?;
    Ok((store, rooms))
}

/// Rebuild in-memory rooms from persisted rows and resume any AI turns that
/// were in flight when the server last stopped.
fn recover_rooms(service: &Arc<RoomService>, rows: Vec<PersistedRoom>) {
    for row in rows {
        let code = row.code.clone();
        let game = row.game.clone().and_then(|snapshot| {
            match Game::restore(snapshot, GameRng::from_entropy()) {
                Ok(game) => Some(game),
                Err(err) => {
                    warn!(target: LOG_TARGET, %code, error = %err, "could not restore game");
                    None
                }
            }
        });

        let ai_turn = game
            .as_ref()
            .map(|g| g.current_player().is_ai())
            .unwrap_or(false);
        let status = row.status;
        let room = row.into_room(game);
        service.registry().insert(code.clone(), room);

        if status == RoomStatus::Playing && ai_turn {
            spawn_ai_worker(Arc::clone(service), code);
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: LOG_TARGET, error = %err, "failed to install ctrl-c handler");
    }
    info!(target: LOG_TARGET, "shutdown signal received");
}
