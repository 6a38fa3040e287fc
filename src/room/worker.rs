//! Cooperative AI-turn drain.
//!
//! At most one worker runs per room, guarded by `ai_worker_active`. The
//! loop re-checks room presence and status at every iteration, publishes a
//! snapshot after each atomic step, and exits as soon as a human is up, the
//! game finishes, or the room vanishes. A panic inside the engine clears
//! the guard instead of wedging the room.

use std::sync::Arc;

use tracing::{debug, error};

use super::service::RoomService;
use super::state::RoomStatus;

const LOG_TARGET: &str = "room::worker";

/// Start draining AI turns for `code` unless a worker is already active.
pub fn spawn_ai_worker(service: Arc<RoomService>, code: String) {
    tokio::spawn(async move {
        {
            let Some(shared) = service.registry().get(&code) else {
                return;
            };
            let mut room = shared.lock().await;
            if room.ai_worker_active || room.status != RoomStatus::Playing {
                return;
            }
            room.ai_worker_active = true;
        }

        let drain = tokio::spawn(drain_ai_turns(Arc::clone(&service), code.clone()));
        if let Err(err) = drain.await {
            error!(target: LOG_TARGET, %code, error = %err, "ai worker crashed");
        }
        if let Some(shared) = service.registry().get(&code) {
            shared.lock().await.ai_worker_active = false;
        }
    });
}

async fn drain_ai_turns(service: Arc<RoomService>, code: String) {
    loop {
        let Some(shared) = service.registry().get(&code) else {
            return;
        };
        let mut room = shared.lock().await;
        if room.status != RoomStatus::Playing {
            return;
        }
        let Some(game) = room.game.as_mut() else {
            return;
        };

        let (current_index, draw_opts_before) = game.start_turn();
        if !game.player(current_index).is_ai() {
            return;
        }
        let actor = game.player(current_index).name.clone();

        if game.can_declare_yaniv(current_index) && game.ai_should_declare_yaniv(current_index) {
            let outcome = match game.declare_yaniv(current_index) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(target: LOG_TARGET, %code, %actor, error = %err, "ai yaniv rejected");
                    return;
                }
            };
            debug!(target: LOG_TARGET, %code, %actor, "ai declared yaniv");
            let finished = room.apply_round_outcome(&outcome);
            service.publish(&mut room).await;
            if finished {
                return;
            }
            continue;
        }

        let Some(action) = game.ai_decide_action(current_index) else {
            return;
        };
        let summary = match game.play_turn(current_index, action) {
            Ok(summary) => summary,
            Err(err) => {
                error!(target: LOG_TARGET, %code, %actor, error = %err, "ai turn rejected");
                return;
            }
        };
        room.record_turn(&actor, &summary, &draw_opts_before);
        service.publish(&mut room).await;

        drop(room);
        tokio::task::yield_now().await;
    }
}
