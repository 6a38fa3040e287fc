pub mod registry;
pub mod service;
pub mod snapshot;
pub mod state;
pub mod worker;


pub use registry::RoomRegistry;
pub use service::{RoomError, RoomService};
pub use snapshot::{build_snapshot, GameView, PlayerView, RoomSnapshot};
pub use state::*;
pub use worker::spawn_ai_worker;
