pub mod game_state;
pub mod members;
pub mod rooms;
pub mod schema_version;
