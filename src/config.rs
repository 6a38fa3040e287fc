//! Environment-driven configuration defaults.

use std::env;

pub const DEFAULT_PORT: u16 = 5174;

/// Port to bind the HTTP server to. Reads `PORT`, falling back to 5174.
pub fn port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Optional Postgres URL. When absent the server runs memory-only.
pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL").ok().filter(|v| !v.is_empty())
}
