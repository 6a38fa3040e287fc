pub mod errors;
pub mod game;
pub mod rng;
pub mod snapshot;
pub mod types;
pub mod validate;

#[cfg(test)]
mod tests;

pub use errors::*;
pub use game::*;
pub use rng::*;
pub use snapshot::*;
pub use types::*;
pub use validate::*;
