//! Round actors and the round registry for Sixletters.
//!
//! Each round runs as an isolated Tokio task (actor model) that owns its
//! words and players. A single hub actor owns the registry of rounds,
//! keyed by generated code, and reclaims rounds that sit idle.
//!
//! # Key types
//!
//! - [`GameHandle`]: send commands to a running round
//! - [`HubHandle`]: register, look up, and release rounds
//! - [`HubConfig`]: code prefix, idle timeout

mod config;
mod error;
mod game;
mod hub;

pub(crate) use config::RoundState;
pub use config::{DEFAULT_IDLE_TIMEOUT, HubConfig};
pub use error::RoomError;
pub use game::{GameHandle, GameSnapshot, PlayerSender, spawn_game};
pub use hub::{HubHandle, HubStatus, RoundSnapshot, spawn_hub};
