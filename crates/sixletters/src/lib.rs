//! # Sixletters
//!
//! Server for a real-time cooperative word-guessing game.
//!
//! A host opens a round with a list of words and receives a short code.
//! Friends join with the code, pick a name, and race to guess the words;
//! every guess, join, quit, and give-up vote is broadcast to the others.
//! Rounds with nobody connected are reclaimed after an idle timeout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sixletters::prelude::*;
//!
//! # async fn start() -> Result<(), SixlettersError> {
//! let server = SixlettersServer::builder()
//!     .bind("0.0.0.0:8754")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod admin;
mod error;
mod handler;
mod health;
mod route;
mod server;

pub use error::SixlettersError;
pub use route::Route;
pub use server::{SixlettersServer, SixlettersServerBuilder};

pub mod prelude {
    pub use crate::{SixlettersError, SixlettersServer, SixlettersServerBuilder};
    pub use sixletters_protocol::{RoomCode, ServerLine};
    pub use sixletters_room::{HubConfig, HubHandle, HubStatus};
    pub use sixletters_transport::OriginPolicy;
}
