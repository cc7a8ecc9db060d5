#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{Error, Result};
pub use server::{Server, ServerConfig, app};
pub use state::AppState;
