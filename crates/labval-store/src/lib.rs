#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod embedded;
pub mod error;
pub mod memory;
pub mod store;

pub use backend::{Collection, StorageBackend, create_storage_backend};
pub use config::StoreConfig;
pub use embedded::RedbBackend;
pub use error::{Error, Result};
pub use memory::MemoryBackend;
pub use store::{ResolvedWorkflow, Store};
