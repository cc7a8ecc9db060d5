#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;

pub use client::{Health, LabvalClient, TemplateDetail};
pub use config::ClientConfig;
pub use error::{Error, Result};
