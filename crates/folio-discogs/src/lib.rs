pub mod adapter;
pub mod client;
pub mod config;
pub mod wire;

pub use client::{DiscogsClient, DiscogsError};
pub use config::DiscogsConfig;
