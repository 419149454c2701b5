mod cli;
mod config;
pub mod consumer;
mod error;
mod runner;
pub mod signals;

pub use cli::Cli;
pub use config::{ephemeral_channel, Config, ConfigError};
pub use error::TailError;
pub use runner::run;
